//! TCP transport against a local listener

use labwire::adapters::{TcpTransport, Transport};
use labwire::instrument::{Mx100tp, Ts3};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Accept one connection, read `expect` bytes, answer with `reply`, and hand
/// the received bytes back through the join handle.
fn serve_once(expect: usize, reply: &'static [u8]) -> (u16, thread::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = vec![0; expect];
        stream.read_exact(&mut received).unwrap();
        stream.write_all(reply).unwrap();
        received
    });
    (port, handle)
}

#[test]
fn test_send_and_short_read() {
    let (port, server) = serve_once(5, b"hello");
    let mut transport = TcpTransport::connect("127.0.0.1", port).unwrap();

    assert_eq!(transport.send(b"ping\n").unwrap(), 5);
    assert_eq!(server.join().unwrap(), b"ping\n");

    // One read, at most max_len bytes; the rest stays in the socket.
    let first = transport.receive(2).unwrap();
    assert_eq!(first, b"he");
    let rest = transport.receive(64).unwrap();
    assert_eq!(rest, b"llo");
}

#[test]
fn test_ts3_over_tcp() {
    let frame = b"$012;10;26C6\r";
    let (port, server) = serve_once(frame.len(), b"0;1;\r\n");
    let transport = TcpTransport::connect("127.0.0.1", port).unwrap();
    transport
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut ts3 = Ts3::new(transport);
    ts3.poll_device().unwrap();
    assert_eq!(server.join().unwrap(), frame);
}

#[test]
fn test_mx100tp_over_tcp() {
    let (port, server) = serve_once(5, b"12.003V\r\n");
    let transport = TcpTransport::connect("127.0.0.1", port).unwrap();
    transport
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let mut psu = Mx100tp::new(transport);
    assert_eq!(psu.get_channel_voltage(1).unwrap(), 12.003);
    assert_eq!(server.join().unwrap(), b"V1O?\n");
}

#[test]
fn test_connect_refused() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    assert!(TcpTransport::connect("127.0.0.1", port).is_err());
}

#[test]
fn test_connect_to_and_from_stream() {
    let (port, server) = serve_once(4, b"ok\n");
    let mut transport = TcpTransport::connect_to(("127.0.0.1", port)).unwrap();
    transport.send(b"ping").unwrap();
    assert_eq!(server.join().unwrap(), b"ping");
    assert_eq!(transport.receive(16).unwrap(), b"ok\n");

    let (port, server) = serve_once(5, b"0.5A\n");
    let stream = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
    let mut psu = Mx100tp::new(TcpTransport::from_stream(stream));
    assert_eq!(psu.get_channel_current(3).unwrap(), 0.5);
    assert_eq!(server.join().unwrap(), b"I3O?\n");
}
