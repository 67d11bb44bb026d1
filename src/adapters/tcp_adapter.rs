use super::Transport;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info};

/// TCP/IP transport for LAN-attached instruments
///
/// The connection is opened when the transport is constructed; if the
/// instrument is unreachable, construction fails and there is no retry.
/// Reads are single `recv` calls, so a reply may arrive in pieces. Callers that
/// need an exact length must loop themselves.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `address:port`.
    ///
    /// # Errors
    /// Returns the connection error if the instrument cannot be reached.
    pub fn connect(address: &str, port: u16) -> io::Result<Self> {
        let stream = TcpStream::connect((address, port))?;
        info!(%address, port, "TCP connection established");
        Ok(Self { stream })
    }

    /// Connect to the first reachable address in `addrs`.
    pub fn connect_to<A: ToSocketAddrs>(addrs: A) -> io::Result<Self> {
        let stream = TcpStream::connect(addrs)?;
        info!(peer = ?stream.peer_addr().ok(), "TCP connection established");
        Ok(Self { stream })
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Set the socket read timeout. `None` blocks indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        let written = self.stream.write(data)?;
        debug!(bytes = written, "Sent TCP data");
        Ok(written)
    }

    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; max_len];
        let read = self.stream.read(&mut buffer)?;
        buffer.truncate(read);
        debug!(bytes = read, "Received TCP data");
        Ok(buffer)
    }
}
