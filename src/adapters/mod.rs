//! Transport implementations
//!
//! This module contains the [`Transport`] capability contract and its
//! implementations, providing low-level byte I/O for the instrument drivers in
//! [`crate::instrument`]. A transport promises nothing beyond moving bytes: no
//! framing, no timeouts, no retries. Drivers layer those on top where the
//! instrument protocol needs them.
//!
//! Every call blocks the calling thread until the medium finishes or fails.
//! Drivers hold their transport exclusively and take `&mut self`, which keeps
//! the request/response exchange half-duplex.

pub mod mock_adapter;
#[cfg(feature = "instrument_serial")]
pub mod serial_adapter;
pub mod tcp_adapter;

pub use mock_adapter::MockTransport;
#[cfg(feature = "instrument_serial")]
pub use serial_adapter::SerialTransport;
pub use tcp_adapter::TcpTransport;

use std::io;

/// Read length used when the caller has no better idea.
pub const DEFAULT_RECEIVE_LEN: usize = 1;

/// Byte-level link to an instrument.
pub trait Transport {
    /// Transmit raw bytes over the medium.
    ///
    /// Returns the number of bytes the medium accepted.
    fn send(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read up to `max_len` bytes from the medium.
    ///
    /// Implementations may return fewer bytes than requested, or ignore the
    /// limit when the medium is line oriented.
    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        (**self).receive(max_len)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).send(data)
    }

    fn receive(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        (**self).receive(max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Transport>(mut transport: T) -> io::Result<Vec<u8>> {
        transport.send(b"*IDN?\n")?;
        transport.receive(DEFAULT_RECEIVE_LEN)
    }

    #[test]
    fn test_boxed_and_borrowed_transports() {
        let boxed: Box<dyn Transport> = Box::new(MockTransport::with_replies(["A"]));
        assert_eq!(round_trip(boxed).unwrap(), b"A");

        let mut mock = MockTransport::with_replies(["B"]);
        assert_eq!(round_trip(&mut mock).unwrap(), b"B");
        assert_eq!(mock.sent_strings(), vec!["*IDN?\n"]);
    }
}
