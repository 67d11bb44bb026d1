use super::Transport;
use serialport::{SerialPort, SerialPortBuilder};
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Line terminator the serial transport reads up to.
pub const LINE_TERMINATOR: u8 = b'\n';

fn default_serial_timeout() -> Duration {
    Duration::from_secs(1)
}

/// Serial transport for RS-232 and USB-serial instruments
///
/// The port is described up front by a [`SerialPortBuilder`] but only opened on
/// the first `send` or `receive`. Every later call re-checks and reopens the
/// port if it was dropped, so a transport can be wired before the instrument is
/// plugged in.
pub struct SerialTransport {
    /// Port settings (path, baud rate, timeout)
    builder: SerialPortBuilder,

    /// The open port, if any
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Create a new serial transport with default settings
    ///
    /// # Arguments
    /// * `port_name` - Serial port path (e.g., "/dev/ttyUSB0", "COM3")
    /// * `baud_rate` - Communication speed (e.g., 9600, 115200)
    pub fn new(port_name: &str, baud_rate: u32) -> Self {
        Self::from_builder(serialport::new(port_name, baud_rate).timeout(default_serial_timeout()))
    }

    /// Wrap a pre-configured port description.
    pub fn from_builder(builder: SerialPortBuilder) -> Self {
        Self {
            builder,
            port: None,
        }
    }

    /// Set the per-read timeout of the underlying port.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.timeout(timeout);
        self
    }

    /// Whether the port has been opened.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Open the port unless it is already open.
    pub fn ensure_open(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        if self.port.is_none() {
            let port = self.builder.clone().open()?;
            info!(port = ?port.name(), "Serial port opened");
            self.port = Some(port);
        }

        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port not open"))
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<usize> {
        let port = self.ensure_open()?;
        port.write_all(data)?;
        port.flush()?;
        debug!(bytes = data.len(), "Sent serial data");
        Ok(data.len())
    }

    fn receive(&mut self, _max_len: usize) -> io::Result<Vec<u8>> {
        let port = self.ensure_open()?;
        let line = read_line(port)?;
        debug!(bytes = line.len(), "Received serial line");
        Ok(line)
    }
}

/// Read bytes until [`LINE_TERMINATOR`] (kept in the result) or end of stream.
///
/// A read timeout after some bytes have arrived ends the line early; a timeout
/// before any byte arrives is returned as an error.
pub fn read_line<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                line.push(byte[0]);
                if byte[0] == LINE_TERMINATOR {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::TimedOut && !line.is_empty() => break,
            Err(e) => return Err(e),
        }
    }

    Ok(line)
}
