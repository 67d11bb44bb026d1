//! Configuration loading using Figment
//!
//! Configuration is loaded from:
//! 1. `config/labwire.toml` (or a path given on the command line)
//! 2. Environment variables prefixed with `LABWIRE_`, `__` separating sections
//!
//! ```text
//! LABWIRE_APPLICATION__LOG_LEVEL=debug
//! LABWIRE_INSTRUMENT__ADDRESS=192.168.1.60
//! ```
//!
//! [`open_transport`] turns the `[instrument]` section into a ready transport.

use crate::adapters::{TcpTransport, Transport};
use crate::error::{ConfigError, LabwireError};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/labwire.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabwireConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// The instrument to talk to
    pub instrument: InstrumentConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Which driver sits on top of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    /// Framed TS3 fixture protocol
    Ts3,
    /// Plain-text MX100TP power supply
    Mx100tp,
}

/// Medium used to reach the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMethod {
    /// Serial line
    Serial,
    /// TCP socket
    TcpIp,
    /// VISA resource; recognized but not implemented
    Visa,
}

impl fmt::Display for ConnectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMethod::Serial => write!(f, "serial"),
            ConnectionMethod::TcpIp => write!(f, "tcp_ip"),
            ConnectionMethod::Visa => write!(f, "visa"),
        }
    }
}

/// Instrument connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Driver to use
    pub kind: InstrumentKind,
    /// Connection method
    pub method: ConnectionMethod,
    /// Host name or IP address (tcp_ip)
    #[serde(default)]
    pub address: Option<String>,
    /// TCP port (tcp_ip)
    #[serde(default)]
    pub port: Option<u16>,
    /// Serial device path, e.g. "/dev/ttyUSB0" (serial)
    #[serde(default)]
    pub serial_port: Option<String>,
    /// Baud rate (serial)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Read timeout in milliseconds; the medium's default when unset
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

impl LabwireConfig {
    /// Load configuration from [`DEFAULT_CONFIG_PATH`] and the environment.
    ///
    /// # Errors
    ///
    /// Returns a ConfigError if the file cannot be loaded or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    ///
    /// Environment variables take precedence over the file. The result is
    /// validated before it is returned.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("LABWIRE_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Checks the log level and that the chosen connection method has the
    /// parameters it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        self.instrument.validate()
    }
}

impl InstrumentConfig {
    /// Check that the fields required by `method` are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.method {
            ConnectionMethod::TcpIp => {
                if self.address.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::ValidationError(
                        "tcp_ip connection requires 'address'".to_string(),
                    ));
                }
                if self.port.is_none() {
                    return Err(ConfigError::ValidationError(
                        "tcp_ip connection requires 'port'".to_string(),
                    ));
                }
            }
            ConnectionMethod::Serial => {
                if self.serial_port.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::ValidationError(
                        "serial connection requires 'serial_port'".to_string(),
                    ));
                }
                if self.baud_rate == 0 {
                    return Err(ConfigError::ValidationError(
                        "baud_rate must be greater than 0".to_string(),
                    ));
                }
            }
            ConnectionMethod::Visa => {}
        }
        Ok(())
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Build the transport described by `config`.
///
/// TCP connects immediately; serial opens lazily on first I/O.
///
/// # Errors
///
/// `UnsupportedCommunicationMethod` for VISA, `FeatureNotEnabled` for serial
/// when built without `instrument_serial`, and any connect error for TCP.
pub fn open_transport(config: &InstrumentConfig) -> Result<Box<dyn Transport>, LabwireError> {
    config.validate()?;

    match config.method {
        ConnectionMethod::TcpIp => {
            let address = config.address.as_deref().unwrap_or_default();
            let port = config.port.unwrap_or_default();
            let transport = TcpTransport::connect(address, port)?;
            transport.set_read_timeout(config.timeout())?;
            Ok(Box::new(transport))
        }
        ConnectionMethod::Serial => open_serial(config),
        ConnectionMethod::Visa => {
            Err(ConfigError::UnsupportedCommunicationMethod(config.method.to_string()).into())
        }
    }
}

#[cfg(feature = "instrument_serial")]
fn open_serial(config: &InstrumentConfig) -> Result<Box<dyn Transport>, LabwireError> {
    use crate::adapters::SerialTransport;
    use tracing::info;

    let port_name = config.serial_port.as_deref().unwrap_or_default();
    let mut transport = SerialTransport::new(port_name, config.baud_rate);
    if let Some(timeout) = config.timeout() {
        transport = transport.with_timeout(timeout);
    }
    info!(port = port_name, baud = config.baud_rate, "Serial transport configured");
    Ok(Box::new(transport))
}

#[cfg(not(feature = "instrument_serial"))]
fn open_serial(_config: &InstrumentConfig) -> Result<Box<dyn Transport>, LabwireError> {
    Err(LabwireError::FeatureNotEnabled("instrument_serial".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp_config() -> InstrumentConfig {
        InstrumentConfig {
            kind: InstrumentKind::Ts3,
            method: ConnectionMethod::TcpIp,
            address: Some("127.0.0.1".into()),
            port: Some(10001),
            serial_port: None,
            baud_rate: 9600,
            timeout_ms: None,
        }
    }

    #[test]
    fn test_tcp_requires_port() {
        let mut config = tcp_config();
        config.port = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_serial_requires_port_name() {
        let mut config = tcp_config();
        config.method = ConnectionMethod::Serial;
        assert!(config.validate().is_err());
        config.serial_port = Some("/dev/ttyUSB0".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_visa_is_unsupported() {
        let mut config = tcp_config();
        config.method = ConnectionMethod::Visa;
        match open_transport(&config) {
            Err(LabwireError::Config(ConfigError::UnsupportedCommunicationMethod(method))) => {
                assert_eq!(method, "visa");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("visa should not open"),
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let config = LabwireConfig {
            application: ApplicationConfig {
                log_level: "loud".into(),
            },
            instrument: tcp_config(),
        };
        assert!(config.validate().is_err());
    }
}
