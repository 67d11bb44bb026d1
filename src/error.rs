//! Custom error types for the crate.
//!
//! Errors are layered the same way the I/O is:
//!
//! - **`Ts3Error`**: everything the framed fixture protocol can report. A NACK from the
//!   device carries one of eleven fixed causes, a reply with the wrong command code maps to
//!   the `-1` sentinel, and transport failures are wrapped without further classification.
//! - **`Mx100tpError`**: the plain-text power supply driver, which only adds argument
//!   validation and readback parsing on top of raw I/O.
//! - **`ConfigError`**: loading and validating `labwire.toml`, including connection methods
//!   that have no transport implementation.
//! - **`LabwireError`**: the umbrella type used by the command-line tool. Every layer
//!   converts into it with `#[from]`, so the `?` operator works across layers.

use thiserror::Error;

/// Convenience alias for results using the umbrella error type.
pub type AppResult<T> = std::result::Result<T, LabwireError>;

/// Sentinel code carried by [`Ts3Error::UnexpectedCode`].
pub const UNEXPECTED_CODE_SENTINEL: i32 = -1;

/// Failures raised by the TS3 fixture protocol adapter.
#[derive(Error, Debug)]
pub enum Ts3Error {
    /// The fixture rejected the command. `message` is the fixed text for `code`, or the raw
    /// code itself when the code is outside the documented vocabulary.
    #[error("TS3 NACK ({code}): {message}")]
    Nack {
        /// Raw code string from field 2 of the reply.
        code: String,
        /// Human-readable cause.
        message: String,
    },

    /// The reply carried neither the expected command code nor a NACK.
    #[error("TS3 replied with an unexpected command code ({code})")]
    UnexpectedCode {
        /// Always [`UNEXPECTED_CODE_SENTINEL`].
        code: i32,
    },

    /// An acknowledged reply was shorter than the operation needs.
    #[error("TS3 reply has {actual} fields, expected at least {expected}")]
    Malformed {
        /// Number of fields the operation reads.
        expected: usize,
        /// Number of fields received.
        actual: usize,
    },

    /// A payload field could not be converted to the operation's result type.
    #[error("TS3 payload field '{field}' is not a valid {kind}")]
    InvalidPayload {
        /// The offending field.
        field: String,
        /// What it should have been.
        kind: &'static str,
    },

    /// The reply bytes are not valid UTF-8 text.
    #[error("TS3 reply is not valid text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The transport could not write or read.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl Ts3Error {
    /// Mismatched reply code error.
    pub fn unexpected() -> Self {
        Ts3Error::UnexpectedCode {
            code: UNEXPECTED_CODE_SENTINEL,
        }
    }
}

/// Failures raised by the MX100TP power supply driver.
#[derive(Error, Debug)]
pub enum Mx100tpError {
    /// Settings store index outside the 0-49 range.
    #[error("Memory store {0} out of range. 0-49 inclusive is allowed.")]
    MemoryStoreOutOfRange(u8),

    /// A readback could not be parsed as a number.
    #[error("Invalid readback from MX100TP: '{0}'")]
    InvalidReadback(String),

    /// The reply bytes are not valid UTF-8 text.
    #[error("MX100TP reply is not valid text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The transport could not write or read.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Figment could not read or deserialize the configuration sources.
    #[error("Configuration load error: {0}")]
    LoadError(#[from] Box<figment::Error>),

    /// The configuration parsed but is not usable.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// The requested connection method has no transport implementation.
    #[error("Unsupported communication method: {0}")]
    UnsupportedCommunicationMethod(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::LoadError(Box::new(err))
    }
}

/// Umbrella error for the command-line tool.
#[derive(Error, Debug)]
pub enum LabwireError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// See [`Ts3Error`].
    #[error(transparent)]
    Ts3(#[from] Ts3Error),

    /// See [`Mx100tpError`].
    #[error(transparent)]
    Mx100tp(#[from] Mx100tpError),

    /// Opening a transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cargo feature required by the configuration was compiled out.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}
