//! Unified error types for the telemetry agent.
//!
//! A single `Error` enum that every cycle stage can convert into, keeping the
//! scheduler's failure path uniform.  None of these variants is allowed to
//! end the publish loop.  [`ConfigError`] stays separate: it only occurs at
//! startup, where `main` wraps it in `anyhow` and exits.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level agent error
// ---------------------------------------------------------------------------

/// Every fallible cycle operation funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// A pin could not be opened, read, or written.
    Hardware(HardwareError),
    /// A reading referenced a pin with no configured sensor.
    ConfigMismatch(ConfigMismatch),
    /// The gateway rejected the payload or could not be reached.
    Publish(PublishError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::ConfigMismatch(e) => write!(f, "config mismatch: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// The pin could not be exported or configured.
    OpenFailed { pin: u8, reason: String },
    /// A level read (single or burst) failed.
    ReadFailed { pin: u8, reason: String },
    /// A level write failed.
    WriteFailed { pin: u8, reason: String },
    /// The pin was never opened by this process.
    NotOpened(u8),
    /// Header position is not a GPIO line (power, ground, ID EEPROM).
    NotAGpio(u8),
    /// Burst read requested with zero samples or more than the buffer holds.
    InvalidSampleSize,
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenFailed { pin, reason } => write!(f, "open pin {pin} failed: {reason}"),
            Self::ReadFailed { pin, reason } => write!(f, "read pin {pin} failed: {reason}"),
            Self::WriteFailed { pin, reason } => write!(f, "write pin {pin} failed: {reason}"),
            Self::NotOpened(pin) => write!(f, "pin {pin} not opened"),
            Self::NotAGpio(pin) => write!(f, "header pin {pin} is not a GPIO line"),
            Self::InvalidSampleSize => write!(f, "sample size must be within 1..={}", crate::config::MAX_SAMPLE_SIZE),
        }
    }
}

impl std::error::Error for HardwareError {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Payload build errors
// ---------------------------------------------------------------------------

/// A reading whose pin resolves to no [`SensorConfig`](crate::config::SensorConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigMismatch {
    pub pin: u8,
}

impl fmt::Display for ConfigMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no sensor configured on pin {}", self.pin)
    }
}

impl std::error::Error for ConfigMismatch {}

impl From<ConfigMismatch> for Error {
    fn from(e: ConfigMismatch) -> Self {
        Self::ConfigMismatch(e)
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Connection refused, DNS failure, timeout, TLS failure.
    Transport(String),
    /// The gateway answered with something other than 200.
    Status(u16),
    /// The payload could not be serialised.
    Encode(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Status(code) => write!(f, "gateway returned HTTP {code}"),
            Self::Encode(msg) => write!(f, "payload encode failed: {msg}"),
        }
    }
}

impl std::error::Error for PublishError {}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config file is not valid JSON for [`AgentConfig`](crate::config::AgentConfig).
    Parse(serde_json::Error),
    /// A field failed validation.  The message names the field.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Invalid(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Agent-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
