//! Driver contracts and error types.
//!
//! This module defines:
//! - `UpsError` enum - Error types for the driver
//! - `SerialPort` trait - Control-line access the driver consumes
//! - `StatusSink` trait - Status publishing the driver feeds

use crate::config::ConfigError;
use crate::ups::lines::{Direction, Signal, SerialLines};
use thiserror::Error;

/// Error types for driver operations.
#[derive(Debug, Clone, Error)]
pub enum UpsError {
    /// `upstype` does not name a registry entry
    #[error("Unknown UPS type number: {0}")]
    UnknownModel(String),

    /// No `upstype` given
    #[error("No upstype set - see help text / man page")]
    MissingModel,

    /// Override names a line that cannot be used in this direction
    #[error("Can't override {direction} with {signal} (not an {direction})")]
    InvalidDirection {
        /// Offending signal
        signal: Signal,
        /// Direction of the override being parsed
        direction: Direction,
    },

    /// Directive value cannot be interpreted
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Directive name
        name: String,
        /// Rejected value
        value: String,
    },

    /// Serial device could not be opened or configured
    #[error("Cannot open {device}: {reason}")]
    DeviceOpen {
        /// Device path
        device: String,
        /// OS error text
        reason: String,
    },

    /// Line state could not be read
    #[error("Status read failed: {0}")]
    HardwareRead(String),

    /// Lines could not be set
    #[error("Line write failed: {0}")]
    HardwareWrite(String),

    /// Platform cannot perform the requested operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Shutdown requested without a model or shutdown action
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Configuration loading failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl UpsError {
    /// Whether this error belongs to the configuration group, which is
    /// always fatal at initialization.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            UpsError::UnknownModel(_)
                | UpsError::MissingModel
                | UpsError::InvalidDirection { .. }
                | UpsError::InvalidValue { .. }
                | UpsError::Config(_)
        )
    }
}

/// Access to the serial control lines of the port the UPS is wired to.
///
/// Calls are synchronous and expected to complete promptly; failures are
/// reported, never retried.
pub trait SerialPort {
    /// Read the current state of all control lines.
    ///
    /// # Errors
    /// Returns `UpsError::HardwareRead` if the state cannot be read.
    fn read_lines(&mut self) -> Result<SerialLines, UpsError>;

    /// Set the control lines to exactly `lines`, replacing prior state.
    ///
    /// # Errors
    /// Returns `UpsError::HardwareWrite` if the lines cannot be set.
    fn set_lines(&mut self, lines: SerialLines) -> Result<(), UpsError>;

    /// Emit a break pulse of the given duration.
    ///
    /// # Errors
    /// Returns `UpsError::UnsupportedOperation` when the platform cannot
    /// send a break, `UpsError::HardwareWrite` when sending fails.
    fn send_break(&mut self, duration: i32) -> Result<(), UpsError>;
}

/// Receiver of published UPS state.
///
/// Status is staged with `status_init`/`status_set` and becomes visible
/// only on `status_commit`.
pub trait StatusSink {
    /// Publish an informational value (`ups.mfr`, `ups.model`, ...).
    fn set_info(&mut self, key: &str, value: &str);

    /// Start staging a new status set.
    fn status_init(&mut self);

    /// Add a tag to the staged status set.
    fn status_set(&mut self, tag: &'static str);

    /// Make the staged status set visible.
    fn status_commit(&mut self);

    /// Report that communication with the UPS works.
    fn comm_good(&mut self);

    /// Report that communication with the UPS failed.
    fn comm_fail(&mut self, reason: &str);

    /// Mark published data as current.
    fn data_ok(&mut self);

    /// Mark published data as stale.
    fn data_stale(&mut self);
}

impl<P: SerialPort + ?Sized> SerialPort for &mut P {
    fn read_lines(&mut self) -> Result<SerialLines, UpsError> {
        (**self).read_lines()
    }

    fn set_lines(&mut self, lines: SerialLines) -> Result<(), UpsError> {
        (**self).set_lines(lines)
    }

    fn send_break(&mut self, duration: i32) -> Result<(), UpsError> {
        (**self).send_break(duration)
    }
}
