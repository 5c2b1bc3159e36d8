//! Prelude module for common re-exports.
//!
//! ```rust
//! use ccups_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::ups::config::{DriverConfig, UpsConfig, VAR_TABLE, VarSpec};

// ─── Lines & Descriptors ───────────────────────────────────────────
pub use crate::ups::descriptor::{InputSignal, ModelDescriptor, ShutdownAction, StatusKind};
pub use crate::ups::lines::{Direction, SerialLines, Signal};

// ─── Status & Contracts ────────────────────────────────────────────
pub use crate::ups::driver::{SerialPort, StatusSink, UpsError};
pub use crate::ups::status::StatusSet;
