//! # ccups driver library
//!
//! Driver for "dumb" contact-closure UPS units that signal their state by
//! raising and lowering RS-232 control lines.
//!
//! # Module Structure
//!
//! - [`core`] - UpsDriver struct, poll loop, shutdown entry point
//! - [`evaluator`] - Line state to status tags
//! - [`overrides`] - `CP`/`SD`/`OL`/`LB`/`RB`/`BYPASS` override parsing
//! - [`port`] - Serial port implementations (TTY and simulation)
//! - [`publisher`] - Published UPS state
//! - [`registry`] - Built-in model table
//! - [`session`] - Model selection and frozen per-run descriptor
//! - [`shutdown`] - Shutdown sequencing
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         ccups_hal                              │
//! │  ┌──────────────┐    ┌──────────────┐    ┌─────────────────┐   │
//! │  │ ModelRegistry│───►│ Session      │◄───│ Override parser │   │
//! │  └──────────────┘    └──────┬───────┘    └─────────────────┘   │
//! │                             │                                  │
//! │                             ▼                                  │
//! │  ┌──────────────┐    ┌──────────────┐    ┌─────────────────┐   │
//! │  │ Publisher    │◄───│ UpsDriver    │───►│ Shutdown        │   │
//! │  │ (StatusSink) │    │ (poll loop)  │    │ sequencer       │   │
//! │  └──────────────┘    └──────┬───────┘    └─────────────────┘   │
//! │                             ▼                                  │
//! │                     ┌────────────────┐                         │
//! │                     │  SerialPort    │ (TTY or simulated)      │
//! │                     └────────────────┘                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod core;
pub mod evaluator;
pub mod overrides;
pub mod port;
pub mod publisher;
pub mod registry;
pub mod session;
pub mod shutdown;

// Re-export key types for convenience
pub use crate::core::{PollStats, UpsDriver};
pub use crate::port::{SimulatedPort, TtyPort};
pub use crate::publisher::{StatusPublisher, UpsSnapshot};
pub use crate::registry::{ModelRegistry, UPS_TYPES};
pub use crate::session::{Session, SessionBuilder, UpsIdentity};
pub use crate::shutdown::{ShutdownMode, ShutdownOutcome, ShutdownSequencer};
