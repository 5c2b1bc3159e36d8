//! Contact-Closure UPS Common Library
//!
//! This crate provides the shared types, collaborator traits and
//! configuration loading used by every crate of the workspace.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`ups`] - Serial control lines, model descriptors, status set, driver contracts
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use ccups_common::prelude::*;
//!
//! let ol = InputSignal::new(SerialLines::CTS, SerialLines::empty());
//! assert!(ol.is_asserted(SerialLines::empty()));
//! ```

pub mod config;
pub mod prelude;
pub mod ups;
