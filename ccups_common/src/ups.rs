//! Contact-closure UPS types and driver contracts.
//!
//! This module contains the control-line bitflags, the model descriptor,
//! the status set and the interfaces the driver consumes from its
//! surroundings (serial port, status publishing).

pub mod config;
pub mod consts;
pub mod descriptor;
pub mod driver;
pub mod lines;
pub mod status;
