//! Serial port implementations.
//!
//! - [`tty`] - Real serial device driven through modem-control ioctls
//! - [`simulation`] - In-memory port for development and testing
//!
//! Both implement [`SerialPort`](ccups_common::ups::driver::SerialPort).

pub mod simulation;
pub mod tty;

pub use simulation::SimulatedPort;
pub use tty::TtyPort;
