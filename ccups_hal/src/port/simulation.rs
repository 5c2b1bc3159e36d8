//! Simulated serial port.
//!
//! The `SimulatedPort` keeps line state in memory:
//! - Input lines are set by the caller to emulate the UPS
//! - Output line assertions and break pulses are recorded
//! - Read failures and missing break support can be injected

use ccups_common::ups::driver::{SerialPort, UpsError};
use ccups_common::ups::lines::SerialLines;
use tracing::debug;

/// In-memory serial port.
#[derive(Debug, Clone)]
pub struct SimulatedPort {
    /// Lines driven by the simulated UPS
    inputs: SerialLines,
    /// Lines driven by the host
    outputs: SerialLines,
    /// Fail every read while set
    fail_reads: bool,
    /// Whether break pulses are supported
    break_supported: bool,
    /// Every mask passed to `set_lines`, in order
    writes: Vec<SerialLines>,
    /// Duration of every break pulse sent, in order
    breaks: Vec<i32>,
    /// Number of successful reads
    reads: u64,
}

impl SimulatedPort {
    /// Create a port with all lines low.
    pub fn new() -> Self {
        Self {
            inputs: SerialLines::empty(),
            outputs: SerialLines::empty(),
            fail_reads: false,
            break_supported: true,
            writes: Vec::new(),
            breaks: Vec::new(),
            reads: 0,
        }
    }

    /// Create a port with the given input lines asserted.
    pub fn with_inputs(inputs: SerialLines) -> Self {
        let mut port = Self::new();
        port.set_inputs(inputs);
        port
    }

    /// Set the lines the simulated UPS drives. Output bits are ignored.
    pub fn set_inputs(&mut self, inputs: SerialLines) {
        self.inputs = inputs & SerialLines::INPUTS;
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Enable or disable break support.
    pub fn set_break_supported(&mut self, supported: bool) {
        self.break_supported = supported;
    }

    /// Lines currently driven by the host.
    pub fn outputs(&self) -> SerialLines {
        self.outputs
    }

    /// All masks written so far.
    pub fn writes(&self) -> &[SerialLines] {
        &self.writes
    }

    /// All break pulses sent so far.
    pub fn breaks(&self) -> &[i32] {
        &self.breaks
    }

    /// Number of successful reads.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

impl Default for SimulatedPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for SimulatedPort {
    fn read_lines(&mut self) -> Result<SerialLines, UpsError> {
        if self.fail_reads {
            return Err(UpsError::HardwareRead("simulated read failure".to_string()));
        }
        self.reads += 1;
        Ok(self.inputs | self.outputs)
    }

    fn set_lines(&mut self, lines: SerialLines) -> Result<(), UpsError> {
        debug!("simulated TIOCMSET {:?}", lines);
        self.writes.push(lines);
        self.outputs = lines & SerialLines::OUTPUTS;
        Ok(())
    }

    fn send_break(&mut self, duration: i32) -> Result<(), UpsError> {
        if !self.break_supported {
            return Err(UpsError::UnsupportedOperation(
                "simulated port cannot send a break".to_string(),
            ));
        }
        debug!("simulated break for {}", duration);
        self.breaks.push(duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_reports_inputs_and_outputs() {
        let mut port = SimulatedPort::with_inputs(SerialLines::CTS | SerialLines::DTR);
        port.set_lines(SerialLines::RTS).unwrap();
        assert_eq!(port.read_lines().unwrap(), SerialLines::CTS | SerialLines::RTS);
        assert_eq!(port.reads(), 1);
    }

    #[test]
    fn set_lines_replaces_previous_state() {
        let mut port = SimulatedPort::new();
        port.set_lines(SerialLines::DTR | SerialLines::RTS).unwrap();
        port.set_lines(SerialLines::DTR).unwrap();
        assert_eq!(port.outputs(), SerialLines::DTR);
        assert_eq!(port.writes().len(), 2);
    }

    #[test]
    fn injected_failures() {
        let mut port = SimulatedPort::new();
        port.set_fail_reads(true);
        assert!(matches!(port.read_lines(), Err(UpsError::HardwareRead(_))));
        port.set_break_supported(false);
        assert!(matches!(
            port.send_break(4901),
            Err(UpsError::UnsupportedOperation(_))
        ));
        assert!(port.breaks().is_empty());
    }
}
