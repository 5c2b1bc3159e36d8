//! UPS model descriptor types.
//!
//! This module defines:
//! - `InputSignal` - `(line, active)` predicate for one status condition
//! - `ShutdownAction` - physical action that powers the load down
//! - `StatusKind` - the four status conditions read from input lines
//! - `ModelDescriptor` - default line semantics of one supported model

use crate::ups::lines::SerialLines;
use std::fmt;

/// Input-line predicate for one status condition.
///
/// The condition holds when the lines in `line` read exactly `active`.
/// A line present in `line` but absent from `active` is active-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSignal {
    line: SerialLines,
    active: SerialLines,
}

impl InputSignal {
    /// Signal that is not wired.
    pub const DISABLED: Self = Self {
        line: SerialLines::empty(),
        active: SerialLines::empty(),
    };

    /// Build a predicate. Bits of `active` outside `line` are dropped.
    pub const fn new(line: SerialLines, active: SerialLines) -> Self {
        Self {
            line,
            active: active.intersection(line),
        }
    }

    /// Lines sampled by this predicate.
    #[inline]
    pub const fn line(&self) -> SerialLines {
        self.line
    }

    /// Expected value of the sampled lines.
    #[inline]
    pub const fn active(&self) -> SerialLines {
        self.active
    }

    /// Whether any line is wired.
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        !self.line.is_empty()
    }

    /// Whether `raw` matches the expected value on the sampled lines.
    ///
    /// A disabled predicate matches every raw state.
    #[inline]
    pub fn is_asserted(&self, raw: SerialLines) -> bool {
        raw & self.line == self.active
    }
}

impl fmt::Display for InputSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_enabled() {
            return f.write_str("none");
        }
        let mut first = true;
        for (name, bit) in self.line.iter_names() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if !self.active.contains(bit) {
                f.write_str("-")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// Physical action taken to shut the UPS down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    /// Set the modem lines to exactly this mask.
    Assert(SerialLines),
    /// Emit a break pulse instead of asserting lines.
    Break,
}

impl ShutdownAction {
    /// Interpret a shutdown line mask. A mask of exactly `ST` means break.
    pub const fn from_lines(lines: SerialLines) -> Self {
        if lines.bits() == SerialLines::ST.bits() {
            ShutdownAction::Break
        } else {
            ShutdownAction::Assert(lines)
        }
    }
}

/// Status conditions derived from input lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// On line (mains power present)
    OnLine,
    /// Low battery
    LowBattery,
    /// Replace battery
    ReplaceBattery,
    /// Bypass active
    Bypass,
}

impl StatusKind {
    /// All kinds in evaluation order.
    pub const ALL: [StatusKind; 4] = [
        StatusKind::OnLine,
        StatusKind::LowBattery,
        StatusKind::ReplaceBattery,
        StatusKind::Bypass,
    ];

    /// Configuration directive overriding this kind.
    pub const fn directive(self) -> &'static str {
        match self {
            StatusKind::OnLine => "OL",
            StatusKind::LowBattery => "LB",
            StatusKind::ReplaceBattery => "RB",
            StatusKind::Bypass => "BYPASS",
        }
    }
}

/// Default line semantics for one supported UPS model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Manufacturer display name
    pub manufacturer: &'static str,
    /// Model display name
    pub model: &'static str,
    /// Long description used in listings
    pub description: &'static str,
    /// Lines asserted during normal operation (cable power)
    pub normal: SerialLines,
    /// Shutdown line mask; `None` when the model has no shutdown command
    pub shutdown: Option<SerialLines>,
    /// On-line predicate
    pub online: InputSignal,
    /// Low-battery predicate
    pub low_battery: InputSignal,
    /// Replace-battery predicate
    pub replace_battery: InputSignal,
    /// Bypass predicate
    pub bypass: InputSignal,
}

impl ModelDescriptor {
    /// Predicate for the given status kind.
    pub const fn signal(&self, kind: StatusKind) -> &InputSignal {
        match kind {
            StatusKind::OnLine => &self.online,
            StatusKind::LowBattery => &self.low_battery,
            StatusKind::ReplaceBattery => &self.replace_battery,
            StatusKind::Bypass => &self.bypass,
        }
    }

    /// Mutable predicate for the given status kind.
    pub fn signal_mut(&mut self, kind: StatusKind) -> &mut InputSignal {
        match kind {
            StatusKind::OnLine => &mut self.online,
            StatusKind::LowBattery => &mut self.low_battery,
            StatusKind::ReplaceBattery => &mut self.replace_battery,
            StatusKind::Bypass => &mut self.bypass,
        }
    }

    /// Shutdown action, if the model defines one.
    pub const fn shutdown_action(&self) -> Option<ShutdownAction> {
        match self.shutdown {
            Some(lines) => Some(ShutdownAction::from_lines(lines)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_is_subset_of_line() {
        let sig = InputSignal::new(SerialLines::CTS, SerialLines::CTS | SerialLines::DCD);
        assert_eq!(sig.active(), SerialLines::CTS);
    }

    #[test]
    fn test_disabled_signal_matches_everything() {
        for raw in [0, libc::TIOCM_CTS, libc::TIOCM_CD | libc::TIOCM_DSR] {
            assert!(InputSignal::DISABLED.is_asserted(SerialLines::from_raw(raw)));
        }
    }

    #[test]
    fn test_active_low_signal() {
        let sig = InputSignal::new(SerialLines::CTS, SerialLines::empty());
        assert!(sig.is_asserted(SerialLines::empty()));
        assert!(!sig.is_asserted(SerialLines::CTS));
    }

    #[test]
    fn test_shutdown_action_break_marker() {
        assert_eq!(ShutdownAction::from_lines(SerialLines::ST), ShutdownAction::Break);
        assert_eq!(
            ShutdownAction::from_lines(SerialLines::ST | SerialLines::DTR),
            ShutdownAction::Assert(SerialLines::ST | SerialLines::DTR)
        );
        assert_eq!(
            ShutdownAction::from_lines(SerialLines::empty()),
            ShutdownAction::Assert(SerialLines::empty())
        );
    }

    #[test]
    fn test_input_signal_display() {
        assert_eq!(InputSignal::DISABLED.to_string(), "none");
        let sig = InputSignal::new(SerialLines::CTS | SerialLines::DCD, SerialLines::DCD);
        assert_eq!(sig.to_string(), "-CTS DCD");
    }
}
