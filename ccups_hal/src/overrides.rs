//! Operator overrides of a model's line semantics.
//!
//! Override strings are matched by substring, order independent:
//! `"DTR"` sets DTR unless `"-DTR"` also appears, `"NULL"` or `"none"`
//! clears everything. This keeps compatibility with existing
//! configurations, including the fact that `"DTRX"` still counts as DTR.
//! All matching lives in [`Directive`].

use ccups_common::ups::descriptor::InputSignal;
use ccups_common::ups::driver::UpsError;
use ccups_common::ups::lines::{Direction, SerialLines, Signal};
use tracing::{debug, warn};

/// Tokens that disable a signal entirely.
const DISABLE_TOKENS: [&str; 2] = ["NULL", "none"];

/// Operator override string.
#[derive(Debug, Clone, Copy)]
pub struct Directive<'a>(&'a str);

impl<'a> Directive<'a> {
    /// Wrap an override string.
    pub const fn new(value: &'a str) -> Self {
        Self(value)
    }

    /// Whether the signal is mentioned at all (negated or not).
    pub fn mentions(&self, signal: Signal) -> bool {
        self.0.contains(signal.name())
    }

    /// Whether the negated form of the signal is present.
    pub fn negates(&self, signal: Signal) -> bool {
        self.0.contains(signal.negated_name())
    }

    /// Whether the directive disables the signal.
    pub fn disables(&self) -> bool {
        DISABLE_TOKENS.iter().any(|token| self.0.contains(token))
    }

    /// First mentioned signal that cannot be used in `direction`.
    fn misdirected(&self, direction: Direction) -> Option<Signal> {
        let wrong = match direction {
            Direction::Output => &Signal::INPUTS[..],
            Direction::Input => &Signal::OUTPUTS[..],
        };
        wrong.iter().copied().find(|sig| self.mentions(*sig))
    }
}

/// Result of applying one override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Override<T> {
    /// New value
    pub value: T,
    /// Whether the value differs from the prior one
    pub changed: bool,
}

impl<T> Override<T> {
    /// The override left the mapping as it was, which usually means a typo.
    pub fn is_no_effective_change(&self) -> bool {
        !self.changed
    }
}

/// Resolve an output override to a line mask, ignoring any prior value.
///
/// # Errors
/// Returns `UpsError::InvalidDirection` if an input-only line is named.
pub fn output_mask(value: &str) -> Result<SerialLines, UpsError> {
    let directive = Directive::new(value);
    let mut line = SerialLines::empty();

    for signal in [Signal::Dtr, Signal::Rts] {
        if directive.mentions(signal) && !directive.negates(signal) {
            debug!("output override: {signal}");
            line |= signal.line();
        }
    }

    // ST has no negated form.
    if directive.mentions(Signal::St) {
        debug!("output override: ST");
        line |= SerialLines::ST;
    }

    if let Some(signal) = directive.misdirected(Direction::Output) {
        return Err(UpsError::InvalidDirection {
            signal,
            direction: Direction::Output,
        });
    }

    if directive.disables() {
        debug!("output override: disable");
        line = SerialLines::empty();
    }

    Ok(line)
}

/// Resolve an input override to a predicate, ignoring any prior value.
///
/// # Errors
/// Returns `UpsError::InvalidDirection` if an output-only line is named.
pub fn input_signal(value: &str) -> Result<InputSignal, UpsError> {
    let directive = Directive::new(value);
    let mut line = SerialLines::empty();
    let mut active = SerialLines::empty();

    for signal in Signal::INPUTS {
        if !directive.mentions(signal) {
            continue;
        }
        line |= signal.line();
        if directive.negates(signal) {
            debug!("input override: {signal} (active low)");
        } else {
            debug!("input override: {signal} (active high)");
            active |= signal.line();
        }
    }

    if let Some(signal) = directive.misdirected(Direction::Input) {
        return Err(UpsError::InvalidDirection {
            signal,
            direction: Direction::Input,
        });
    }

    if directive.disables() {
        debug!("input override: disable");
        return Ok(InputSignal::DISABLED);
    }

    Ok(InputSignal::new(line, active))
}

/// Replace an output line mask according to `value`.
///
/// Logs a warning when the result equals `prior`.
///
/// # Errors
/// Returns `UpsError::InvalidDirection` if an input-only line is named.
pub fn parse_output_signals(
    value: &str,
    prior: SerialLines,
) -> Result<Override<SerialLines>, UpsError> {
    let line = output_mask(value)?;
    let changed = line != prior;
    if !changed {
        warn!("output overrides specified, but no effective difference - check for typos? ({value:?})");
    }
    Ok(Override {
        value: line,
        changed,
    })
}

/// Replace an input predicate according to `value`.
///
/// Logs a warning when neither the line mask nor the expected value changed.
///
/// # Errors
/// Returns `UpsError::InvalidDirection` if an output-only line is named.
pub fn parse_input_signals(
    value: &str,
    prior: InputSignal,
) -> Result<Override<InputSignal>, UpsError> {
    let signal = input_signal(value)?;
    let changed = signal != prior;
    if !changed {
        warn!("input overrides specified, but no effective difference - check for typos? ({value:?})");
    }
    Ok(Override {
        value: signal,
        changed,
    })
}
