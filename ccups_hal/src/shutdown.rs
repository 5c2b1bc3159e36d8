//! Shutdown sequencing.
//!
//! Drives the model's shutdown action on the port: either a break pulse
//! or an exact line assertion, followed by an optional hold so the UPS
//! has time to cut power before the host goes away.
//!
//! Failures are escalated according to [`ShutdownMode`]: only the mode
//! dedicated to forced shutdown turns them into errors, otherwise they
//! are logged and reported in the returned [`ShutdownOutcome`].

use ccups_common::ups::consts::{BREAK_DURATION, MAX_HOLD_SECS};
use ccups_common::ups::descriptor::{ModelDescriptor, ShutdownAction};
use ccups_common::ups::driver::{SerialPort, UpsError};
use ccups_common::ups::lines::SerialLines;
use std::time::Duration;
use tracing::{error, info};

/// How shutdown failures propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Failures are logged and reported, never fatal.
    Reported,
    /// Failures are returned as errors and end the process.
    Forced,
}

/// Result of a non-fatal shutdown attempt.
#[derive(Debug, Clone)]
pub enum ShutdownOutcome {
    /// A break pulse of the given duration was sent.
    BreakSent(i32),
    /// The lines were asserted and held for the given time.
    Asserted {
        /// Lines asserted
        lines: SerialLines,
        /// Hold time after assertion
        held: Duration,
    },
    /// The shutdown failed; only returned in [`ShutdownMode::Reported`].
    Failed(UpsError),
}

/// Blocking wait after asserting the shutdown lines.
pub trait HoldTimer {
    /// Block for `duration`. Not cancellable.
    fn hold(&mut self, duration: Duration);
}

/// Hold timer backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl HoldTimer for ThreadSleep {
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clamp a hold request to the supported range.
pub fn clamp_hold(duration: Duration) -> Duration {
    duration.min(Duration::from_secs(MAX_HOLD_SECS))
}

/// Runs the shutdown action of a model.
#[derive(Debug)]
pub struct ShutdownSequencer<T: HoldTimer = ThreadSleep> {
    /// Escalation mode
    mode: ShutdownMode,
    /// Hold time after line assertion
    hold: Option<Duration>,
    /// Timer used for the hold
    timer: T,
}

impl ShutdownSequencer<ThreadSleep> {
    /// Sequencer that sleeps the calling thread for the hold.
    pub fn new(mode: ShutdownMode, hold: Option<Duration>) -> Self {
        Self::with_timer(mode, hold, ThreadSleep)
    }
}

impl<T: HoldTimer> ShutdownSequencer<T> {
    /// Sequencer with a custom hold timer.
    pub fn with_timer(mode: ShutdownMode, hold: Option<Duration>, timer: T) -> Self {
        Self {
            mode,
            hold: hold.map(clamp_hold),
            timer,
        }
    }

    /// Escalation mode.
    pub fn mode(&self) -> ShutdownMode {
        self.mode
    }

    /// Hold timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Power down the attached load.
    ///
    /// `descriptor` is `None` when no model was selected.
    ///
    /// # Errors
    /// In [`ShutdownMode::Forced`] returns `UpsError::NotConfigured`,
    /// `UpsError::UnsupportedOperation` or `UpsError::HardwareWrite`.
    /// In [`ShutdownMode::Reported`] never fails.
    pub fn shutdown<P>(
        &mut self,
        descriptor: Option<&ModelDescriptor>,
        port: &mut P,
    ) -> Result<ShutdownOutcome, UpsError>
    where
        P: SerialPort + ?Sized,
    {
        match self.execute(descriptor, port) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("UPS shutdown failed: {e}");
                match self.mode {
                    ShutdownMode::Forced => Err(e),
                    ShutdownMode::Reported => Ok(ShutdownOutcome::Failed(e)),
                }
            }
        }
    }

    fn execute<P>(
        &mut self,
        descriptor: Option<&ModelDescriptor>,
        port: &mut P,
    ) -> Result<ShutdownOutcome, UpsError>
    where
        P: SerialPort + ?Sized,
    {
        let descriptor = descriptor.ok_or_else(|| {
            UpsError::NotConfigured("No upstype set - see help text / man page".to_string())
        })?;

        let action = descriptor.shutdown_action().ok_or_else(|| {
            UpsError::NotConfigured("No shutdown command defined for this model".to_string())
        })?;

        match action {
            ShutdownAction::Break => {
                info!("Sending break ({}) to shut down {}", BREAK_DURATION, descriptor.description);
                port.send_break(BREAK_DURATION)?;
                Ok(ShutdownOutcome::BreakSent(BREAK_DURATION))
            }
            ShutdownAction::Assert(lines) => {
                info!("Asserting shutdown lines {:?}", lines);
                port.set_lines(lines)?;

                let held = self.hold.unwrap_or(Duration::ZERO);
                if self.hold.is_some() {
                    info!("Holding shutdown signal for {} seconds...", held.as_secs());
                }
                if !held.is_zero() {
                    self.timer.hold(held);
                }
                Ok(ShutdownOutcome::Asserted { lines, held })
            }
        }
    }
}
