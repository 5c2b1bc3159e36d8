//! Driver core and poll loop.
//!
//! The `UpsDriver` struct ties a frozen [`Session`] to a serial port and
//! a [`StatusPublisher`]. It owns initialization (line setup and
//! identity publishing), the periodic poll loop and shutdown.

use ccups_common::ups::config::UpsConfig;
use ccups_common::ups::consts::DRIVER_NAME;
use ccups_common::ups::driver::{SerialPort, StatusSink, UpsError};
use ccups_common::ups::status::StatusSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::evaluator;
use crate::publisher::StatusPublisher;
use crate::registry::ModelRegistry;
use crate::session::Session;
use crate::shutdown::{HoldTimer, ShutdownMode, ShutdownOutcome, ShutdownSequencer};

/// Poll statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollStats {
    /// Poll cycles executed
    pub polls: u64,
    /// Poll cycles whose line read failed
    pub failed_polls: u64,
}

/// Contact-closure UPS driver bound to one port.
pub struct UpsDriver<P: SerialPort> {
    /// Frozen model selection and overrides
    session: Session,
    /// Port the UPS is wired to
    port: P,
    /// Published state
    publisher: StatusPublisher,
    /// Running flag for poll loop control
    running: Arc<AtomicBool>,
    /// Interval between polls
    poll_interval: Duration,
    /// Hold time after asserting the shutdown lines
    hold: Option<Duration>,
    /// Poll statistics
    stats: PollStats,
}

impl<P: SerialPort> UpsDriver<P> {
    /// Initialize the driver.
    ///
    /// Selects the model, applies overrides, raises the normal-operation
    /// lines on `port` and publishes the UPS identity.
    ///
    /// # Errors
    /// - Any configuration error (fatal, nothing is written to the port)
    /// - `UpsError::HardwareWrite` if the normal lines cannot be set
    pub fn init(config: &UpsConfig, registry: &ModelRegistry, mut port: P) -> Result<Self, UpsError> {
        let session = Session::from_config(registry, config)?;
        let poll_interval = config.poll_interval()?;
        let hold = config.hold_time()?;

        let descriptor = session.descriptor();
        debug!("Raising cable power lines {:?}", descriptor.normal);
        port.set_lines(descriptor.normal)?;

        let mut publisher = StatusPublisher::new();
        let identity = session.identity();
        publisher.set_info("ups.mfr", &identity.manufacturer);
        publisher.set_info("ups.model", &identity.model);
        if let Some(serial) = identity.serial.as_deref() {
            publisher.set_info("ups.serial", serial);
        }
        publisher.set_info("driver.name", DRIVER_NAME);
        publisher.set_info("driver.version", env!("CARGO_PKG_VERSION"));

        info!(
            "Driver initialized for UPS type {} (poll every {}s)",
            session.index(),
            poll_interval.as_secs()
        );

        Ok(Self {
            session,
            port,
            publisher,
            running: Arc::new(AtomicBool::new(true)),
            poll_interval,
            hold,
            stats: PollStats::default(),
        })
    }

    /// Run one poll cycle. Returns the committed status on success.
    pub fn update_info(&mut self) -> Option<StatusSet> {
        self.stats.polls += 1;
        let status = evaluator::poll(self.session.descriptor(), &mut self.port, &mut self.publisher);
        if status.is_none() {
            self.stats.failed_polls += 1;
        }
        status
    }

    /// Poll until the running flag is cleared. The flag starts set, so a
    /// stop requested before the loop starts is honored.
    ///
    /// Failed polls are not fatal; the loop keeps going and the published
    /// data stays marked stale until a read succeeds.
    pub fn run(&mut self) {
        info!(
            "Starting poll loop (interval={}s)...",
            self.poll_interval.as_secs()
        );

        while self.running.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();
            self.update_info();

            let elapsed = cycle_start.elapsed();
            if elapsed < self.poll_interval {
                std::thread::sleep(self.poll_interval - elapsed);
            }
        }

        info!(
            "Poll loop stopped after {} polls ({} failed)",
            self.stats.polls, self.stats.failed_polls
        );
    }

    /// Power down the attached load, holding with `std::thread::sleep`.
    ///
    /// # Errors
    /// See [`ShutdownSequencer::shutdown`].
    pub fn shutdown(&mut self, mode: ShutdownMode) -> Result<ShutdownOutcome, UpsError> {
        let mut sequencer = ShutdownSequencer::new(mode, self.hold);
        sequencer.shutdown(Some(self.session.descriptor()), &mut self.port)
    }

    /// Power down the attached load using a custom hold timer.
    ///
    /// # Errors
    /// See [`ShutdownSequencer::shutdown`].
    pub fn shutdown_with_timer<T: HoldTimer>(
        &mut self,
        mode: ShutdownMode,
        timer: T,
    ) -> Result<ShutdownOutcome, UpsError> {
        let mut sequencer = ShutdownSequencer::with_timer(mode, self.hold, timer);
        sequencer.shutdown(Some(self.session.descriptor()), &mut self.port)
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Frozen session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Published state.
    pub fn publisher(&self) -> &StatusPublisher {
        &self.publisher
    }

    /// Underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutable access to the underlying port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Poll statistics.
    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Configured poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::SimulatedPort;
    use ccups_common::ups::lines::SerialLines;

    fn config(pairs: &[(&str, &str)]) -> UpsConfig {
        let mut cfg = UpsConfig::default();
        for (name, value) in pairs {
            cfg.set_var(name, value).unwrap();
        }
        cfg
    }

    #[test]
    fn test_init_publishes_identity() {
        let cfg = config(&[("upstype", "0"), ("serial", "A1")]);
        let driver = UpsDriver::init(&cfg, &ModelRegistry::builtin(), SimulatedPort::new()).unwrap();
        let publisher = driver.publisher();
        assert_eq!(publisher.info("ups.mfr"), Some("UPSonic"));
        assert_eq!(publisher.info("ups.model"), Some("LAN Saver 600"));
        assert_eq!(publisher.info("ups.serial"), Some("A1"));
        assert_eq!(publisher.info("driver.name"), Some(DRIVER_NAME));
        assert!(publisher.info("driver.version").is_some());
        assert_eq!(publisher.status(), None);
    }

    #[test]
    fn test_init_sets_normal_lines_once() {
        let cfg = config(&[("upstype", "0")]);
        let driver = UpsDriver::init(&cfg, &ModelRegistry::builtin(), SimulatedPort::new()).unwrap();
        assert_eq!(driver.port().writes(), &[SerialLines::DTR | SerialLines::RTS]);
    }

    #[test]
    fn test_config_error_writes_nothing() {
        let mut port = SimulatedPort::new();
        let cfg = config(&[("upstype", "0"), ("OL", "RTS")]);
        let err = UpsDriver::init(&cfg, &ModelRegistry::builtin(), &mut port)
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(port.writes().is_empty());
    }

    #[test]
    fn test_bad_poll_interval_rejected() {
        let cfg = config(&[("upstype", "0"), ("pollinterval", "0")]);
        let result = UpsDriver::init(&cfg, &ModelRegistry::builtin(), SimulatedPort::new());
        assert!(matches!(result, Err(UpsError::InvalidValue { .. })));
    }

    #[test]
    fn test_poll_stats() {
        let cfg = config(&[("upstype", "0")]);
        let mut driver = UpsDriver::init(&cfg, &ModelRegistry::builtin(), SimulatedPort::new()).unwrap();
        assert!(driver.update_info().is_some());
        driver.port_mut().set_fail_reads(true);
        assert!(driver.update_info().is_none());
        assert_eq!(
            driver.stats(),
            PollStats {
                polls: 2,
                failed_polls: 1
            }
        );
    }

    #[test]
    fn test_run_exits_when_flag_cleared() {
        let cfg = config(&[("upstype", "0"), ("pollinterval", "1")]);
        let mut driver = UpsDriver::init(&cfg, &ModelRegistry::builtin(), SimulatedPort::new()).unwrap();
        let running = driver.running_flag();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            running.store(false, Ordering::SeqCst);
        });
        driver.run();
        stopper.join().unwrap();
        assert!(driver.stats().polls >= 1);
    }
}
