//! Driver constants.

use std::time::Duration;

/// Canonical driver name (used for published info and logging).
pub const DRIVER_NAME: &str = "Generic contact-closure UPS driver";

/// Break pulse duration handed to `tcsendbreak` for break-style shutdown.
pub const BREAK_DURATION: i32 = 4901;

/// Largest shutdown hold accepted, in seconds. Larger values clamp here.
pub const MAX_HOLD_SECS: u64 = u32::MAX as u64;

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default poll interval as Duration.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS);

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ccups/ups.toml";

/// Default serial device
pub const DEFAULT_DEVICE: &str = "/dev/ttyS0";

/// Maximum number of status tags in one committed status set.
pub const MAX_STATUS_TAGS: usize = 4;
