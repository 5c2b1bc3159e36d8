//! Published UPS state.
//!
//! The `StatusPublisher` is the driver's [`StatusSink`]: it holds the
//! informational values (`ups.mfr`, `ups.model`, ...), the committed
//! status string and the communication health flags. Status tags are
//! staged and only replace `ups.status` on commit.

use ccups_common::ups::driver::StatusSink;
use ccups_common::ups::status::StatusTags;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Info key holding the committed status tags.
pub const STATUS_KEY: &str = "ups.status";

/// Point-in-time copy of the published state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsSnapshot {
    /// Informational values, including `ups.status` once committed
    pub info: BTreeMap<String, String>,
    /// Last communication attempt succeeded
    pub comm_ok: bool,
    /// Published data is out of date
    pub stale: bool,
    /// Consecutive failed polls
    pub comm_failures: u64,
    /// Timestamp of the last status commit (microseconds since UNIX epoch)
    pub last_commit_us: u64,
}

/// In-process status publisher.
#[derive(Debug)]
pub struct StatusPublisher {
    /// Informational values
    info: BTreeMap<String, String>,
    /// Tags staged since `status_init`
    staged: StatusTags,
    /// Communication health
    comm_ok: bool,
    /// Data staleness
    stale: bool,
    /// Consecutive failed polls
    comm_failures: u64,
    /// Last status commit timestamp
    last_commit_us: u64,
}

impl StatusPublisher {
    /// Create a publisher with no data (stale until the first commit).
    pub fn new() -> Self {
        Self {
            info: BTreeMap::new(),
            staged: StatusTags::new(),
            comm_ok: false,
            stale: true,
            comm_failures: 0,
            last_commit_us: 0,
        }
    }

    /// Published value for `key`.
    pub fn info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// Committed status string, if any status was ever committed.
    pub fn status(&self) -> Option<&str> {
        self.info(STATUS_KEY)
    }

    /// Whether communication is currently healthy.
    pub fn is_comm_ok(&self) -> bool {
        self.comm_ok
    }

    /// Whether the published data is stale.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Copy of the published state.
    pub fn snapshot(&self) -> UpsSnapshot {
        UpsSnapshot {
            info: self.info.clone(),
            comm_ok: self.comm_ok,
            stale: self.stale,
            comm_failures: self.comm_failures,
            last_commit_us: self.last_commit_us,
        }
    }
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for StatusPublisher {
    fn set_info(&mut self, key: &str, value: &str) {
        debug!("{} = {}", key, value);
        self.info.insert(key.to_string(), value.to_string());
    }

    fn status_init(&mut self) {
        self.staged.clear();
    }

    fn status_set(&mut self, tag: &'static str) {
        if self.staged.contains(&tag) {
            return;
        }
        if self.staged.push(tag).is_err() {
            warn!("status buffer full, dropping tag {}", tag);
        }
    }

    fn status_commit(&mut self) {
        let status = self.staged.join(" ");
        if self.status() != Some(status.as_str()) {
            info!("{} changed to [{}]", STATUS_KEY, status);
        }
        self.info.insert(STATUS_KEY.to_string(), status);
        self.staged.clear();
        self.last_commit_us = current_timestamp_us();
    }

    fn comm_good(&mut self) {
        if !self.comm_ok && self.comm_failures > 0 {
            info!(
                "Communications with UPS re-established after {} failed polls",
                self.comm_failures
            );
        }
        self.comm_ok = true;
        self.comm_failures = 0;
    }

    fn comm_fail(&mut self, reason: &str) {
        if self.comm_ok || self.comm_failures == 0 {
            warn!("Communications with UPS lost: {}", reason);
        }
        self.comm_ok = false;
        self.comm_failures += 1;
    }

    fn data_ok(&mut self) {
        self.stale = false;
    }

    fn data_stale(&mut self) {
        if !self.stale {
            warn!("Data for UPS is stale");
        }
        self.stale = true;
    }
}

/// Get current timestamp in microseconds since UNIX epoch.
fn current_timestamp_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}
