//! Config file tests.
//!
//! Loads driver configuration from TOML files on disk and runs the
//! driver from the result.

use ccups_common::config::{ConfigError, ConfigLoader, LogLevel};
use ccups_common::ups::config::DriverConfig;
use ccups_common::ups::consts::{DEFAULT_DEVICE, MAX_HOLD_SECS};
use ccups_common::ups::lines::SerialLines;
use ccups_hal::core::UpsDriver;
use ccups_hal::port::SimulatedPort;
use ccups_hal::registry::ModelRegistry;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

/// Helper: write `content` as ups.toml in a fresh directory and load it.
fn load(content: &str) -> Result<DriverConfig, ConfigError> {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ups.toml");
    fs::write(&path, content).unwrap();
    DriverConfig::load(&path)
}

#[test]
fn test_full_config_file() {
    let config = load(
        r#"
[shared]
log_level = "debug"
service_name = "ups-rack-a"

[ups]
upstype = 2
device = "/dev/ttyUSB0"
mfr = "APC"
model = "Back-UPS 500"
serial = "QB0123"
CP = "DTR RTS"
OL = "-CTS"
LB = "DCD"
sdtime = 30
pollinterval = 5
"#,
    )
    .unwrap();

    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "ups-rack-a");
    assert_eq!(config.ups.model_index().unwrap(), 2);
    assert_eq!(config.ups.device(), "/dev/ttyUSB0");
    assert_eq!(config.ups.hold_time().unwrap(), Some(Duration::from_secs(30)));
    assert_eq!(config.ups.poll_interval().unwrap(), Duration::from_secs(5));

    let drv = UpsDriver::init(&config.ups, &ModelRegistry::builtin(), SimulatedPort::new()).unwrap();
    assert_eq!(drv.port().outputs(), SerialLines::DTR | SerialLines::RTS);
    assert_eq!(drv.publisher().info("ups.serial"), Some("QB0123"));
    assert_eq!(drv.publisher().info("ups.model"), Some("Back-UPS 500"));
}

#[test]
fn test_empty_file_uses_defaults() {
    let config = load("").unwrap();
    assert_eq!(config.shared.service_name, "ccups");
    assert_eq!(config.ups.device(), DEFAULT_DEVICE);
    assert_eq!(config.ups.hold_time().unwrap(), None);
    assert_eq!(config.ups.poll_interval().unwrap(), Duration::from_secs(2));
    assert!(UpsDriver::init(&config.ups, &ModelRegistry::builtin(), SimulatedPort::new()).is_err());
}

#[test]
fn test_unknown_directive_rejected() {
    let result = load(
        r#"
[ups]
upstype = 1
cable = "DTR"
"#,
    );
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_huge_sdtime_clamps() {
    let config = load(
        r#"
[ups]
upstype = 1
sdtime = "99999999999999999999999"
"#,
    )
    .unwrap();
    assert_eq!(
        config.ups.hold_time().unwrap(),
        Some(Duration::from_secs(MAX_HOLD_SECS))
    );
}

#[test]
fn test_negative_sdtime_rejected() {
    let config = load(
        r#"
[ups]
upstype = 1
sdtime = -5
"#,
    )
    .unwrap();
    assert!(config.ups.hold_time().is_err());
    assert!(UpsDriver::init(&config.ups, &ModelRegistry::builtin(), SimulatedPort::new()).is_err());
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = DriverConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn test_assignment_overrides_file_value() {
    let mut config = load(
        r#"
[ups]
upstype = 1
"#,
    )
    .unwrap();
    config.ups.apply_assignment("upstype=16").unwrap();
    assert_eq!(config.ups.model_index().unwrap(), 16);
}
