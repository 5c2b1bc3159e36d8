//! Driver configuration.
//!
//! Directives keep the names operators know from `ups.conf` (`upstype`,
//! `CP`, `SD`, `OL`, ...). Each one may come from the `[ups]` table of
//! the TOML file or from a `-x NAME=VALUE` command-line argument; absence
//! means "use the model default".
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "ups-rack-a"
//!
//! [ups]
//! device = "/dev/ttyS0"
//! upstype = 1
//! OL = "-CTS"
//! sdtime = 30
//! ```

use crate::config::{ConfigError, SharedConfig};
use crate::ups::consts::{DEFAULT_DEVICE, DEFAULT_POLL_INTERVAL, MAX_HOLD_SECS};
use crate::ups::descriptor::StatusKind;
use crate::ups::driver::UpsError;
use serde::{Deserialize, Deserializer};
use std::num::IntErrorKind;
use std::time::Duration;

/// One entry of the driver variable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    /// Directive name
    pub name: &'static str,
    /// Help text
    pub help: &'static str,
}

/// Directives understood by the driver, in help-listing order.
pub const VAR_TABLE: &[VarSpec] = &[
    VarSpec { name: "upstype", help: "Set UPS type (required)" },
    VarSpec { name: "mfr", help: "Override manufacturer name" },
    VarSpec { name: "model", help: "Override model name" },
    VarSpec { name: "serial", help: "Specify the serial number" },
    VarSpec { name: "CP", help: "Override cable power setting" },
    VarSpec { name: "OL", help: "Override on line signal" },
    VarSpec { name: "LB", help: "Override low battery signal" },
    VarSpec { name: "RB", help: "Override replace battery signal" },
    VarSpec { name: "BYPASS", help: "Override battery bypass signal" },
    VarSpec { name: "SD", help: "Override shutdown setting" },
    VarSpec { name: "sdtime", help: "Hold time for shutdown value (seconds)" },
    VarSpec { name: "device", help: "Serial device the UPS is attached to" },
    VarSpec { name: "pollinterval", help: "Seconds between status polls" },
];

/// Full driver configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Logging and naming
    #[serde(default)]
    pub shared: SharedConfig,
    /// UPS directives
    #[serde(default)]
    pub ups: UpsConfig,
}

/// Operator-supplied UPS directives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpsConfig {
    /// Registry index of the attached model
    #[serde(default, deserialize_with = "directive")]
    pub upstype: Option<String>,
    /// Serial device path
    #[serde(default, deserialize_with = "directive")]
    pub device: Option<String>,
    /// Manufacturer display override
    #[serde(default, deserialize_with = "directive")]
    pub mfr: Option<String>,
    /// Model display override
    #[serde(default, deserialize_with = "directive")]
    pub model: Option<String>,
    /// Serial number to publish
    #[serde(default, deserialize_with = "directive")]
    pub serial: Option<String>,
    /// Normal-operation (cable power) output override
    #[serde(default, rename = "CP", deserialize_with = "directive")]
    pub cable_power: Option<String>,
    /// Shutdown output override
    #[serde(default, rename = "SD", deserialize_with = "directive")]
    pub shutdown: Option<String>,
    /// On-line input override
    #[serde(default, rename = "OL", deserialize_with = "directive")]
    pub online: Option<String>,
    /// Low-battery input override
    #[serde(default, rename = "LB", deserialize_with = "directive")]
    pub low_battery: Option<String>,
    /// Replace-battery input override
    #[serde(default, rename = "RB", deserialize_with = "directive")]
    pub replace_battery: Option<String>,
    /// Bypass input override
    #[serde(default, rename = "BYPASS", deserialize_with = "directive")]
    pub bypass: Option<String>,
    /// Shutdown hold time in seconds
    #[serde(default, deserialize_with = "directive")]
    pub sdtime: Option<String>,
    /// Poll interval in seconds
    #[serde(default, deserialize_with = "directive")]
    pub pollinterval: Option<String>,
}

impl UpsConfig {
    /// Set a directive by its operator-facing name.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` for names not in [`VAR_TABLE`].
    pub fn set_var(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let slot = match name {
            "upstype" => &mut self.upstype,
            "device" => &mut self.device,
            "mfr" => &mut self.mfr,
            "model" => &mut self.model,
            "serial" => &mut self.serial,
            "CP" => &mut self.cable_power,
            "SD" => &mut self.shutdown,
            "OL" => &mut self.online,
            "LB" => &mut self.low_battery,
            "RB" => &mut self.replace_battery,
            "BYPASS" => &mut self.bypass,
            "sdtime" => &mut self.sdtime,
            "pollinterval" => &mut self.pollinterval,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown driver variable '{name}'"
                )));
            }
        };
        *slot = Some(value.to_string());
        Ok(())
    }

    /// Apply a `NAME=VALUE` assignment.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if there is no `=` or the
    /// name is unknown.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            ConfigError::ValidationError(format!("expected NAME=VALUE, got '{assignment}'"))
        })?;
        self.set_var(name.trim(), value)
    }

    /// Input override string for a status kind.
    pub fn input_override(&self, kind: StatusKind) -> Option<&str> {
        match kind {
            StatusKind::OnLine => self.online.as_deref(),
            StatusKind::LowBattery => self.low_battery.as_deref(),
            StatusKind::ReplaceBattery => self.replace_battery.as_deref(),
            StatusKind::Bypass => self.bypass.as_deref(),
        }
    }

    /// Selected registry index.
    ///
    /// # Errors
    /// - `UpsError::MissingModel` if `upstype` is absent
    /// - `UpsError::UnknownModel` if it is negative
    /// - `UpsError::InvalidValue` if it is not an integer
    pub fn model_index(&self) -> Result<usize, UpsError> {
        let raw = self.upstype.as_deref().ok_or(UpsError::MissingModel)?;
        let value: i64 = raw.trim().parse().map_err(|_| UpsError::InvalidValue {
            name: "upstype".to_string(),
            value: raw.to_string(),
        })?;
        usize::try_from(value).map_err(|_| UpsError::UnknownModel(raw.trim().to_string()))
    }

    /// Serial device path, defaulting to [`DEFAULT_DEVICE`].
    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    /// Shutdown hold time, if configured.
    ///
    /// # Errors
    /// Returns `UpsError::InvalidValue` unless `sdtime` is a non-negative integer.
    pub fn hold_time(&self) -> Result<Option<Duration>, UpsError> {
        self.sdtime
            .as_deref()
            .map(parse_hold_seconds)
            .transpose()
    }

    /// Interval between status polls.
    ///
    /// # Errors
    /// Returns `UpsError::InvalidValue` unless `pollinterval` is a positive integer.
    pub fn poll_interval(&self) -> Result<Duration, UpsError> {
        let Some(raw) = self.pollinterval.as_deref() else {
            return Ok(DEFAULT_POLL_INTERVAL);
        };
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(UpsError::InvalidValue {
                name: "pollinterval".to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

/// Parse a shutdown hold time in whole seconds.
///
/// Values beyond [`MAX_HOLD_SECS`], including ones that overflow `u64`,
/// clamp to it.
///
/// # Errors
/// Returns `UpsError::InvalidValue` for negative or non-numeric input.
pub fn parse_hold_seconds(raw: &str) -> Result<Duration, UpsError> {
    let secs = match raw.trim().parse::<u64>() {
        Ok(secs) => secs.min(MAX_HOLD_SECS),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_HOLD_SECS,
        Err(_) => {
            return Err(UpsError::InvalidValue {
                name: "sdtime".to_string(),
                value: raw.to_string(),
            });
        }
    };
    Ok(Duration::from_secs(secs))
}

/// Directive value as written in TOML.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDirective {
    Text(String),
    Integer(i64),
}

/// Accept directives written as TOML strings or integers.
fn directive<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawDirective>::deserialize(deserializer)?.map(|raw| match raw {
        RawDirective::Text(text) => text,
        RawDirective::Integer(value) => value.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    #[test]
    fn test_directives_accept_strings_and_integers() {
        let config = DriverConfig::from_toml(
            r#"
[ups]
upstype = 3
sdtime = "15"
OL = "-CTS"
BYPASS = "DSR"
"#,
        )
        .unwrap();
        assert_eq!(config.ups.model_index().unwrap(), 3);
        assert_eq!(config.ups.hold_time().unwrap(), Some(Duration::from_secs(15)));
        assert_eq!(config.ups.input_override(StatusKind::OnLine), Some("-CTS"));
        assert_eq!(config.ups.input_override(StatusKind::Bypass), Some("DSR"));
        assert_eq!(config.ups.input_override(StatusKind::LowBattery), None);
        assert_eq!(config.shared.service_name, "ccups");
    }

    #[test]
    fn test_unknown_directive_rejected() {
        let result = DriverConfig::from_toml("[ups]\nDTR = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_set_var_and_assignment() {
        let mut ups = UpsConfig::default();
        ups.apply_assignment("CP=DTR RTS").unwrap();
        ups.set_var("upstype", "7").unwrap();
        assert_eq!(ups.cable_power.as_deref(), Some("DTR RTS"));
        assert_eq!(ups.model_index().unwrap(), 7);
        assert!(matches!(
            ups.set_var("bogus", "1"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            ups.apply_assignment("no-equals"),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_var_table_names_are_settable() {
        let mut ups = UpsConfig::default();
        for var in VAR_TABLE {
            ups.set_var(var.name, "1").unwrap();
        }
    }

    #[test]
    fn test_model_index_errors() {
        let mut ups = UpsConfig::default();
        assert!(matches!(ups.model_index(), Err(UpsError::MissingModel)));
        ups.upstype = Some("-1".to_string());
        assert!(matches!(ups.model_index(), Err(UpsError::UnknownModel(_))));
        ups.upstype = Some("apc".to_string());
        assert!(matches!(ups.model_index(), Err(UpsError::InvalidValue { .. })));
    }

    #[test]
    fn test_hold_seconds_clamps() {
        assert_eq!(parse_hold_seconds("0").unwrap(), Duration::ZERO);
        assert_eq!(
            parse_hold_seconds("99999999999").unwrap(),
            Duration::from_secs(MAX_HOLD_SECS)
        );
        assert_eq!(
            parse_hold_seconds("999999999999999999999999999").unwrap(),
            Duration::from_secs(MAX_HOLD_SECS)
        );
        assert!(parse_hold_seconds("-5").is_err());
        assert!(parse_hold_seconds("soon").is_err());
    }

    #[test]
    fn test_poll_interval() {
        let mut ups = UpsConfig::default();
        assert_eq!(ups.poll_interval().unwrap(), DEFAULT_POLL_INTERVAL);
        ups.pollinterval = Some("5".to_string());
        assert_eq!(ups.poll_interval().unwrap(), Duration::from_secs(5));
        ups.pollinterval = Some("0".to_string());
        assert!(ups.poll_interval().is_err());
        assert_eq!(ups.device(), DEFAULT_DEVICE);
    }
}
