//! # ccups driver binary
//!
//! Monitors a contact-closure UPS on a serial port and powers it down on
//! request.
//!
//! # Usage
//!
//! ```bash
//! # List supported UPS types
//! ccups --list-types
//!
//! # Monitor an APC Back-UPS on ttyS1
//! ccups -a /dev/ttyS1 -x upstype=2
//!
//! # One poll against a simulated UPS on battery, JSON snapshot on stdout
//! ccups -x upstype=2 --simulate CTS --dump
//!
//! # Kill power (called late in the host's shutdown)
//! ccups -k
//! ```

#![deny(warnings)]

use ccups_common::config::{ConfigError, ConfigLoader, LogLevel};
use ccups_common::ups::config::{DriverConfig, VAR_TABLE};
use ccups_common::ups::consts::{DEFAULT_CONFIG_PATH, DRIVER_NAME};
use ccups_common::ups::driver::{SerialPort, UpsError};
use ccups_common::ups::lines::SerialLines;
use ccups_hal::core::UpsDriver;
use ccups_hal::port::{SimulatedPort, TtyPort};
use ccups_hal::registry::ModelRegistry;
use ccups_hal::shutdown::ShutdownMode;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Generic contact-closure UPS driver
#[derive(Parser, Debug)]
#[command(name = "ccups")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Driver for contact-closure UPS units on RS-232 control lines")]
#[command(long_about = None)]
struct Args {
    /// Path to the driver configuration file. A missing file is not an error.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Serial device the UPS is attached to (overrides `device`)
    #[arg(short = 'a', long, value_name = "DEVICE")]
    device: Option<String>,

    /// Set a driver variable (can be specified multiple times)
    #[arg(short = 'x', value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    vars: Vec<String>,

    /// Print the supported UPS types and exit
    #[arg(short = 'l', long)]
    list_types: bool,

    /// Print the driver variables and exit
    #[arg(long)]
    list_vars: bool,

    /// Kill power on the UPS and exit
    #[arg(short = 'k')]
    kill_power: bool,

    /// Poll once and print the published state as JSON
    #[arg(long)]
    dump: bool,

    /// Use a simulated port with the given input lines asserted (e.g. "CTS,DCD")
    #[arg(
        short = 's',
        long,
        value_name = "LINES",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    simulate: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("ccups failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let registry = ModelRegistry::builtin();

    if args.list_types {
        print!("{}", registry.listing());
        return Ok(());
    }
    if args.list_vars {
        for var in VAR_TABLE {
            println!("{:<14} {}", var.name, var.help);
        }
        return Ok(());
    }

    let loaded = load_config(&args);
    let level = match &loaded {
        Ok((config, _)) => config.shared.log_level.as_filter(),
        Err(_) => "info",
    };
    setup_tracing(&args, level);

    info!("{} v{} starting...", DRIVER_NAME, env!("CARGO_PKG_VERSION"));

    let (config, from_file) = loaded?;
    if !from_file {
        warn!("No config file at {:?}, using defaults", args.config);
    }
    config.shared.validate()?;

    if let Some(lines) = args.simulate.as_deref() {
        let inputs = parse_line_names(lines)?;
        info!("Simulation mode enabled (inputs: {:?})", inputs);
        drive(&args, &config, &registry, SimulatedPort::with_inputs(inputs))
    } else {
        let port = TtyPort::open(config.ups.device())?;
        drive(&args, &config, &registry, port)
    }
}

/// Initialize the driver on `port` and perform the requested action.
fn drive<P: SerialPort>(
    args: &Args,
    config: &DriverConfig,
    registry: &ModelRegistry,
    port: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = match UpsDriver::init(&config.ups, registry, port) {
        Ok(driver) => driver,
        Err(e @ UpsError::UnknownModel(_)) => {
            print!("{}", registry.listing());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    if args.kill_power {
        driver.shutdown(ShutdownMode::Forced)?;
        info!("Shutdown command sent");
        return Ok(());
    }

    if args.dump {
        driver.update_info();
        println!("{}", serde_json::to_string_pretty(&driver.publisher().snapshot())?);
        return Ok(());
    }

    let running = driver.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    driver.run();

    info!("ccups stopped");
    Ok(())
}

/// Load the config file and apply command-line overrides.
///
/// The flag is false when the file did not exist.
fn load_config(args: &Args) -> Result<(DriverConfig, bool), ConfigError> {
    let (mut config, from_file) = match DriverConfig::load(&args.config) {
        Ok(config) => (config, true),
        Err(ConfigError::FileNotFound(_)) => (DriverConfig::default(), false),
        Err(e) => return Err(e),
    };

    if let Some(device) = &args.device {
        config.ups.device = Some(device.clone());
    }
    for assignment in &args.vars {
        config.ups.apply_assignment(assignment)?;
    }
    if args.verbose {
        config.shared.log_level = LogLevel::Debug;
    }
    Ok((config, from_file))
}

/// Parse a list of input line names separated by commas or whitespace.
fn parse_line_names(list: &str) -> Result<SerialLines, UpsError> {
    let mut lines = SerialLines::empty();
    for name in list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let line = SerialLines::from_name(&name.to_ascii_uppercase())
            .filter(|line| SerialLines::INPUTS.contains(*line))
            .ok_or_else(|| UpsError::InvalidValue {
                name: "simulate".to_string(),
                value: name.to_string(),
            })?;
        lines |= line;
    }
    Ok(lines)
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_names() {
        assert_eq!(parse_line_names("").unwrap(), SerialLines::empty());
        assert_eq!(
            parse_line_names("cts, DCD").unwrap(),
            SerialLines::CTS | SerialLines::DCD
        );
        assert!(parse_line_names("DTR").is_err());
        assert!(parse_line_names("FOO").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "ccups",
            "--config",
            "/nonexistent/ccups.toml",
            "-a",
            "/dev/ttyUSB0",
            "-x",
            "upstype=5",
            "-x",
            "OL=-CTS",
        ]);
        let (config, from_file) = load_config(&args).unwrap();
        assert!(!from_file);
        assert_eq!(config.ups.device(), "/dev/ttyUSB0");
        assert_eq!(config.ups.model_index().unwrap(), 5);
        assert_eq!(config.ups.online.as_deref(), Some("-CTS"));
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let args = Args::parse_from(["ccups", "--config", "/nonexistent/ccups.toml", "-x", "foo=1"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_simulate_flag_optional_value() {
        let args = Args::parse_from(["ccups", "--simulate"]);
        assert_eq!(args.simulate.as_deref(), Some(""));
        let args = Args::parse_from(["ccups", "--simulate", "CTS"]);
        assert_eq!(args.simulate.as_deref(), Some("CTS"));
    }
}
