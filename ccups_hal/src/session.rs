//! Driver session: model selection, overrides, freeze.
//!
//! A [`SessionBuilder`] owns the only mutable copy of the selected
//! descriptor. Overrides are applied to that copy, each field at most
//! once, and [`SessionBuilder::freeze`] turns it into a read-only
//! [`Session`] used by polling and shutdown.

use crate::overrides::{output_mask, parse_input_signals, parse_output_signals};
use crate::registry::ModelRegistry;
use ccups_common::ups::config::UpsConfig;
use ccups_common::ups::descriptor::{ModelDescriptor, StatusKind};
use ccups_common::ups::driver::UpsError;
use tracing::{debug, info};

/// Display information published for the UPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsIdentity {
    /// Manufacturer (override or model default)
    pub manufacturer: String,
    /// Model (override or model default)
    pub model: String,
    /// Serial number, only when configured
    pub serial: Option<String>,
}

/// Session under construction.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    /// Registry index of the selected model
    index: usize,
    /// Working copy of the selected descriptor
    descriptor: ModelDescriptor,
    /// Output overrides already applied
    outputs_applied: bool,
    /// Input overrides already applied
    inputs_applied: bool,
}

impl SessionBuilder {
    /// Select the model named by `upstype`.
    ///
    /// # Errors
    /// - `UpsError::MissingModel` if `upstype` is absent
    /// - `UpsError::UnknownModel` if it has no registry entry
    /// - `UpsError::InvalidValue` if it is not an integer
    pub fn select(registry: &ModelRegistry, config: &UpsConfig) -> Result<Self, UpsError> {
        let index = config.model_index()?;
        let descriptor = registry.lookup(index)?;
        info!("UPS type: {}", descriptor.description);
        Ok(Self {
            index,
            descriptor,
            outputs_applied: false,
            inputs_applied: false,
        })
    }

    /// Start from an explicit descriptor.
    pub fn from_descriptor(index: usize, descriptor: ModelDescriptor) -> Self {
        Self {
            index,
            descriptor,
            outputs_applied: false,
            inputs_applied: false,
        }
    }

    /// Current working descriptor.
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Apply the `CP` and `SD` overrides. Later calls are ignored.
    ///
    /// # Errors
    /// Returns `UpsError::InvalidDirection` if an override names an input line.
    pub fn apply_output_overrides(&mut self, config: &UpsConfig) -> Result<(), UpsError> {
        if self.outputs_applied {
            return Ok(());
        }
        self.outputs_applied = true;

        if let Some(value) = config.cable_power.as_deref() {
            let parsed = parse_output_signals(value, self.descriptor.normal)?;
            self.descriptor.normal = parsed.value;
            debug!("CP overridden with {:?}", value);
        }

        if let Some(value) = config.shutdown.as_deref() {
            // A model without a shutdown command changes on any override.
            let lines = match self.descriptor.shutdown {
                Some(prior) => parse_output_signals(value, prior)?.value,
                None => output_mask(value)?,
            };
            self.descriptor.shutdown = Some(lines);
            debug!("SD overridden with {:?}", value);
        }

        Ok(())
    }

    /// Apply the `OL`, `LB`, `RB` and `BYPASS` overrides. Later calls are ignored.
    ///
    /// # Errors
    /// Returns `UpsError::InvalidDirection` if an override names an output line.
    pub fn apply_input_overrides(&mut self, config: &UpsConfig) -> Result<(), UpsError> {
        if self.inputs_applied {
            return Ok(());
        }
        self.inputs_applied = true;

        for kind in StatusKind::ALL {
            let Some(value) = config.input_override(kind) else {
                continue;
            };
            let signal = self.descriptor.signal_mut(kind);
            *signal = parse_input_signals(value, *signal)?.value;
            debug!("{} overridden with {:?}", kind.directive(), value);
        }

        Ok(())
    }

    /// Apply all overrides.
    ///
    /// # Errors
    /// Returns `UpsError::InvalidDirection` on a misdirected signal.
    pub fn apply_overrides(mut self, config: &UpsConfig) -> Result<Self, UpsError> {
        self.apply_output_overrides(config)?;
        self.apply_input_overrides(config)?;
        Ok(self)
    }

    /// Finish initialization. The descriptor is read-only from here on.
    pub fn freeze(self, config: &UpsConfig) -> Session {
        let identity = UpsIdentity {
            manufacturer: config
                .mfr
                .clone()
                .unwrap_or_else(|| self.descriptor.manufacturer.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| self.descriptor.model.to_string()),
            serial: config.serial.clone(),
        };
        Session {
            index: self.index,
            descriptor: self.descriptor,
            identity,
        }
    }
}

/// Frozen session state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Registry index of the selected model
    index: usize,
    /// Descriptor with overrides applied
    descriptor: ModelDescriptor,
    /// Published identity
    identity: UpsIdentity,
}

impl Session {
    /// Select, override and freeze in one step.
    ///
    /// # Errors
    /// Any configuration error from selection or override parsing.
    pub fn from_config(registry: &ModelRegistry, config: &UpsConfig) -> Result<Self, UpsError> {
        Ok(SessionBuilder::select(registry, config)?
            .apply_overrides(config)?
            .freeze(config))
    }

    /// Registry index of the selected model.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Effective descriptor.
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Published identity.
    pub fn identity(&self) -> &UpsIdentity {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccups_common::ups::descriptor::InputSignal;
    use ccups_common::ups::lines::{Direction, SerialLines};

    fn config(pairs: &[(&str, &str)]) -> UpsConfig {
        let mut cfg = UpsConfig::default();
        for (name, value) in pairs {
            cfg.set_var(name, value).unwrap();
        }
        cfg
    }

    #[test]
    fn select_requires_upstype() {
        let reg = ModelRegistry::builtin();
        let err = SessionBuilder::select(&reg, &UpsConfig::default()).unwrap_err();
        assert!(matches!(err, UpsError::MissingModel));
    }

    #[test]
    fn select_rejects_unknown_index() {
        let reg = ModelRegistry::builtin();
        let cfg = config(&[("upstype", "999")]);
        let err = SessionBuilder::select(&reg, &cfg).unwrap_err();
        assert!(matches!(err, UpsError::UnknownModel(_)));
    }

    #[test]
    fn defaults_without_overrides() {
        let reg = ModelRegistry::builtin();
        let cfg = config(&[("upstype", "2")]);
        let session = Session::from_config(&reg, &cfg).unwrap();
        assert_eq!(session.index(), 2);
        assert_eq!(*session.descriptor(), reg.lookup(2).unwrap());
        assert_eq!(session.identity().manufacturer, "APC");
        assert_eq!(session.identity().serial, None);
    }

    #[test]
    fn overrides_apply_to_session_copy_only() {
        let reg = ModelRegistry::builtin();
        let cfg = config(&[
            ("upstype", "0"),
            ("CP", "RTS"),
            ("SD", "ST"),
            ("OL", "-DSR"),
            ("BYPASS", "RNG"),
            ("mfr", "Acme"),
            ("serial", "SN123"),
        ]);
        let session = Session::from_config(&reg, &cfg).unwrap();
        let desc = session.descriptor();
        assert_eq!(desc.normal, SerialLines::RTS);
        assert_eq!(desc.shutdown, Some(SerialLines::ST));
        assert_eq!(desc.online, InputSignal::new(SerialLines::DSR, SerialLines::empty()));
        assert_eq!(desc.bypass, InputSignal::new(SerialLines::RNG, SerialLines::RNG));
        assert_eq!(desc.low_battery, reg.lookup(0).unwrap().low_battery);
        assert_eq!(session.identity().manufacturer, "Acme");
        assert_eq!(session.identity().model, "LAN Saver 600");
        assert_eq!(session.identity().serial.as_deref(), Some("SN123"));

        // Registry is untouched.
        assert_eq!(reg.lookup(0).unwrap().normal, SerialLines::DTR | SerialLines::RTS);
    }

    #[test]
    fn shutdown_override_on_model_without_shutdown() {
        let reg = ModelRegistry::builtin();
        let index = reg
            .enumerate()
            .find(|(i, _)| reg.lookup(*i).unwrap().shutdown.is_none())
            .map(|(i, _)| i)
            .unwrap();
        let cfg = config(&[("upstype", &index.to_string()), ("SD", "none")]);
        let session = Session::from_config(&reg, &cfg).unwrap();
        assert_eq!(session.descriptor().shutdown, Some(SerialLines::empty()));
    }

    #[test]
    fn misdirected_override_is_fatal() {
        let reg = ModelRegistry::builtin();
        let cfg = config(&[("upstype", "1"), ("CP", "DCD")]);
        let err = Session::from_config(&reg, &cfg).unwrap_err();
        assert!(matches!(
            err,
            UpsError::InvalidDirection {
                direction: Direction::Output,
                ..
            }
        ));

        let cfg = config(&[("upstype", "1"), ("LB", "DTR")]);
        let err = Session::from_config(&reg, &cfg).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn overrides_apply_once() {
        let reg = ModelRegistry::builtin();
        let cfg = config(&[("upstype", "1"), ("CP", "RTS")]);
        let mut builder = SessionBuilder::select(&reg, &cfg).unwrap();
        builder.apply_output_overrides(&cfg).unwrap();

        let other = config(&[("upstype", "1"), ("CP", "DTR")]);
        builder.apply_output_overrides(&other).unwrap();
        assert_eq!(builder.descriptor().normal, SerialLines::RTS);
    }
}
