//! Composite UPS status.

use crate::ups::consts::MAX_STATUS_TAGS;
use crate::ups::descriptor::StatusKind;
use std::fmt;

/// Status tag: on line.
pub const TAG_OL: &str = "OL";
/// Status tag: on battery.
pub const TAG_OB: &str = "OB";
/// Status tag: low battery.
pub const TAG_LB: &str = "LB";
/// Status tag: replace battery.
pub const TAG_RB: &str = "RB";
/// Status tag: bypass.
pub const TAG_BYPASS: &str = "BYPASS";

/// Fixed-capacity list of status tags.
pub type StatusTags = heapless::Vec<&'static str, MAX_STATUS_TAGS>;

/// Status derived from one line-state sample.
///
/// Exactly one of `OL`/`OB` is always reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSet {
    /// Mains power present (`OL`), otherwise on battery (`OB`)
    pub on_line: bool,
    /// Battery low (`LB`)
    pub low_battery: bool,
    /// Battery needs replacing (`RB`)
    pub replace_battery: bool,
    /// Bypass active (`BYPASS`)
    pub bypass: bool,
}

impl StatusSet {
    /// Value of one status condition.
    pub const fn get(&self, kind: StatusKind) -> bool {
        match kind {
            StatusKind::OnLine => self.on_line,
            StatusKind::LowBattery => self.low_battery,
            StatusKind::ReplaceBattery => self.replace_battery,
            StatusKind::Bypass => self.bypass,
        }
    }

    /// Set one status condition.
    pub fn set(&mut self, kind: StatusKind, value: bool) {
        match kind {
            StatusKind::OnLine => self.on_line = value,
            StatusKind::LowBattery => self.low_battery = value,
            StatusKind::ReplaceBattery => self.replace_battery = value,
            StatusKind::Bypass => self.bypass = value,
        }
    }

    /// Status tags in publishing order.
    pub fn tags(&self) -> StatusTags {
        let mut tags = StatusTags::new();
        // Capacity equals the number of distinct tags, pushes cannot fail.
        if self.low_battery {
            let _ = tags.push(TAG_LB);
        }
        let _ = tags.push(if self.on_line { TAG_OL } else { TAG_OB });
        if self.replace_battery {
            let _ = tags.push(TAG_RB);
        }
        if self.bypass {
            let _ = tags.push(TAG_BYPASS);
        }
        tags
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.tags().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_on_battery() {
        assert_eq!(StatusSet::default().to_string(), "OB");
    }

    #[test]
    fn test_exactly_one_of_ol_ob() {
        for bits in 0u8..16 {
            let status = StatusSet {
                on_line: bits & 1 != 0,
                low_battery: bits & 2 != 0,
                replace_battery: bits & 4 != 0,
                bypass: bits & 8 != 0,
            };
            let tags = status.tags();
            let ol = tags.iter().filter(|t| **t == TAG_OL).count();
            let ob = tags.iter().filter(|t| **t == TAG_OB).count();
            assert_eq!(ol + ob, 1, "status {status:?}");
        }
    }

    #[test]
    fn test_all_flags_display() {
        let status = StatusSet {
            on_line: false,
            low_battery: true,
            replace_battery: true,
            bypass: true,
        };
        assert_eq!(status.to_string(), "LB OB RB BYPASS");
    }

    #[test]
    fn test_get_set_roundtrip_per_kind() {
        let mut status = StatusSet::default();
        status.set(StatusKind::Bypass, true);
        assert!(status.get(StatusKind::Bypass));
        assert!(!status.get(StatusKind::OnLine));
    }
}
