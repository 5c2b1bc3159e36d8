//! Registry of supported contact-closure UPS models.
//!
//! Models are selected by their position in [`UPS_TYPES`]. The table is
//! compiled in and never changes at runtime; a session works on its own
//! copy of the selected entry.

use ccups_common::ups::descriptor::{InputSignal, ModelDescriptor};
use ccups_common::ups::driver::UpsError;
use ccups_common::ups::lines::SerialLines;

const DTR: SerialLines = SerialLines::DTR;
const RTS: SerialLines = SerialLines::RTS;
const ST: SerialLines = SerialLines::ST;
const CTS: SerialLines = SerialLines::CTS;
const DCD: SerialLines = SerialLines::DCD;
const RNG: SerialLines = SerialLines::RNG;
const DSR: SerialLines = SerialLines::DSR;
const NONE: SerialLines = SerialLines::empty();

const fn or(a: SerialLines, b: SerialLines) -> SerialLines {
    a.union(b)
}

const fn sig(line: SerialLines, active: SerialLines) -> InputSignal {
    InputSignal::new(line, active)
}

/// Build a descriptor without replace-battery or bypass lines.
const fn basic(
    manufacturer: &'static str,
    model: &'static str,
    description: &'static str,
    normal: SerialLines,
    shutdown: Option<SerialLines>,
    online: InputSignal,
    low_battery: InputSignal,
) -> ModelDescriptor {
    ModelDescriptor {
        manufacturer,
        model,
        description,
        normal,
        shutdown,
        online,
        low_battery,
        replace_battery: InputSignal::DISABLED,
        bypass: InputSignal::DISABLED,
    }
}

/// Known models, indexed by `upstype`.
pub static UPS_TYPES: &[ModelDescriptor] = &[
    /* 0 */
    basic(
        "UPSonic", "LAN Saver 600",
        "UPSonic LAN Saver 600",
        or(DTR, RTS), Some(DTR),
        sig(CTS, NONE), sig(DCD, DCD),
    ),
    /* 1 */
    basic(
        "APC", "Back-UPS",
        "APC Back-UPS (940-0095A/C cable)",
        DTR, Some(or(RTS, DTR)),
        sig(RNG, NONE), sig(DCD, DCD),
    ),
    /* 2 */
    basic(
        "APC", "Back-UPS",
        "APC Back-UPS (940-0020B/C cable)",
        RTS, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, DCD),
    ),
    /* 3 */
    basic(
        "PowerTech", "Comp1000",
        "PowerTech Comp1000 with DTR cable power",
        DTR, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, DCD),
    ),
    /* 4 */
    basic(
        "Generic", "RUPS Model",
        "Generic RUPS Model",
        RTS, Some(NONE),
        sig(CTS, CTS), sig(DCD, NONE),
    ),
    /* 5 */
    basic(
        "Tripp Lite", "UPS",
        "Tripp Lite UPS with Lan2.2 interface (black 73-0844 cable)",
        DTR, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 6 */
    basic(
        "Best", "Patriot",
        "Best Patriot (INT51 cable)",
        DTR, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, DCD),
    ),
    /* 7 */
    basic(
        "CyberPower", "Power99",
        "CyberPower Power99",
        RTS, Some(or(RTS, DTR)),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 8 */
    basic(
        "Nitram", "Elite UPS2000",
        "Nitram Elite 2002",
        or(DTR, RTS), Some(DTR),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 9 */
    basic(
        "PowerKinetics", "9001",
        "PowerKinetics 9001",
        DTR, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 10 */
    basic(
        "TrippLite", "Omni 450LAN",
        "TrippLite Omni 450LAN with Martin's cabling",
        DTR, Some(or(DTR, RTS)),
        sig(DCD, NONE), sig(CTS, NONE),
    ),
    /* 11 */
    basic(
        "Fideltronic", "Ares Series",
        "Fideltronic Ares Series",
        DTR, Some(or(DTR, RTS)),
        sig(CTS, CTS), sig(DCD, DCD),
    ),
    /* 12 */
    basic(
        "Generic", "RUPS 2000",
        "Generic RUPS 2000 (Megatec M2501 cable)",
        RTS, Some(or(RTS, DTR)),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 13 */
    basic(
        "Gamatronic", "Generic / Alpha 500 VA",
        "Gamatronic UPSs with alarm interface",
        DTR, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 14 */
    basic(
        "Generic", "Generic",
        "Generic contact-closure UPS without shutdown line",
        DTR, None,
        sig(CTS, NONE), sig(DCD, DCD),
    ),
    /* 15 */
    basic(
        "Powerware", "3115",
        "Powerware 3115",
        DTR, Some(ST),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 16 */
    basic(
        "APC", "Back-UPS Office",
        "APC Back-UPS Office (940-0119A cable)",
        RTS, Some(DTR),
        sig(CTS, NONE), sig(DCD, DCD),
    ),
    /* 17 */
    basic(
        "RPT", "Repoteck",
        "Repoteck RPT-800A, RPT-162A",
        or(DTR, RTS), Some(ST),
        sig(DCD, DCD), sig(CTS, CTS),
    ),
    /* 18 */
    basic(
        "Online", "P250, P500, P750, P1250",
        "Online P-series",
        DTR, Some(or(DTR, RTS)),
        sig(DCD, DCD), sig(CTS, CTS),
    ),
    /* 19 */
    basic(
        "Powerware", "5119, 5125",
        "Powerware 5119, 5125",
        DTR, Some(ST),
        sig(CTS, CTS), sig(DCD, NONE),
    ),
    /* 20 */
    basic(
        "Nitram", "Elite 500",
        "Nitram Elite 500",
        DTR, None,
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 21 */
    basic(
        "Victron", "Lite",
        "Victron Lite (crack cable)",
        RTS, Some(or(DTR, RTS)),
        sig(CTS, NONE), sig(DCD, NONE),
    ),
    /* 22 */
    ModelDescriptor {
        manufacturer: "Generic",
        model: "FTTx",
        description: "Generic FTTx (Fiber to the x) battery backup",
        normal: or(RTS, DTR),
        shutdown: None,
        online: sig(CTS, CTS),
        low_battery: sig(DCD, DCD),
        replace_battery: sig(RNG, RNG),
        bypass: sig(DSR, DSR),
    },
];

/// Registry of model descriptors.
///
/// Wraps a static table; cheap to copy and pass around.
#[derive(Debug, Clone, Copy)]
pub struct ModelRegistry {
    entries: &'static [ModelDescriptor],
}

impl ModelRegistry {
    /// Registry backed by the built-in model table.
    pub const fn builtin() -> Self {
        Self { entries: UPS_TYPES }
    }

    /// Registry backed by a custom table.
    pub const fn with_entries(entries: &'static [ModelDescriptor]) -> Self {
        Self { entries }
    }

    /// Copy of the descriptor at `index`.
    ///
    /// # Errors
    /// Returns `UpsError::UnknownModel` if there is no entry at `index`.
    pub fn lookup(&self, index: usize) -> Result<ModelDescriptor, UpsError> {
        self.entries
            .get(index)
            .copied()
            .ok_or_else(|| UpsError::UnknownModel(index.to_string()))
    }

    /// `(index, description)` pairs in declaration order.
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, &'static str)> + Clone {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, desc)| (idx, desc.description))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Help listing of all models.
    pub fn listing(&self) -> String {
        let mut out = String::from("Valid UPS types:\n\n");
        for (idx, description) in self.enumerate() {
            out.push_str(&format!("{idx}: {description}\n"));
        }
        out
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
