//! RS-232 modem control lines.
//!
//! Bit values follow the kernel's `TIOCM_*` constants so that a
//! `SerialLines` value can be handed to `TIOCMSET` and built from the
//! result of `TIOCMGET` without translation.

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use std::fmt;

bitflags! {
    /// Set of serial control lines.
    ///
    /// Raw line state read from the port may carry bits without a name
    /// here (LE, SR); build it with [`SerialLines::from_raw`] so they are
    /// kept and masked out by the predicates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SerialLines: libc::c_int {
        /// Data Terminal Ready (output).
        const DTR = libc::TIOCM_DTR;
        /// Request To Send (output).
        const RTS = libc::TIOCM_RTS;
        /// Secondary transmit; doubles as the break-pulse marker (output).
        const ST  = libc::TIOCM_ST;
        /// Clear To Send (input).
        const CTS = libc::TIOCM_CTS;
        /// Data Carrier Detect (input).
        const DCD = libc::TIOCM_CD;
        /// Ring Indicator (input).
        const RNG = libc::TIOCM_RI;
        /// Data Set Ready (input).
        const DSR = libc::TIOCM_DSR;
    }
}

impl SerialLines {
    /// Lines the port can drive.
    pub const OUTPUTS: Self = Self::from_bits_truncate(
        Self::DTR.bits() | Self::RTS.bits() | Self::ST.bits(),
    );

    /// Lines the port can sense.
    pub const INPUTS: Self = Self::from_bits_truncate(
        Self::CTS.bits() | Self::DCD.bits() | Self::RNG.bits() | Self::DSR.bits(),
    );

    /// Build from a raw `TIOCMGET` word, keeping unnamed bits.
    #[inline]
    pub const fn from_raw(raw: libc::c_int) -> Self {
        Self::from_bits_retain(raw)
    }
}

impl Default for SerialLines {
    fn default() -> Self {
        Self::empty()
    }
}

const_assert_eq!(SerialLines::OUTPUTS.bits() & SerialLines::INPUTS.bits(), 0);

/// Direction a control line can be used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Driven by the host, read by the UPS.
    Output,
    /// Driven by the UPS, read by the host.
    Input,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Output => f.write_str("output"),
            Direction::Input => f.write_str("input"),
        }
    }
}

/// A named control line as it appears in override directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Data Terminal Ready
    Dtr,
    /// Request To Send
    Rts,
    /// Break / secondary transmit
    St,
    /// Clear To Send
    Cts,
    /// Data Carrier Detect
    Dcd,
    /// Ring Indicator
    Rng,
    /// Data Set Ready
    Dsr,
}

impl Signal {
    /// Output-capable signals, in directive evaluation order.
    pub const OUTPUTS: [Signal; 3] = [Signal::Dtr, Signal::Rts, Signal::St];

    /// Input-capable signals, in directive evaluation order.
    pub const INPUTS: [Signal; 4] = [Signal::Cts, Signal::Dcd, Signal::Rng, Signal::Dsr];

    /// Token used for this signal in override strings.
    pub const fn name(self) -> &'static str {
        match self {
            Signal::Dtr => "DTR",
            Signal::Rts => "RTS",
            Signal::St => "ST",
            Signal::Cts => "CTS",
            Signal::Dcd => "DCD",
            Signal::Rng => "RNG",
            Signal::Dsr => "DSR",
        }
    }

    /// Negated token (`-DTR` etc.).
    pub const fn negated_name(self) -> &'static str {
        match self {
            Signal::Dtr => "-DTR",
            Signal::Rts => "-RTS",
            Signal::St => "-ST",
            Signal::Cts => "-CTS",
            Signal::Dcd => "-DCD",
            Signal::Rng => "-RNG",
            Signal::Dsr => "-DSR",
        }
    }

    /// Line bit for this signal.
    pub const fn line(self) -> SerialLines {
        match self {
            Signal::Dtr => SerialLines::DTR,
            Signal::Rts => SerialLines::RTS,
            Signal::St => SerialLines::ST,
            Signal::Cts => SerialLines::CTS,
            Signal::Dcd => SerialLines::DCD,
            Signal::Rng => SerialLines::RNG,
            Signal::Dsr => SerialLines::DSR,
        }
    }

    /// Direction the line can be used in.
    pub const fn direction(self) -> Direction {
        match self {
            Signal::Dtr | Signal::Rts | Signal::St => Direction::Output,
            Signal::Cts | Signal::Dcd | Signal::Rng | Signal::Dsr => Direction::Input,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
