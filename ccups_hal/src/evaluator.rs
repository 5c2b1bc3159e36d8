//! Status evaluation from raw control-line state.
//!
//! A status holds when its predicate matches the sampled lines. On-line
//! is special: with no OL line wired the predicate trivially matches and
//! the UPS is reported on line forever. LB, RB and BYPASS are never
//! reported unless a line is wired for them.

use ccups_common::ups::descriptor::{ModelDescriptor, StatusKind};
use ccups_common::ups::driver::{SerialPort, StatusSink};
use ccups_common::ups::lines::SerialLines;
use ccups_common::ups::status::StatusSet;
use tracing::{trace, warn};

/// Whether one status condition holds for the sampled lines.
pub fn is_asserted(descriptor: &ModelDescriptor, kind: StatusKind, raw: SerialLines) -> bool {
    let signal = descriptor.signal(kind);
    (signal.is_enabled() || kind == StatusKind::OnLine) && signal.is_asserted(raw)
}

/// Derive the composite status from one line-state sample.
pub fn evaluate(descriptor: &ModelDescriptor, raw: SerialLines) -> StatusSet {
    let mut status = StatusSet::default();
    for kind in StatusKind::ALL {
        status.set(kind, is_asserted(descriptor, kind, raw));
    }
    status
}

/// Run one poll cycle: read the lines and publish the derived status.
///
/// A failed read publishes nothing; the sink is told communication failed
/// and its data is stale. Returns the committed status on success.
pub fn poll<P, S>(descriptor: &ModelDescriptor, port: &mut P, sink: &mut S) -> Option<StatusSet>
where
    P: SerialPort + ?Sized,
    S: StatusSink + ?Sized,
{
    let raw = match port.read_lines() {
        Ok(raw) => raw,
        Err(e) => {
            warn!("line state read failed: {e}");
            sink.comm_fail("Status read failed");
            sink.data_stale();
            return None;
        }
    };

    let status = evaluate(descriptor, raw);

    sink.status_init();
    for tag in status.tags() {
        sink.status_set(tag);
    }
    sink.status_commit();

    trace!("raw lines {:#06x} -> ups.status: {}", raw.bits(), status);

    sink.comm_good();
    sink.data_ok();
    Some(status)
}
