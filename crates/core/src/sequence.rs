//! Gate sequence pre-check.
//!
//! A vehicle must alternate Gate-In and Gate-Out, starting with Gate-In. This
//! is a client-side check run before submission; the backend stays
//! authoritative and may still reject the entry.

use crate::movement::{GateType, HistoryStatus, VehicleStatus};

/// Shown when the backend reports a conflict but omits the last movement.
const UNKNOWN_DATE: &str = "unknown date";

/// Return a human-readable reason why `requested` is not allowed for a
/// vehicle in `status`, or `None` if the movement may proceed.
///
/// An unknown status (`None`) is treated as `no_history`.
pub fn gate_sequence_error(status: Option<&VehicleStatus>, requested: GateType) -> Option<String> {
    let status = match status {
        Some(s) if s.status == HistoryStatus::Active => s,
        _ => {
            return match requested {
                GateType::GateIn => None,
                GateType::GateOut => {
                    Some("First entry for this vehicle must be Gate-In".to_string())
                }
            };
        }
    };

    let allowed = match requested {
        GateType::GateIn => status.can_gate_in,
        GateType::GateOut => status.can_gate_out,
    };
    if allowed {
        return None;
    }

    let last_date = status
        .last_movement
        .as_ref()
        .map(|m| m.date.as_str())
        .unwrap_or(UNKNOWN_DATE);

    tracing::debug!(
        requested = %requested,
        last_date,
        "Gate sequence conflict"
    );

    Some(format!(
        "Vehicle already has {requested} ({last_date}). Must do {} first.",
        requested.opposite()
    ))
}
