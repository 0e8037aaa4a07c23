//! Document assignment for manual gate entries.
//!
//! A manual entry is recorded before its document is known and must later be
//! linked to one. Linking is allowed only while the record's edit window is
//! open. The document search itself looks back over a separate, shorter
//! window ([`ASSIGNMENT_LOOKBACK_HOURS`]); the two thresholds are distinct
//! policies and must not be merged.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::edit_window::{edit_state_at, EditPolicy, EditState};
use crate::error::CoreError;
use crate::movement::{normalize_vehicle_no, MovementRecord};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Document type of a manual entry.
pub const DOC_TYPE_MANUAL_ENTRY: &str = "Manual Entry";

/// Document type of a manual entry still waiting for a real document.
pub const DOC_TYPE_PENDING_ASSIGNMENT: &str = "Manual Entry - Pending Assignment";

/// Default lookback when searching for unassigned documents.
pub const ASSIGNMENT_LOOKBACK_HOURS: u32 = 8;

/// Largest lookback the document search accepts.
pub const MAX_ASSIGNMENT_LOOKBACK_HOURS: u32 = 72;

// ---------------------------------------------------------------------------
// Assignment gate
// ---------------------------------------------------------------------------

/// True iff the record still needs to be linked to a real document.
pub fn needs_assignment(record: &MovementRecord) -> bool {
    match record.document_type.as_deref() {
        Some(DOC_TYPE_PENDING_ASSIGNMENT) => true,
        Some(DOC_TYPE_MANUAL_ENTRY) => record.document_date.is_none(),
        _ => false,
    }
}

/// True iff the record needs assignment and its edit window is still open.
pub fn can_assign_at(record: &MovementRecord, now: Timestamp, policy: &EditPolicy) -> bool {
    needs_assignment(record) && can_assign_in(edit_state_at(record, now, policy))
}

/// Assignment rule for a record already known to need one, given its edit
/// state.
pub fn can_assign_in(state: EditState) -> bool {
    state != EditState::Expired
}

/// [`can_assign_at`] against the wall clock with the default policy.
pub fn can_assign(record: &MovementRecord) -> bool {
    can_assign_at(record, Utc::now(), &EditPolicy::default())
}

// ---------------------------------------------------------------------------
// Document search
// ---------------------------------------------------------------------------

/// Parameters for the backend's unassigned-document search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnassignedDocumentQuery {
    pub vehicle_no: String,
    pub hours_back: u32,
}

impl UnassignedDocumentQuery {
    pub fn new(vehicle_no: &str, hours_back: u32) -> Result<Self, CoreError> {
        let vehicle_no = normalize_vehicle_no(vehicle_no);
        if vehicle_no.is_empty() {
            return Err(CoreError::Validation("Vehicle number is required".to_string()));
        }
        if !(1..=MAX_ASSIGNMENT_LOOKBACK_HOURS).contains(&hours_back) {
            return Err(CoreError::Validation(format!(
                "Lookback must be between 1 and {MAX_ASSIGNMENT_LOOKBACK_HOURS} hours, got {hours_back}"
            )));
        }
        Ok(Self {
            vehicle_no,
            hours_back,
        })
    }

    /// Query with the default lookback.
    pub fn for_vehicle(vehicle_no: &str) -> Result<Self, CoreError> {
        Self::new(vehicle_no, ASSIGNMENT_LOOKBACK_HOURS)
    }
}

/// A document returned by the unassigned-document search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedDocument {
    pub document_no: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub document_date: Option<String>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub age_hours: Option<f64>,
}

impl UnassignedDocument {
    /// `"3.4 hours ago"`, rounded to one decimal place.
    pub fn age_label(&self) -> Option<String> {
        self.age_hours
            .map(|h| format!("{:.1} hours ago", (h * 10.0).round() / 10.0))
    }
}
