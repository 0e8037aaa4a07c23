//! New gate-entry submissions: multi-document manual entries and
//! document-backed batch entries.
//!
//! Both are checked here before anything is sent to the backend. The backend
//! repeats its own validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::movement::{normalize_vehicle_no, GateType};
use crate::operational::OperationalData;

/// Upper bound on documents a single manual entry may reserve.
pub const MAX_MANUAL_DOCUMENTS: i32 = 20;

fn required_vehicle_no(value: &str) -> Result<String, CoreError> {
    let vehicle_no = normalize_vehicle_no(value);
    if vehicle_no.is_empty() {
        return Err(CoreError::Validation("Vehicle number is required".to_string()));
    }
    Ok(vehicle_no)
}

fn trimmed_remarks(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn default_gate_type() -> GateType {
    GateType::GateIn
}

// ---------------------------------------------------------------------------
// Manual entry
// ---------------------------------------------------------------------------

/// Manual entry for a vehicle whose documents are not in the system yet.
///
/// Every created row shares one gate entry number and starts as pending
/// assignment. Zero documents records an empty vehicle instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntryRequest {
    #[serde(default = "default_gate_type")]
    pub gate_type: GateType,
    pub vehicle_no: String,
    #[serde(default)]
    pub no_of_documents: i32,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl ManualEntryRequest {
    pub fn validated(&self) -> Result<Self, CoreError> {
        let vehicle_no = required_vehicle_no(&self.vehicle_no)?;
        if !(0..=MAX_MANUAL_DOCUMENTS).contains(&self.no_of_documents) {
            return Err(CoreError::Validation(format!(
                "Number of documents must be between 0 and {MAX_MANUAL_DOCUMENTS}"
            )));
        }
        Ok(Self {
            gate_type: self.gate_type,
            vehicle_no,
            no_of_documents: self.no_of_documents,
            remarks: trimmed_remarks(&self.remarks),
        })
    }

    /// An empty vehicle carries nothing to assign later.
    pub fn is_empty_vehicle(&self) -> bool {
        self.no_of_documents == 0
    }

    /// Rows the backend will create: one per document, or a single
    /// empty-vehicle row.
    pub fn entries_to_create(&self) -> usize {
        usize::try_from(self.no_of_documents).unwrap_or(0).max(1)
    }
}

// ---------------------------------------------------------------------------
// Batch entry
// ---------------------------------------------------------------------------

/// A document offered by the recent-document search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchedDocument {
    pub document_no: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub document_date: Option<String>,
}

/// Result of searching recent documents for a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSearchResult {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub documents: Vec<SearchedDocument>,
}

impl DocumentSearchResult {
    /// No documents on file: the operator has to use a manual entry.
    pub fn is_empty_vehicle(&self) -> bool {
        self.count == 0 && self.documents.is_empty()
    }

    fn contains(&self, document_no: &str) -> bool {
        self.documents.iter().any(|d| d.document_no.trim() == document_no)
    }
}

/// Gate entry for one or more documents found by the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchGateEntry {
    #[serde(default = "default_gate_type")]
    pub gate_type: GateType,
    pub vehicle_no: String,
    #[serde(default)]
    pub document_nos: Vec<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(flatten)]
    pub operational: OperationalData,
}

/// What to do with a batch entry that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEntryDecision {
    /// Normalised payload ready to submit.
    Submit(BatchGateEntry),
    /// The search found no documents; switch to a manual entry.
    ManualEntryRequired,
}

impl BatchGateEntry {
    /// Validate against the latest document search for the vehicle.
    ///
    /// Checks run in form order: vehicle, search, operational data, empty
    /// vehicle, then the selected documents.
    pub fn validated(
        &self,
        search: Option<&DocumentSearchResult>,
    ) -> Result<BatchEntryDecision, CoreError> {
        let vehicle_no = required_vehicle_no(&self.vehicle_no)?;
        let search = search.ok_or_else(|| {
            CoreError::Validation("Please search for documents first".to_string())
        })?;
        let operational = self.operational.validate()?;

        if search.is_empty_vehicle() {
            tracing::debug!(vehicle_no = %vehicle_no, "No documents found, manual entry required");
            return Ok(BatchEntryDecision::ManualEntryRequired);
        }

        let mut document_nos: Vec<String> = Vec::with_capacity(self.document_nos.len());
        for document_no in self.document_nos.iter().map(|d| d.trim()) {
            if document_no.is_empty() || document_nos.iter().any(|d| d == document_no) {
                continue;
            }
            if !search.contains(document_no) {
                return Err(CoreError::Validation(format!(
                    "Document {document_no} was not found for vehicle {vehicle_no}"
                )));
            }
            document_nos.push(document_no.to_string());
        }
        if document_nos.is_empty() {
            return Err(CoreError::Validation(
                "Please select at least one document".to_string(),
            ));
        }

        Ok(BatchEntryDecision::Submit(Self {
            gate_type: self.gate_type,
            vehicle_no,
            document_nos,
            remarks: trimmed_remarks(&self.remarks),
            operational,
        }))
    }
}
