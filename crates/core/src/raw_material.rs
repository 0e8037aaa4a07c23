//! Raw-material (RM) gate entries: create/edit payload validation and the
//! edit window for listed entries.

use chrono::{Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::edit_window::{is_within_window, EditPolicy};
use crate::error::CoreError;
use crate::movement::{normalize_vehicle_no, GateType};
use crate::types::Timestamp;

/// Minimum length of a vehicle number on an RM edit.
pub const MIN_RM_VEHICLE_NO_LENGTH: usize = 8;

fn required(value: &str, label: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Payload submitted for a new RM entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialEntry {
    #[serde(default = "default_gate_type")]
    pub gate_type: GateType,
    pub vehicle_no: String,
    pub document_no: String,
    pub name_of_party: String,
    pub description_of_material: String,
    pub quantity: String,
}

fn default_gate_type() -> GateType {
    GateType::GateIn
}

impl RawMaterialEntry {
    /// Check required fields and return the normalised payload.
    pub fn validated(&self) -> Result<Self, CoreError> {
        let vehicle_no = normalize_vehicle_no(&required(&self.vehicle_no, "Vehicle number")?);
        Ok(Self {
            gate_type: self.gate_type,
            vehicle_no,
            document_no: required(&self.document_no, "Document number")?,
            name_of_party: required(&self.name_of_party, "Name of Party")?,
            description_of_material: required(
                &self.description_of_material,
                "Description of Material",
            )?,
            quantity: required(&self.quantity, "Quantity")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// Partial update of an RM entry; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialEdit {
    pub gate_entry_no: String,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub document_no: Option<String>,
    #[serde(default)]
    pub name_of_party: Option<String>,
    #[serde(default)]
    pub description_of_material: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
}

impl RawMaterialEdit {
    /// Trim present fields, drop blank ones, and enforce the vehicle number
    /// length.
    pub fn validated(&self) -> Result<Self, CoreError> {
        let gate_entry_no = required(&self.gate_entry_no, "Gate entry number")?;
        let trim = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let vehicle_no = match trim(&self.vehicle_no) {
            Some(v) if v.chars().count() < MIN_RM_VEHICLE_NO_LENGTH => {
                return Err(CoreError::Validation(format!(
                    "Vehicle number must be at least {MIN_RM_VEHICLE_NO_LENGTH} characters"
                )));
            }
            other => other.map(|v| normalize_vehicle_no(&v)),
        };

        Ok(Self {
            gate_entry_no,
            vehicle_no,
            document_no: trim(&self.document_no),
            name_of_party: trim(&self.name_of_party),
            description_of_material: trim(&self.description_of_material),
            quantity: trim(&self.quantity),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_no.is_none()
            && self.document_no.is_none()
            && self.name_of_party.is_none()
            && self.description_of_material.is_none()
            && self.quantity.is_none()
    }
}

// ---------------------------------------------------------------------------
// Listed entries
// ---------------------------------------------------------------------------

/// An RM entry as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialRecord {
    pub gate_entry_no: String,
    pub gate_type: GateType,
    pub vehicle_no: String,
    #[serde(default)]
    pub document_no: Option<String>,
    #[serde(default)]
    pub name_of_party: Option<String>,
    #[serde(default)]
    pub description_of_material: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    /// ISO-8601 wall-clock creation time.
    pub date_time: String,
    #[serde(default)]
    pub security_username: Option<String>,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub edit_count: u32,
}

impl RawMaterialRecord {
    /// Age at `now`; `None` if `date_time` does not parse.
    pub fn age_at(&self, now: Timestamp, policy: &EditPolicy) -> Option<Duration> {
        let local = NaiveDateTime::parse_from_str(self.date_time.trim(), "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        let created = policy
            .site_offset
            .from_local_datetime(&local)
            .single()?
            .with_timezone(&Utc);
        Some(now - created)
    }

    /// Editable only while inside the window and permitted by the server.
    pub fn is_editable_at(&self, now: Timestamp, policy: &EditPolicy) -> bool {
        is_within_window(self.age_at(now, policy), policy) && self.can_edit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entry() -> RawMaterialEntry {
        RawMaterialEntry {
            gate_type: GateType::GateIn,
            vehicle_no: " mh12ab1234 ".to_string(),
            document_no: " RM-001 ".to_string(),
            name_of_party: "Acme Polymers".to_string(),
            description_of_material: "PET preforms".to_string(),
            quantity: "1200".to_string(),
        }
    }

    #[test]
    fn entry_is_normalised() {
        let clean = entry().validated().unwrap();
        assert_eq!(clean.vehicle_no, "MH12AB1234");
        assert_eq!(clean.document_no, "RM-001");
    }

    #[test]
    fn entry_requires_every_field() {
        let mut e = entry();
        e.quantity = "   ".to_string();
        assert_matches!(e.validated(), Err(CoreError::Validation(m)) if m == "Quantity is required");

        let mut e = entry();
        e.vehicle_no = String::new();
        assert_matches!(e.validated(), Err(CoreError::Validation(m)) if m.contains("Vehicle number"));
    }

    #[test]
    fn entry_gate_type_defaults_to_gate_in() {
        let e: RawMaterialEntry = serde_json::from_str(
            r#"{"vehicle_no": "MH12AB1234", "document_no": "RM-1", "name_of_party": "Acme",
                "description_of_material": "Caps", "quantity": "10"}"#,
        )
        .unwrap();
        assert_eq!(e.gate_type, GateType::GateIn);
    }

    #[test]
    fn edit_vehicle_number_length() {
        let edit = RawMaterialEdit {
            gate_entry_no: "RM-GE-1".to_string(),
            vehicle_no: Some("MH12".to_string()),
            ..Default::default()
        };
        assert_matches!(edit.validated(), Err(CoreError::Validation(m)) if m.contains("at least 8"));
    }

    #[test]
    fn edit_drops_blank_fields() {
        let edit = RawMaterialEdit {
            gate_entry_no: "RM-GE-1".to_string(),
            vehicle_no: Some("  ".to_string()),
            quantity: Some(" 15 ".to_string()),
            ..Default::default()
        };
        let clean = edit.validated().unwrap();
        assert_eq!(clean.vehicle_no, None);
        assert_eq!(clean.quantity.as_deref(), Some("15"));
        assert!(!clean.is_empty());
        assert!(RawMaterialEdit::default().is_empty());
    }

    #[test]
    fn listed_entry_edit_window() {
        let now = Utc.with_ymd_and_hms(2025, 1, 11, 12, 0, 0).unwrap();
        let mut record = RawMaterialRecord {
            gate_entry_no: "RM-GE-1".to_string(),
            gate_type: GateType::GateIn,
            vehicle_no: "MH12AB1234".to_string(),
            document_no: None,
            name_of_party: None,
            description_of_material: None,
            quantity: None,
            date_time: "2025-01-10T12:00:00".to_string(),
            security_username: Some("guard01".to_string()),
            can_edit: true,
            edit_count: 0,
        };
        let policy = EditPolicy::default();
        assert!(record.is_editable_at(now, &policy));

        record.date_time = "2025-01-10T11:59:59.500".to_string();
        assert!(!record.is_editable_at(now, &policy));

        record.date_time = "yesterday".to_string();
        assert!(!record.is_editable_at(now, &policy));
    }
}
