//! Data contracts for gate movements and vehicle status.
//!
//! Shapes match the backend JSON payloads. Wall-clock `date`/`time` fields are
//! kept as raw strings so that one malformed row never fails deserialization of
//! a whole batch; [`MovementRecord::created_at`] does the parsing.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{Timestamp, DATE_FORMAT};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const GATE_IN: &str = "Gate-In";
pub const GATE_OUT: &str = "Gate-Out";

/// All valid gate direction strings.
pub const VALID_GATE_TYPES: &[&str] = &[GATE_IN, GATE_OUT];

/// Time-of-day formats accepted on records, tried in order.
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Direction of a vehicle movement through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateType {
    #[serde(rename = "Gate-In")]
    GateIn,
    #[serde(rename = "Gate-Out")]
    GateOut,
}

impl GateType {
    /// Parse a backend direction string. Unknown values are a caller bug and
    /// are rejected rather than defaulted.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            GATE_IN => Ok(Self::GateIn),
            GATE_OUT => Ok(Self::GateOut),
            _ => Err(CoreError::Validation(format!(
                "Invalid gate type '{s}'. Must be one of: {}",
                VALID_GATE_TYPES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GateIn => GATE_IN,
            Self::GateOut => GATE_OUT,
        }
    }

    /// The direction that must follow this one.
    pub fn opposite(&self) -> Self {
        match self {
            Self::GateIn => Self::GateOut,
            Self::GateOut => Self::GateIn,
        }
    }
}

impl std::fmt::Display for GateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GateType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_value(s)
    }
}

/// Whether the backend has any movement on file for a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    NoHistory,
    Active,
}

// ---------------------------------------------------------------------------
// Vehicle status
// ---------------------------------------------------------------------------

/// The most recent movement recorded for a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMovement {
    #[serde(rename = "type")]
    pub movement_type: GateType,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub gate_entry_no: Option<String>,
}

/// Current gate status of a vehicle as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleStatus {
    #[serde(default)]
    pub vehicle_no: Option<String>,
    pub status: HistoryStatus,
    #[serde(default = "permissive")]
    pub can_gate_in: bool,
    #[serde(default = "permissive")]
    pub can_gate_out: bool,
    #[serde(default)]
    pub last_movement: Option<LastMovement>,
    #[serde(default)]
    pub message: Option<String>,
}

fn permissive() -> bool {
    true
}

impl VehicleStatus {
    /// Status for a vehicle the backend has never seen.
    pub fn no_history() -> Self {
        Self {
            vehicle_no: None,
            status: HistoryStatus::NoHistory,
            can_gate_in: true,
            can_gate_out: true,
            last_movement: None,
            message: None,
        }
    }

    /// Status derived from the vehicle's last movement: the next movement
    /// must be in the opposite direction.
    pub fn after(last: LastMovement) -> Self {
        let next = last.movement_type.opposite();
        Self {
            vehicle_no: None,
            status: HistoryStatus::Active,
            can_gate_in: next == GateType::GateIn,
            can_gate_out: next == GateType::GateOut,
            last_movement: Some(last),
            message: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Movement record
// ---------------------------------------------------------------------------

/// A single gate-entry, manual-entry or RM-entry row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Not unique: multi-document manual entries share one number.
    pub gate_entry_no: String,
    pub vehicle_no: String,
    pub movement_type: GateType,
    /// Site wall-clock date; empty when the backend omitted it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,
    #[serde(default)]
    pub document_no: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub document_date: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub km_reading: Option<String>,
    #[serde(default)]
    pub loader_names: Option<String>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    #[serde(default)]
    pub security_name: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Server-asserted permission, independent of the edit window.
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub edit_count: u32,
}

impl MovementRecord {
    /// Creation instant from `date` + `time`, read as wall-clock time at
    /// `site_offset`. `None` when either part does not parse.
    pub fn created_at(&self, site_offset: FixedOffset) -> Option<Timestamp> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()?;
        let time = parse_time(self.time.trim())?;
        let local = NaiveDateTime::new(date, time);
        site_offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// True iff driver name, KM reading and loader names are all present and
    /// non-blank after trimming.
    pub fn is_operational_data_complete(&self) -> bool {
        is_filled(&self.driver_name) && is_filled(&self.km_reading) && is_filled(&self.loader_names)
    }

    /// Parsed record date, ignoring the time of day.
    pub fn record_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }
}

/// Missing and `null` both read as an empty string, which never parses.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// Present and non-blank after trimming.
pub fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Canonical vehicle number: trimmed and upper-cased.
pub fn normalize_vehicle_no(vehicle_no: &str) -> String {
    vehicle_no.trim().to_uppercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Datelike, Timelike};

    /// Minimal record fixture used across the crate's tests.
    pub(crate) fn record(gate_entry_no: &str, date: &str, time: &str) -> MovementRecord {
        MovementRecord {
            gate_entry_no: gate_entry_no.to_string(),
            vehicle_no: "MH12AB1234".to_string(),
            movement_type: GateType::GateIn,
            date: date.to_string(),
            time: time.to_string(),
            document_no: None,
            document_type: None,
            document_date: None,
            driver_name: None,
            km_reading: None,
            loader_names: None,
            warehouse_name: None,
            security_name: None,
            remarks: None,
            can_edit: true,
            edit_count: 0,
        }
    }

    pub(crate) fn with_operational_data(mut r: MovementRecord) -> MovementRecord {
        r.driver_name = Some("Ravi Kumar".to_string());
        r.km_reading = Some("45210".to_string());
        r.loader_names = Some("Suresh, Mahesh".to_string());
        r
    }

    // -- Gate type --

    #[test]
    fn gate_type_round_trips_through_str() {
        for s in VALID_GATE_TYPES {
            assert_eq!(GateType::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn unknown_gate_type_fails_loudly() {
        assert_matches!(GateType::from_str_value("gate-in"), Err(CoreError::Validation(_)));
        assert_matches!("Gate In".parse::<GateType>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn gate_type_serializes_with_backend_spelling() {
        assert_eq!(serde_json::to_string(&GateType::GateOut).unwrap(), "\"Gate-Out\"");
    }

    // -- Vehicle status --

    #[test]
    fn status_payload_deserializes() {
        let json = r#"{
            "vehicle_no": "MH12AB1234",
            "status": "active",
            "last_movement": {"type": "Gate-In", "date": "2025-01-10", "time": "08:15:00", "gate_entry_no": "GE-1"},
            "can_gate_in": false,
            "can_gate_out": true,
            "message": "Last movement: Gate-In on 2025-01-10"
        }"#;
        let status: VehicleStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.status, HistoryStatus::Active);
        assert!(!status.can_gate_in);
        assert_eq!(status.last_movement.unwrap().movement_type, GateType::GateIn);
    }

    #[test]
    fn no_history_payload_defaults_to_permissive() {
        let status: VehicleStatus = serde_json::from_str(r#"{"status": "no_history"}"#).unwrap();
        assert_eq!(status, VehicleStatus::no_history());
    }

    #[test]
    fn status_after_gate_in_requires_gate_out() {
        let status = VehicleStatus::after(LastMovement {
            movement_type: GateType::GateIn,
            date: "2025-01-10".to_string(),
            time: None,
            gate_entry_no: None,
        });
        assert!(!status.can_gate_in);
        assert!(status.can_gate_out);
    }

    // -- Timestamps --

    #[test]
    fn created_at_parses_seconds_and_fractions() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let ts = record("GE-1", "2025-01-10", "08:15:30.250").created_at(utc).unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (8, 15, 30));

        let ts = record("GE-1", "2025-01-10", "08:15").created_at(utc).unwrap();
        assert_eq!(ts.minute(), 15);
    }

    #[test]
    fn created_at_applies_site_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let ts = record("GE-1", "2025-01-10", "04:00:00").created_at(ist).unwrap();
        assert_eq!(ts.day(), 9);
        assert_eq!((ts.hour(), ts.minute()), (22, 30));
    }

    #[test]
    fn malformed_timestamp_is_none() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert!(record("GE-1", "10/01/2025", "08:15:00").created_at(utc).is_none());
        assert!(record("GE-1", "2025-01-10", "").created_at(utc).is_none());
        assert!(record("GE-1", "", "08:15:00").created_at(utc).is_none());
    }

    #[test]
    fn missing_or_null_timestamp_still_deserializes() {
        let records: Vec<MovementRecord> = serde_json::from_str(
            r#"[
                {"gate_entry_no": "GE-1", "vehicle_no": "MH12AB1234", "movement_type": "Gate-In",
                 "date": "2025-01-10", "time": "08:15:00"},
                {"gate_entry_no": "GE-2", "vehicle_no": "MH12AB1234", "movement_type": "Gate-In",
                 "date": "2025-01-10"},
                {"gate_entry_no": "GE-3", "vehicle_no": "MH12AB1234", "movement_type": "Gate-In",
                 "date": null, "time": null}
            ]"#,
        )
        .unwrap();

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].created_at(utc).is_some());
        assert_eq!(records[1].time, "");
        assert!(records[1].created_at(utc).is_none());
        assert_eq!(records[2].date, "");
        assert!(records[2].created_at(utc).is_none());
    }

    // -- Operational completeness --

    #[test]
    fn blank_fields_are_incomplete() {
        let mut r = with_operational_data(record("GE-1", "2025-01-10", "08:15:00"));
        assert!(r.is_operational_data_complete());

        r.driver_name = Some("   ".to_string());
        assert!(!r.is_operational_data_complete());

        r.driver_name = None;
        assert!(!r.is_operational_data_complete());
    }

    #[test]
    fn vehicle_numbers_are_normalized() {
        assert_eq!(normalize_vehicle_no("  mh12ab1234 "), "MH12AB1234");
    }
}
