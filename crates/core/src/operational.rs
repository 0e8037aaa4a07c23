//! Operational data captured after a gate movement: driver name, odometer
//! (KM) reading and loader names.
//!
//! Provides per-field validation used before an entry or edit is submitted,
//! and the completion summary shown to supervisors.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::movement::{is_filled, MovementRecord};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_DRIVER_NAME_LENGTH: usize = 2;
pub const MAX_DRIVER_NAME_LENGTH: usize = 50;

/// KM readings are between 3 and 6 digits.
pub const MIN_KM_DIGITS: usize = 3;
pub const MAX_KM_DIGITS: usize = 6;

pub const MAX_LOADER_NAMES: usize = 10;
pub const MIN_LOADER_NAME_LENGTH: usize = 2;

/// Completion rate (percent) below which capture at entry is recommended.
pub const LOW_COMPLETION_PERCENT: f64 = 50.0;

/// Missing-field ratios above which a focused recommendation is produced.
pub const MISSING_DRIVER_RATIO: f64 = 0.3;
pub const MISSING_KM_RATIO: f64 = 0.4;
pub const MISSING_LOADERS_RATIO: f64 = 0.5;

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate a driver name, returning it trimmed.
pub fn validate_driver_name(value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Driver name is required".to_string()));
    }
    let len = trimmed.chars().count();
    if len < MIN_DRIVER_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Driver name must be at least {MIN_DRIVER_NAME_LENGTH} characters"
        )));
    }
    if len > MAX_DRIVER_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Driver name must be less than {MAX_DRIVER_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a KM reading, returning only its digits.
///
/// Non-digit characters (separators, units) are stripped first.
pub fn validate_km_reading(value: &str) -> Result<String, CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation("KM reading is required".to_string()));
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(CoreError::Validation("KM reading must be numeric".to_string()));
    }
    if !(MIN_KM_DIGITS..=MAX_KM_DIGITS).contains(&digits.len()) {
        return Err(CoreError::Validation(format!(
            "KM reading must be {MIN_KM_DIGITS}-{MAX_KM_DIGITS} digits"
        )));
    }
    Ok(digits)
}

/// Validate a comma-separated list of loader names, returning the names.
pub fn validate_loader_names(value: &str) -> Result<Vec<String>, CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation("Loader names are required".to_string()));
    }
    let names: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();
    if names.is_empty() {
        return Err(CoreError::Validation(
            "At least one loader name is required".to_string(),
        ));
    }
    if names.len() > MAX_LOADER_NAMES {
        return Err(CoreError::Validation(format!(
            "Maximum {MAX_LOADER_NAMES} loader names allowed"
        )));
    }
    if names.iter().any(|n| n.chars().count() < MIN_LOADER_NAME_LENGTH) {
        return Err(CoreError::Validation(format!(
            "Each loader name must be at least {MIN_LOADER_NAME_LENGTH} characters"
        )));
    }
    Ok(names)
}

/// Operational fields as entered on the gate-entry or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalData {
    pub driver_name: String,
    pub km_reading: String,
    pub loader_names: String,
}

impl OperationalData {
    /// Validate all three fields and return the normalised form.
    pub fn validate(&self) -> Result<Self, CoreError> {
        let driver_name = validate_driver_name(&self.driver_name)?;
        let km_reading = validate_km_reading(&self.km_reading)?;
        let loader_names = validate_loader_names(&self.loader_names)?.join(", ");
        Ok(Self {
            driver_name,
            km_reading,
            loader_names,
        })
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Operational-data completion statistics over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalSummary {
    pub total_records: usize,
    pub complete: usize,
    pub missing_driver: usize,
    pub missing_km: usize,
    pub missing_loaders: usize,
    /// Records edited more than once.
    pub multiple_edits: usize,
    pub completion_percentage: f64,
    pub recommendations: Vec<String>,
}

impl OperationalSummary {
    pub fn from_records(records: &[MovementRecord]) -> Self {
        let total_records = records.len();
        let complete = records.iter().filter(|r| r.is_operational_data_complete()).count();
        let missing_driver = records.iter().filter(|r| !is_filled(&r.driver_name)).count();
        let missing_km = records.iter().filter(|r| !is_filled(&r.km_reading)).count();
        let missing_loaders = records.iter().filter(|r| !is_filled(&r.loader_names)).count();
        let multiple_edits = records.iter().filter(|r| r.edit_count > 1).count();

        let completion_percentage = if total_records > 0 {
            complete as f64 / total_records as f64 * 100.0
        } else {
            0.0
        };

        let mut recommendations = Vec::new();
        if total_records > 0 {
            let total = total_records as f64;
            if completion_percentage < LOW_COMPLETION_PERCENT {
                recommendations.push(
                    "Consider capturing operational data during initial gate entry".to_string(),
                );
            }
            if missing_driver as f64 > total * MISSING_DRIVER_RATIO {
                recommendations
                    .push("Focus on capturing driver names during vehicle entry".to_string());
            }
            if missing_km as f64 > total * MISSING_KM_RATIO {
                recommendations
                    .push("Emphasize KM reading collection for journey tracking".to_string());
            }
            if missing_loaders as f64 > total * MISSING_LOADERS_RATIO {
                recommendations.push(
                    "Improve loader name documentation for operational efficiency".to_string(),
                );
            }
        }

        Self {
            total_records,
            complete,
            missing_driver,
            missing_km,
            missing_loaders,
            multiple_edits,
            completion_percentage,
            recommendations,
        }
    }
}
