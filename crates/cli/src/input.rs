//! Loading backend JSON payloads from disk.

use std::path::Path;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde_json::Value;

use gatepass_core::movement::{MovementRecord, VehicleStatus};

/// Path that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = if path == Path::new(STDIN_PATH) {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load movement records from a JSON array or a `{"results": [...]}` object.
///
/// A record that does not match the movement shape is skipped with a
/// warning naming its index and the serde error; the rest of the batch is
/// kept.
pub fn load_records(path: &Path) -> anyhow::Result<Vec<MovementRecord>> {
    let items = match read_json::<Value>(path)? {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(items)) => items,
            _ => bail!("{} has no \"results\" array of records", path.display()),
        },
        _ => bail!(
            "{} must hold an array of records or a {{\"results\": [...]}} object",
            path.display()
        ),
    };

    let total = items.len();
    let records: Vec<MovementRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    index,
                    error = %e,
                    "Skipping malformed movement record"
                );
                None
            }
        })
        .collect();

    tracing::debug!(
        path = %path.display(),
        count = records.len(),
        skipped = total - records.len(),
        "Loaded movement records"
    );
    Ok(records)
}

/// Load a vehicle status payload. JSON `null` means unknown.
pub fn load_status(path: &Path) -> anyhow::Result<Option<VehicleStatus>> {
    read_json(path)
}
