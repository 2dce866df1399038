//! Loading signal batches from JSON fixtures.
//!
//! A batch is either a bare array of records or an object with a `signals`
//! array. Records that fail to decode are skipped with a warning so one bad
//! card cannot sink the whole synthesis.

use crate::{SignalError, SignalRecord};
use serde_json::Value;
use std::path::Path;

/// Parse a batch of signal records from a JSON string
pub fn parse_batch(json: &str) -> Result<Vec<SignalRecord>, SignalError> {
    let root: Value = serde_json::from_str(json)?;

    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("signals") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(SignalError::InvalidBatch(
                    "expected a `signals` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(SignalError::InvalidBatch(
                "expected an array of signal records".to_string(),
            ))
        }
    };

    let total = items.len();
    let records: Vec<SignalRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping signal record #{}: {}", idx, e);
                None
            }
        })
        .collect();

    tracing::debug!("Parsed {} of {} signal records", records.len(), total);
    Ok(records)
}

/// Read and parse a batch file
pub fn load_batch(path: impl AsRef<Path>) -> Result<Vec<SignalRecord>, SignalError> {
    let path = path.as_ref();
    tracing::info!("Loading signal batch from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    parse_batch(&raw)
}
