//! Feature collection and time point deserialization into [`Snapshot`]s.
//!
//! The main entry points are [`snapshot_from_feature_collection`] for a
//! single parsed collection and [`snapshots_from_time_points`] for the
//! upload envelope that bundles several collections with their metadata.

use crate::extract::extract_record;
use croptrail_core::{FieldPriorities, Snapshot};
use serde_json::Value;

/// Errors during snapshot deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The value is neither a feature collection nor a feature array.
    #[error("invalid feature collection: {0}")]
    InvalidCollection(String),
    /// A feature is not a JSON object.
    #[error("feature {index} is not an object")]
    InvalidFeature { index: usize },
    /// A time point entry is malformed.
    #[error("time point {index}: {message}")]
    InvalidTimePoint { index: usize, message: String },
}

/// Deserialize one collection into a [`Snapshot`].
///
/// Accepts a GeoJSON `FeatureCollection` object or a bare array of
/// features. Records without an id are kept with `id: None`.
pub fn snapshot_from_feature_collection(
    collection: &Value,
    label: Option<&str>,
    time: Option<&str>,
    fields: &FieldPriorities,
) -> Result<Snapshot, InterchangeError> {
    let features = feature_array(collection)?;

    let mut records = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        if !feature.is_object() {
            return Err(InterchangeError::InvalidFeature { index });
        }
        records.push(extract_record(feature, fields));
    }

    tracing::debug!(
        target: "croptrail::interchange",
        label = label.unwrap_or(""),
        records = records.len(),
        "snapshot.ingested"
    );

    Ok(Snapshot {
        label: label.map(str::to_string),
        time: time.map(str::to_string),
        created_at: None,
        records,
    })
}

/// Deserialize an array of time point envelopes.
///
/// Each entry is an object carrying a label (`label` or `taskName`), an
/// optional time (`time`), an optional fallback time (`created_at` or
/// `createTime`), and its features under `geojson`, `geojsonData` or
/// `features`. Input order is preserved; chronological ordering is the
/// normalizer's job.
pub fn snapshots_from_time_points(
    time_points: &Value,
    fields: &FieldPriorities,
) -> Result<Vec<Snapshot>, InterchangeError> {
    let entries = time_points.as_array().ok_or_else(|| {
        InterchangeError::InvalidCollection("time points must be an array".to_string())
    })?;

    let mut snapshots = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            return Err(InterchangeError::InvalidTimePoint {
                index,
                message: "not an object".to_string(),
            });
        }

        let collection = time_point_collection(entry)
            .map_err(|message| InterchangeError::InvalidTimePoint { index, message })?;

        let label = first_str(entry, &["label", "taskName"]);
        let time = first_str(entry, &["time"]);
        let mut snapshot = snapshot_from_feature_collection(collection, label, time, fields)
            .map_err(|e| InterchangeError::InvalidTimePoint {
                index,
                message: e.to_string(),
            })?;
        snapshot.created_at = first_str(entry, &["created_at", "createTime"]).map(str::to_string);
        snapshots.push(snapshot);
    }

    Ok(snapshots)
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn feature_array(collection: &Value) -> Result<&Vec<Value>, InterchangeError> {
    match collection {
        Value::Array(features) => Ok(features),
        Value::Object(obj) => obj
            .get("features")
            .and_then(|f| f.as_array())
            .ok_or_else(|| {
                InterchangeError::InvalidCollection("missing or invalid 'features' array".to_string())
            }),
        _ => Err(InterchangeError::InvalidCollection(
            "expected an object or an array".to_string(),
        )),
    }
}

/// First collection key holding a usable feature array. Null or malformed
/// candidates fall through to the next key.
fn time_point_collection(entry: &Value) -> Result<&Value, String> {
    let mut first_error = None;
    for key in ["geojson", "geojsonData", "features"] {
        let Some(candidate) = entry.get(key).filter(|v| !v.is_null()) else {
            continue;
        };
        match feature_array(candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }
    Err(first_error
        .unwrap_or_else(|| "missing 'geojson', 'geojsonData' or 'features'".to_string()))
}

fn first_str<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.trim().is_empty())
}
