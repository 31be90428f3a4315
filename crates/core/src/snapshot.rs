//! Input units of an analysis run.
//!
//! A [`Snapshot`] is one classified capture of a parcel set at a point in
//! time. Snapshots are produced by the ingestion layer and are never
//! mutated by the engine.

use serde::{Deserialize, Serialize};

/// One classified parcel inside a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Stable parcel identifier. Records without one are skipped.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub crop_code: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Opaque area value, passed through unchanged.
    #[serde(default)]
    pub area: Option<f64>,
    /// Opaque geometry, passed through unchanged.
    #[serde(default)]
    pub geometry: serde_json::Value,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, crop_code: Option<i64>) -> Self {
        EntityRecord {
            id: Some(id.into()),
            crop_code,
            ..EntityRecord::default()
        }
    }

    /// A record lacking an identifier.
    pub fn anonymous(crop_code: Option<i64>) -> Self {
        EntityRecord {
            crop_code,
            ..EntityRecord::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_geometry(mut self, geometry: serde_json::Value) -> Self {
        self.geometry = geometry;
        self
    }

    /// The identifier, if present and not blank.
    pub fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// One time-stamped collection of classified parcels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub label: Option<String>,
    /// Capture time, ISO-8601.
    #[serde(default)]
    pub time: Option<String>,
    /// Fallback time used when `time` is absent.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub records: Vec<EntityRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<EntityRecord>) -> Self {
        Snapshot {
            records,
            ..Snapshot::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// The time value used for ordering: `time`, then `created_at`.
    pub fn time_value(&self) -> Option<&str> {
        [self.time.as_deref(), self.created_at.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
    }

    /// Label shown in results; defaults to a 1-based position name.
    pub fn display_label(&self, index: usize) -> String {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => format!("Snapshot {}", index + 1),
        }
    }

    /// Time shown in results; falls back to the display label.
    pub fn display_time(&self, index: usize) -> String {
        self.time_value()
            .map(str::to_string)
            .unwrap_or_else(|| self.display_label(index))
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_id_rejects_blank() {
        assert_eq!(EntityRecord::new("  ", Some(1)).usable_id(), None);
        assert_eq!(EntityRecord::anonymous(Some(1)).usable_id(), None);
        assert_eq!(EntityRecord::new(" P1 ", Some(1)).usable_id(), Some("P1"));
    }

    #[test]
    fn test_time_value_prefers_time_over_created_at() {
        let snap = Snapshot::new(vec![])
            .with_time("2023-05-01")
            .with_created_at("2020-01-01");
        assert_eq!(snap.time_value(), Some("2023-05-01"));

        let fallback = Snapshot::new(vec![]).with_created_at("2020-01-01");
        assert_eq!(fallback.time_value(), Some("2020-01-01"));

        let blank = Snapshot::new(vec![]).with_time("").with_created_at(" ");
        assert_eq!(blank.time_value(), None);
    }

    #[test]
    fn test_display_label_and_time_fallbacks() {
        let snap = Snapshot::new(vec![]);
        assert_eq!(snap.display_label(2), "Snapshot 3");
        assert_eq!(snap.display_time(2), "Snapshot 3");

        let labeled = Snapshot::new(vec![]).with_label("June survey");
        assert_eq!(labeled.display_time(0), "June survey");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let snap: Snapshot = serde_json::from_value(serde_json::json!({
            "label": "s1",
            "records": [{"id": "P1", "crop_code": 3}, {}]
        }))
        .unwrap();
        assert_eq!(snap.records.len(), 2);
        assert_eq!(snap.records[0].crop_code, Some(3));
        assert!(snap.records[1].id.is_none());
        assert!(snap.records[1].geometry.is_null());
    }
}
