//! AnalysisResult -- the engine's single externally consumed artifact.
//!
//! Assembly only counts and reshapes; every real computation happened in
//! an earlier stage.

use crate::aggregate::Aggregation;
use crate::distribution::CropDistributionPoint;
use crate::quality::QualityReport;
use crate::rotation::RotationPattern;
use crate::trajectory::{TimelinePoint, Trajectory};
use crate::transitions::TransitionMatrix;
use croptrail_core::Snapshot;
use serde::Serialize;

/// Flattened per-entity record for geometry-rendering consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub area: Option<f64>,
    pub change_count: usize,
    pub start_crop: String,
    pub end_crop: String,
    pub timeline: Vec<TimelinePoint>,
    /// Crop history joined with `" → "`.
    pub crop_sequence: String,
    pub geometry: serde_json::Value,
}

impl From<&Trajectory> for Feature {
    fn from(t: &Trajectory) -> Self {
        Feature {
            id: t.id.clone(),
            name: t.name.clone(),
            area: t.area,
            change_count: t.change_count,
            start_crop: t.start_crop().to_string(),
            end_crop: t.end_crop().to_string(),
            timeline: t.timeline.clone(),
            crop_sequence: t.crop_sequence(),
            geometry: t.geometry.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    /// Distinct entity ids across all snapshots.
    pub total: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub total_changes: usize,
    pub snapshot_count: usize,
}

/// Metadata for one snapshot, in chronological position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub index: usize,
    pub label: String,
    pub time: String,
    pub entity_count: usize,
}

/// Full output of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub trajectories: Vec<Trajectory>,
    pub features: Vec<Feature>,
    pub summary: SummaryStats,
    pub snapshots: Vec<SnapshotInfo>,
    pub transitions: TransitionMatrix,
    pub distribution: Vec<CropDistributionPoint>,
    pub rotation_patterns: Vec<RotationPattern>,
    pub quality: QualityReport,
}

impl AnalysisResult {
    pub fn trajectory(&self, id: &str) -> Option<&Trajectory> {
        self.trajectories.iter().find(|t| t.id == id)
    }
}

/// Package stage outputs into an [`AnalysisResult`].
pub fn assemble(
    trajectories: Vec<Trajectory>,
    quality: QualityReport,
    aggregation: Aggregation,
    rotation_patterns: Vec<RotationPattern>,
    snapshots: &[Snapshot],
) -> AnalysisResult {
    let changed = trajectories.iter().filter(|t| t.is_changed()).count();
    let summary = SummaryStats {
        total: trajectories.len(),
        changed,
        unchanged: trajectories.len() - changed,
        total_changes: aggregation.total_changes,
        snapshot_count: snapshots.len(),
    };

    let snapshot_info = snapshots
        .iter()
        .enumerate()
        .map(|(index, s)| SnapshotInfo {
            index,
            label: s.display_label(index),
            time: s.display_time(index),
            entity_count: s.record_count(),
        })
        .collect();

    let features = trajectories.iter().map(Feature::from).collect();

    AnalysisResult {
        trajectories,
        features,
        summary,
        snapshots: snapshot_info,
        transitions: aggregation.transitions,
        distribution: aggregation.distribution,
        rotation_patterns,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::quality::assess;
    use crate::trajectory::build_trajectories;
    use croptrail_core::{CropCatalog, EntityRecord};
    use serde_json::json;

    fn sample() -> (Vec<Snapshot>, AnalysisResult) {
        let catalog = CropCatalog::builtin();
        let snapshots = vec![
            Snapshot::new(vec![
                EntityRecord::new("P1", Some(3)).with_geometry(json!({"type": "Polygon"})),
                EntityRecord::new("P2", Some(2)),
            ])
            .with_label("2022")
            .with_time("2022-07-01"),
            Snapshot::new(vec![EntityRecord::new("P1", Some(4))]).with_label("2023"),
        ];
        let build = build_trajectories(&snapshots, &catalog);
        let quality = assess(&snapshots, &catalog);
        let aggregation = aggregate(&build.trajectories, &snapshots, &catalog);
        let result = assemble(build.trajectories, quality, aggregation, vec![], &snapshots);
        (snapshots, result)
    }

    #[test]
    fn test_summary_counts() {
        let (_, result) = sample();
        assert_eq!(
            result.summary,
            SummaryStats {
                total: 2,
                changed: 2,
                unchanged: 0,
                total_changes: 2,
                snapshot_count: 2,
            }
        );
    }

    #[test]
    fn test_features_flatten_trajectories() {
        let (_, result) = sample();
        let p1 = &result.features[0];
        assert_eq!(p1.id, "P1");
        assert_eq!(p1.start_crop, "Wheat");
        assert_eq!(p1.end_crop, "Corn");
        assert_eq!(p1.crop_sequence, "Wheat → Corn");
        assert_eq!(p1.timeline.len(), 2);
        assert_eq!(p1.geometry, json!({"type": "Polygon"}));

        let p2 = &result.features[1];
        assert_eq!(p2.crop_sequence, "Cotton → Unknown");
    }

    #[test]
    fn test_snapshot_info() {
        let (_, result) = sample();
        assert_eq!(result.snapshots[0].label, "2022");
        assert_eq!(result.snapshots[0].time, "2022-07-01");
        assert_eq!(result.snapshots[0].entity_count, 2);
        assert_eq!(result.snapshots[1].time, "2023");
        assert_eq!(result.snapshots[1].entity_count, 1);
    }

    #[test]
    fn test_result_serializes_snake_case() {
        let (_, result) = sample();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["trajectories"].is_array());
        assert_eq!(json["summary"]["total_changes"], 2);
        assert_eq!(json["features"][0]["crop_sequence"], "Wheat → Corn");
        assert_eq!(json["quality"]["warnings"][0]["kind"], "count_mismatch");
        assert!(json["transitions"]["entries"].is_array());
        assert!(result.trajectory("P2").is_some());
        assert!(result.trajectory("P9").is_none());
    }
}
