//! Croptrail analyzer -- cross-time crop trajectory analysis.
//!
//! Consumes already-parsed [`Snapshot`]s and runs a strictly linear
//! pipeline, one module per stage:
//!
//! 1. [`normalize`] -- chronological ordering, rejects fewer than two snapshots
//! 2. [`quality`] -- per-snapshot counts, consistency warnings
//! 3. [`trajectory`] -- identity alignment, gap filling, change counts
//! 4. [`transitions`] / [`distribution`] (via [`aggregate`]) -- transition
//!    matrix and per-snapshot crop census
//! 5. [`rotation`] -- most frequent crop sequences
//! 6. [`report`] -- assembly into an [`AnalysisResult`]
//!
//! Only [`AnalysisError::InsufficientSnapshots`] aborts a run. Every other
//! anomaly ends up in [`QualityReport`].

pub mod aggregate;
pub mod distribution;
pub mod normalize;
pub mod quality;
pub mod report;
pub mod rotation;
pub mod trajectory;
pub mod transitions;

pub use aggregate::Aggregation;
pub use distribution::{CategoryShare, CropDistributionPoint, CropShare};
pub use normalize::AnalysisError;
pub use quality::{QualityReport, QualityWarning, Severity, SnapshotCount, WarningKind};
pub use report::{AnalysisResult, Feature, SnapshotInfo, SummaryStats};
pub use rotation::RotationPattern;
pub use trajectory::{BuildDiagnostic, TimelinePoint, Trajectory, TrajectoryBuild};
pub use transitions::{TransitionEntry, TransitionMatrix};

use croptrail_core::{AnalysisConfig, Snapshot};

/// Run the full pipeline with the builtin configuration.
pub fn analyze(snapshots: &[Snapshot]) -> Result<AnalysisResult, AnalysisError> {
    analyze_with_config(snapshots, &AnalysisConfig::builtin())
}

/// Run the full pipeline.
///
/// Snapshots may arrive in any order; the result is always indexed in
/// chronological order.
pub fn analyze_with_config(
    snapshots: &[Snapshot],
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let ordered = normalize::normalize(snapshots)?;

    let mut quality = quality::assess(&ordered, &config.catalog);
    let build = trajectory::build_trajectories(&ordered, &config.catalog);
    quality.absorb(&build.diagnostics);

    let aggregation = aggregate::aggregate(&build.trajectories, &ordered, &config.catalog);
    let patterns = rotation::rotation_patterns(&build.trajectories, config.rotation_pattern_limit);

    let result = report::assemble(build.trajectories, quality, aggregation, patterns, &ordered);

    tracing::info!(
        target: "croptrail::analyze",
        snapshots = result.summary.snapshot_count,
        total = result.summary.total,
        changed = result.summary.changed,
        total_changes = result.summary.total_changes,
        warnings = result.quality.warnings.len(),
        "analysis.complete"
    );
    if result.summary.total > 0 && result.summary.changed == 0 {
        tracing::warn!(
            target: "croptrail::analyze",
            "no parcel changed crop; check crop code fields and id matching"
        );
    }

    Ok(result)
}

/// Round to one decimal place.
pub(crate) fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use croptrail_core::EntityRecord;

    fn snapshot(time: &str, records: Vec<(&str, i64)>) -> Snapshot {
        Snapshot::new(
            records
                .into_iter()
                .map(|(id, code)| EntityRecord::new(id, Some(code)))
                .collect(),
        )
        .with_label(time)
        .with_time(time)
    }

    #[test]
    fn test_round_tenths() {
        assert_eq!(round_tenths(66.666), 66.7);
        assert_eq!(round_tenths(33.333), 33.3);
        assert_eq!(round_tenths(0.0), 0.0);
    }

    #[test]
    fn test_full_analyze() {
        let result = analyze(&[
            snapshot("2023-06-01", vec![("P1", 3), ("P2", 2)]),
            snapshot("2022-06-01", vec![("P1", 2), ("P2", 2)]),
        ])
        .unwrap();

        assert_eq!(result.snapshots[0].label, "2022-06-01");
        assert_eq!(result.summary.total, 2);
        assert_eq!(result.summary.changed, 1);
        assert_eq!(result.trajectory("P1").unwrap().crop_history, vec!["Cotton", "Wheat"]);
        assert_eq!(result.transitions.get("Cotton", "Wheat"), 1);
        assert!(result.quality.warnings.is_empty());
    }

    #[test]
    fn test_analyze_rejects_single_snapshot() {
        let err = analyze(&[snapshot("2023-06-01", vec![("P1", 3)])]).unwrap_err();
        assert_eq!(err, AnalysisError::InsufficientSnapshots { supplied: 1 });
    }

    #[test]
    fn test_custom_config_catalog_and_limit() {
        let config = AnalysisConfig::from_json_str(
            r#"{"catalog": [{"code": 1, "label": "Rice", "category": "grain"},
                            {"code": 2, "label": "Soy", "category": "cash"}],
                "rotation_pattern_limit": 1}"#,
        )
        .unwrap();
        let result = analyze_with_config(
            &[
                snapshot("2021-01-01", vec![("A", 1), ("B", 2), ("C", 1)]),
                snapshot("2022-01-01", vec![("A", 2), ("B", 1), ("C", 2)]),
            ],
            &config,
        )
        .unwrap();
        assert_eq!(result.transitions.get("Rice", "Soy"), 2);
        assert_eq!(result.rotation_patterns.len(), 1);
        assert_eq!(result.rotation_patterns[0].pattern, "Rice → Soy");
        assert_eq!(result.rotation_patterns[0].count, 2);
    }

    #[test]
    fn test_missing_ids_surface_in_quality_report() {
        let mut second = snapshot("2023-01-01", vec![("P1", 2)]);
        second.records.push(EntityRecord::anonymous(Some(4)));
        let result = analyze(&[snapshot("2022-01-01", vec![("P1", 2), ("P2", 3)]), second]).unwrap();

        let missing: Vec<_> = result
            .quality
            .warnings_of(WarningKind::MissingEntityId)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].snapshot_index, Some(1));
        assert_eq!(result.summary.total, 2);
    }
}
