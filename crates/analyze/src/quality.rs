//! Data quality assessment -- diagnostics that never block a run.
//!
//! [`assess`] is a read-only pass over the ordered snapshots. Alignment
//! anomalies found later by the trajectory builder are folded in with
//! [`QualityReport::absorb`], so callers see every caveat in one place.

use crate::normalize::snapshot_time;
use crate::round_tenths;
use crate::trajectory::BuildDiagnostic;
use croptrail_core::{CropCatalog, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Severity level for a quality warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What a quality warning is about. Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EmptySnapshot,
    CountMismatch,
    MissingEntityId,
    DuplicateEntityId,
    UnmappedCropCode,
    UntimedSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityWarning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
    /// Affected snapshot, for per-snapshot warnings.
    pub snapshot_index: Option<usize>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotCount {
    pub index: usize,
    pub label: String,
    pub time: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub warnings: Vec<QualityWarning>,
    pub snapshot_counts: Vec<SnapshotCount>,
    /// `min(count) / max(count) * 100`, one decimal; 0 when every snapshot is empty.
    pub match_rate: f64,
    pub is_consistent: bool,
}

impl QualityReport {
    /// Fold trajectory-builder diagnostics into the report.
    ///
    /// Produces at most one warning per snapshot and kind.
    pub fn absorb(&mut self, diagnostics: &[BuildDiagnostic]) {
        let mut missing: BTreeMap<usize, usize> = BTreeMap::new();
        let mut duplicates: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();

        for diagnostic in diagnostics {
            match diagnostic {
                BuildDiagnostic::MissingEntityId { snapshot_index, .. } => {
                    *missing.entry(*snapshot_index).or_default() += 1;
                }
                BuildDiagnostic::DuplicateEntityId { snapshot_index, id } => {
                    duplicates
                        .entry(*snapshot_index)
                        .or_default()
                        .insert(id.as_str());
                }
            }
        }

        for (index, dropped) in missing {
            let message = format!(
                "Snapshot {} ({}) has {} record(s) without an id; they were skipped",
                index + 1,
                self.label_of(index),
                dropped
            );
            self.warnings.push(QualityWarning {
                kind: WarningKind::MissingEntityId,
                severity: Severity::Warning,
                message,
                snapshot_index: Some(index),
                details: Some(serde_json::json!({ "dropped": dropped })),
            });
        }

        for (index, ids) in duplicates {
            let ids: Vec<&str> = ids.into_iter().collect();
            let message = format!(
                "Snapshot {} ({}) lists {} id(s) more than once; the first record was kept: {}",
                index + 1,
                self.label_of(index),
                ids.len(),
                ids.join(", ")
            );
            self.warnings.push(QualityWarning {
                kind: WarningKind::DuplicateEntityId,
                severity: Severity::Warning,
                message,
                snapshot_index: Some(index),
                details: Some(serde_json::json!({ "ids": ids })),
            });
        }

        self.sort_warnings();
    }

    pub fn has_errors(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Error)
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &QualityWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    fn label_of(&self, index: usize) -> &str {
        self.snapshot_counts
            .get(index)
            .map(|c| c.label.as_str())
            .unwrap_or("")
    }

    fn sort_warnings(&mut self) {
        self.warnings
            .sort_by(|a, b| a.kind.cmp(&b.kind).then(a.snapshot_index.cmp(&b.snapshot_index)));
    }
}

/// Assess per-snapshot counts and consistency.
pub fn assess(snapshots: &[Snapshot], catalog: &CropCatalog) -> QualityReport {
    let mut warnings = Vec::new();

    let snapshot_counts: Vec<SnapshotCount> = snapshots
        .iter()
        .enumerate()
        .map(|(index, s)| SnapshotCount {
            index,
            label: s.display_label(index),
            time: s.display_time(index),
            count: s.record_count(),
        })
        .collect();

    for sc in snapshot_counts.iter().filter(|sc| sc.count == 0) {
        warnings.push(QualityWarning {
            kind: WarningKind::EmptySnapshot,
            severity: Severity::Error,
            message: format!("Snapshot {} ({}) has no parcels", sc.index + 1, sc.label),
            snapshot_index: Some(sc.index),
            details: None,
        });
    }

    let max = snapshot_counts.iter().map(|c| c.count).max().unwrap_or(0);
    let min = snapshot_counts.iter().map(|c| c.count).min().unwrap_or(0);

    if max != min {
        warnings.push(QualityWarning {
            kind: WarningKind::CountMismatch,
            severity: Severity::Warning,
            message: format!(
                "Parcel counts differ between snapshots ({}-{}); comparisons may be affected",
                min, max
            ),
            snapshot_index: None,
            details: Some(serde_json::json!({ "counts": snapshot_counts })),
        });
    }

    let unmapped: BTreeSet<i64> = snapshots
        .iter()
        .flat_map(|s| s.records.iter())
        .filter_map(|r| r.crop_code)
        .filter(|code| !catalog.is_mapped(*code))
        .collect();
    if !unmapped.is_empty() {
        let codes: Vec<i64> = unmapped.into_iter().collect();
        tracing::warn!(target: "croptrail::quality", codes = ?codes, "unmapped crop codes");
        warnings.push(QualityWarning {
            kind: WarningKind::UnmappedCropCode,
            severity: Severity::Info,
            message: format!(
                "{} crop code(s) are not in the catalog: {}",
                codes.len(),
                codes
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            snapshot_index: None,
            details: Some(serde_json::json!({ "codes": codes })),
        });
    }

    for (index, snapshot) in snapshots.iter().enumerate() {
        if snapshot_time(snapshot).is_none() {
            warnings.push(QualityWarning {
                kind: WarningKind::UntimedSnapshot,
                severity: Severity::Info,
                message: format!(
                    "Snapshot {} ({}) has no usable time; it was ordered after timed snapshots",
                    index + 1,
                    snapshot_counts[index].label
                ),
                snapshot_index: Some(index),
                details: snapshot
                    .time_value()
                    .map(|raw| serde_json::json!({ "time": raw })),
            });
        }
    }

    let match_rate = if max == 0 {
        0.0
    } else {
        round_tenths(min as f64 / max as f64 * 100.0)
    };

    let mut report = QualityReport {
        warnings,
        snapshot_counts,
        match_rate,
        is_consistent: max == min,
    };
    report.sort_warnings();

    tracing::debug!(
        target: "croptrail::quality",
        warnings = report.warnings.len(),
        match_rate = report.match_rate,
        "quality.assessed"
    );

    report
}
