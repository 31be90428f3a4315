//! Trajectory building -- identity alignment across snapshots.
//!
//! Every distinct entity id observed in any snapshot gets one
//! [`Trajectory`] with exactly one [`TimelinePoint`] per snapshot. Points
//! are placed into a dense slot array indexed by snapshot position during
//! ingestion; a single pass afterwards fills empty slots with the
//! [`UNKNOWN_LABEL`] sentinel.
//!
//! Invariants on the output:
//! - `timeline.len() == crop_history.len() == snapshots.len()`
//! - `timeline[i].index == i`
//! - `change_count` is the number of adjacent label differences
//! - trajectories appear in first-seen order

use croptrail_core::{CropCatalog, Snapshot, UNKNOWN_LABEL};
use serde::Serialize;
use std::collections::HashMap;

/// Separator between labels in crop sequences and transition keys.
pub const SEQUENCE_SEPARATOR: &str = " → ";

/// One entity's observation at one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    /// Snapshot position in chronological order.
    pub index: usize,
    pub label: String,
    pub crop: String,
    pub crop_code: Option<i64>,
    pub time: String,
}

/// An entity's ordered crop classifications across all snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub id: String,
    pub name: String,
    pub area: Option<f64>,
    /// Geometry from the first snapshot the entity appears in.
    pub geometry: serde_json::Value,
    pub timeline: Vec<TimelinePoint>,
    pub crop_history: Vec<String>,
    pub change_count: usize,
}

impl Trajectory {
    pub fn is_changed(&self) -> bool {
        self.change_count > 0
    }

    pub fn start_crop(&self) -> &str {
        self.crop_history.first().map(String::as_str).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn end_crop(&self) -> &str {
        self.crop_history.last().map(String::as_str).unwrap_or(UNKNOWN_LABEL)
    }

    /// The crop history joined with [`SEQUENCE_SEPARATOR`].
    pub fn crop_sequence(&self) -> String {
        self.crop_history.join(SEQUENCE_SEPARATOR)
    }
}

/// A non-fatal anomaly found while aligning records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildDiagnostic {
    /// A record had no usable id and was dropped.
    MissingEntityId {
        snapshot_index: usize,
        record_index: usize,
    },
    /// A snapshot listed an id more than once; the first record was kept.
    DuplicateEntityId { snapshot_index: usize, id: String },
}

/// Output of [`build_trajectories`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryBuild {
    pub trajectories: Vec<Trajectory>,
    pub diagnostics: Vec<BuildDiagnostic>,
}

impl TrajectoryBuild {
    /// Records dropped for lacking a usable id.
    pub fn missing_id_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, BuildDiagnostic::MissingEntityId { .. }))
            .count()
    }

    /// Records dropped as repeats of an id already seen in their snapshot.
    pub fn duplicate_id_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, BuildDiagnostic::DuplicateEntityId { .. }))
            .count()
    }
}

/// Count positions `i >= 1` where the label differs from position `i - 1`.
pub fn count_changes(history: &[String]) -> usize {
    history.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

struct PendingTrajectory {
    id: String,
    name: Option<String>,
    area: Option<f64>,
    geometry: serde_json::Value,
    slots: Vec<Option<TimelinePoint>>,
}

/// Align entities by id across chronologically ordered snapshots.
pub fn build_trajectories(snapshots: &[Snapshot], catalog: &CropCatalog) -> TrajectoryBuild {
    let n = snapshots.len();
    let labels: Vec<String> = snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| s.display_label(i))
        .collect();
    let times: Vec<String> = snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| s.display_time(i))
        .collect();

    let mut pending: Vec<PendingTrajectory> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut diagnostics = Vec::new();

    for (snapshot_index, snapshot) in snapshots.iter().enumerate() {
        for (record_index, record) in snapshot.records.iter().enumerate() {
            let Some(id) = record.usable_id() else {
                tracing::warn!(
                    target: "croptrail::trajectory",
                    snapshot = %labels[snapshot_index],
                    record_index,
                    "record without id dropped"
                );
                diagnostics.push(BuildDiagnostic::MissingEntityId {
                    snapshot_index,
                    record_index,
                });
                continue;
            };

            let slot = *by_id.entry(id.to_string()).or_insert_with(|| {
                pending.push(PendingTrajectory {
                    id: id.to_string(),
                    name: record.name.clone(),
                    area: record.area,
                    geometry: record.geometry.clone(),
                    slots: vec![None; n],
                });
                pending.len() - 1
            });

            let entry = &mut pending[slot];
            if entry.slots[snapshot_index].is_some() {
                tracing::warn!(
                    target: "croptrail::trajectory",
                    snapshot = %labels[snapshot_index],
                    id,
                    "duplicate id in snapshot, keeping first record"
                );
                diagnostics.push(BuildDiagnostic::DuplicateEntityId {
                    snapshot_index,
                    id: id.to_string(),
                });
                continue;
            }

            entry.slots[snapshot_index] = Some(TimelinePoint {
                index: snapshot_index,
                label: labels[snapshot_index].clone(),
                crop: catalog.resolve(record.crop_code),
                crop_code: record.crop_code,
                time: times[snapshot_index].clone(),
            });
        }
    }

    let mut gap_filled = 0usize;
    let trajectories: Vec<Trajectory> = pending
        .into_iter()
        .map(|p| {
            let timeline: Vec<TimelinePoint> = p
                .slots
                .into_iter()
                .enumerate()
                .map(|(index, slot)| {
                    slot.unwrap_or_else(|| {
                        gap_filled += 1;
                        TimelinePoint {
                            index,
                            label: labels[index].clone(),
                            crop: UNKNOWN_LABEL.to_string(),
                            crop_code: None,
                            time: times[index].clone(),
                        }
                    })
                })
                .collect();
            let crop_history: Vec<String> = timeline.iter().map(|pt| pt.crop.clone()).collect();
            let change_count = count_changes(&crop_history);

            Trajectory {
                name: p.name.unwrap_or_else(|| format!("Parcel {}", p.id)),
                id: p.id,
                area: p.area,
                geometry: p.geometry,
                timeline,
                crop_history,
                change_count,
            }
        })
        .collect();

    let build = TrajectoryBuild {
        trajectories,
        diagnostics,
    };
    tracing::info!(
        target: "croptrail::trajectory",
        entities = build.trajectories.len(),
        changed = build.trajectories.iter().filter(|t| t.is_changed()).count(),
        gap_filled,
        missing_ids = build.missing_id_count(),
        duplicate_ids = build.duplicate_id_count(),
        "trajectories.built"
    );
    build
}
