//! Crop transition matrix.
//!
//! Counts adjacent-snapshot label changes across changed trajectories.
//! A parcel reporting the same crop twice in a row is not a transition,
//! so self-pairs are never recorded.

use crate::trajectory::{Trajectory, SEQUENCE_SEPARATOR};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One `(from, to)` cell of the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEntry {
    pub from: String,
    pub to: String,
    /// Display key, `"<from> → <to>"`.
    pub key: String,
    pub count: usize,
}

/// Transition counts, sorted by descending count then `(from, to)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitionMatrix {
    pub entries: Vec<TransitionEntry>,
    /// Every label that takes part in at least one transition, sorted.
    pub crop_labels: Vec<String>,
    pub total_changes: usize,
}

impl TransitionMatrix {
    pub fn get(&self, from: &str, to: &str) -> usize {
        self.entries
            .iter()
            .find(|e| e.from == from && e.to == to)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the transition matrix from built trajectories.
///
/// Trajectories with `change_count == 0` contribute nothing.
pub fn transition_matrix(trajectories: &[Trajectory]) -> TransitionMatrix {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut labels: BTreeSet<&str> = BTreeSet::new();

    for trajectory in trajectories.iter().filter(|t| t.is_changed()) {
        for pair in trajectory.crop_history.windows(2) {
            let (from, to) = (pair[0].as_str(), pair[1].as_str());
            if from == to {
                continue;
            }
            labels.insert(from);
            labels.insert(to);
            *counts.entry((from, to)).or_default() += 1;
        }
    }

    let mut entries: Vec<TransitionEntry> = counts
        .into_iter()
        .map(|((from, to), count)| TransitionEntry {
            from: from.to_string(),
            to: to.to_string(),
            key: format!("{}{}{}", from, SEQUENCE_SEPARATOR, to),
            count,
        })
        .collect();
    // BTreeMap iteration is already (from, to) ordered; a stable sort keeps that for ties.
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    let total_changes = entries.iter().map(|e| e.count).sum();
    tracing::debug!(
        target: "croptrail::transitions",
        distinct = entries.len(),
        total_changes,
        "transitions.counted"
    );

    TransitionMatrix {
        entries,
        crop_labels: labels.into_iter().map(str::to_string).collect(),
        total_changes,
    }
}
