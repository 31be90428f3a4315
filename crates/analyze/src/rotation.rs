//! Rotation patterns -- the most common full crop sequences.

use crate::trajectory::Trajectory;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPattern {
    /// Crop sequence joined with `" → "`.
    pub pattern: String,
    pub count: usize,
}

/// Top `limit` crop sequences among changed trajectories.
///
/// Sorted by descending count, ties by pattern.
pub fn rotation_patterns(trajectories: &[Trajectory], limit: usize) -> Vec<RotationPattern> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for trajectory in trajectories.iter().filter(|t| t.is_changed()) {
        *counts.entry(trajectory.crop_sequence()).or_default() += 1;
    }

    let mut patterns: Vec<RotationPattern> = counts
        .into_iter()
        .map(|(pattern, count)| RotationPattern { pattern, count })
        .collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    patterns.truncate(limit);
    patterns
}
