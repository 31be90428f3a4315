//! Per-snapshot crop distribution.
//!
//! Tallies the label at each snapshot index across every trajectory.
//! Gap-filled positions count as [`UNKNOWN_LABEL`](croptrail_core::UNKNOWN_LABEL)
//! like any other label, so each snapshot's total equals the number of
//! trajectories.

use crate::round_tenths;
use crate::trajectory::Trajectory;
use croptrail_core::{CropCatalog, CropCategory, Snapshot};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropShare {
    pub crop: String,
    pub count: usize,
    /// Share of the snapshot total, percent, one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: CropCategory,
    pub count: usize,
    pub percentage: f64,
}

/// Crop census at one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropDistributionPoint {
    pub index: usize,
    pub label: String,
    pub time: String,
    /// Sorted by descending count, ties by label.
    pub crops: Vec<CropShare>,
    /// Sorted by descending count, ties by category.
    pub categories: Vec<CategoryShare>,
    pub total: usize,
}

/// Percentage of `count` in `total`, rounded to one decimal.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_tenths(count as f64 / total as f64 * 100.0)
    }
}

/// Compute the crop distribution for every snapshot index.
pub fn crop_distribution(
    trajectories: &[Trajectory],
    snapshots: &[Snapshot],
    catalog: &CropCatalog,
) -> Vec<CropDistributionPoint> {
    (0..snapshots.len())
        .map(|index| {
            let mut crop_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for trajectory in trajectories {
                if let Some(crop) = trajectory.crop_history.get(index) {
                    *crop_counts.entry(crop.as_str()).or_default() += 1;
                }
            }
            let total: usize = crop_counts.values().sum();

            let mut category_counts: BTreeMap<CropCategory, usize> = BTreeMap::new();
            for (crop, count) in &crop_counts {
                *category_counts.entry(catalog.category(crop)).or_default() += count;
            }

            let mut crops: Vec<CropShare> = crop_counts
                .into_iter()
                .map(|(crop, count)| CropShare {
                    crop: crop.to_string(),
                    count,
                    percentage: percentage(count, total),
                })
                .collect();
            crops.sort_by(|a, b| b.count.cmp(&a.count));

            let mut categories: Vec<CategoryShare> = category_counts
                .into_iter()
                .map(|(category, count)| CategoryShare {
                    category,
                    count,
                    percentage: percentage(count, total),
                })
                .collect();
            categories.sort_by(|a, b| b.count.cmp(&a.count));

            CropDistributionPoint {
                index,
                label: snapshots[index].display_label(index),
                time: snapshots[index].display_time(index),
                crops,
                categories,
                total,
            }
        })
        .collect()
}
