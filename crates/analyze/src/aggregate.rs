//! Aggregation over built trajectories.
//!
//! Thin composition of [`transition_matrix`] and [`crop_distribution`];
//! both only read the trajectories.

use crate::distribution::{crop_distribution, CropDistributionPoint};
use crate::transitions::{transition_matrix, TransitionMatrix};
use crate::trajectory::Trajectory;
use croptrail_core::{CropCatalog, Snapshot};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub transitions: TransitionMatrix,
    pub distribution: Vec<CropDistributionPoint>,
    /// Sum of all transition counts.
    pub total_changes: usize,
}

/// Compute the transition matrix and per-snapshot distribution.
pub fn aggregate(
    trajectories: &[Trajectory],
    snapshots: &[Snapshot],
    catalog: &CropCatalog,
) -> Aggregation {
    let transitions = transition_matrix(trajectories);
    let distribution = crop_distribution(trajectories, snapshots, catalog);
    Aggregation {
        total_changes: transitions.total_changes,
        transitions,
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::build_trajectories;
    use croptrail_core::EntityRecord;

    #[test]
    fn test_aggregate_from_built_trajectories() {
        let catalog = CropCatalog::builtin();
        let snapshots = vec![
            Snapshot::new(vec![
                EntityRecord::new("P1", Some(3)),
                EntityRecord::new("P2", Some(2)),
            ]),
            Snapshot::new(vec![
                EntityRecord::new("P1", Some(4)),
                EntityRecord::new("P2", Some(2)),
            ]),
        ];
        let build = build_trajectories(&snapshots, &catalog);
        let agg = aggregate(&build.trajectories, &snapshots, &catalog);

        assert_eq!(agg.total_changes, 1);
        assert_eq!(agg.transitions.get("Wheat", "Corn"), 1);
        assert_eq!(agg.distribution.len(), 2);
        assert_eq!(agg.distribution[1].total, 2);
    }
}
