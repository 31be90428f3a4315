//! croptrail-interchange: snapshot ingestion at the engine boundary.
//!
//! Upstream tooling hands over parsed GeoJSON-like feature collections
//! whose property names vary between classification runs (`gridcode`,
//! `GRIDCODE`, `type`, ...). This crate resolves those names once, through
//! a prioritized [`FieldPriorities`](croptrail_core::FieldPriorities) list,
//! and produces typed [`Snapshot`](croptrail_core::Snapshot)s so the
//! analysis pipeline never deals with loose property lookups.

pub mod deserialize;
pub mod extract;

pub use deserialize::{
    snapshot_from_feature_collection, snapshots_from_time_points, InterchangeError,
};
pub use extract::extract_record;
