//! croptrail-core: shared data model for the crop trajectory engine.
//!
//! Holds the input types every other crate speaks ([`Snapshot`],
//! [`EntityRecord`]), the crop code resolver ([`CropCatalog`]), and the
//! engine configuration ([`AnalysisConfig`]).
//!
//! # Public API
//!
//! - [`Snapshot`] / [`EntityRecord`] -- immutable input units
//! - [`CropCatalog`] -- code to label lookup with category classification
//! - [`AnalysisConfig`] -- catalog, ingestion field priorities, limits
//! - [`ConfigError`] -- configuration loading failures

pub mod config;
pub mod crop;
pub mod error;
pub mod snapshot;

// ── Convenience re-exports ───────────────────────────────────────────

pub use config::{load_config_from_env, AnalysisConfig, FieldPriorities, CONFIG_PATH_ENV};
pub use crop::{CatalogEntry, CropCatalog, CropCategory, UNKNOWN_LABEL};
pub use error::ConfigError;
pub use snapshot::{EntityRecord, Snapshot};
