//! Engine configuration.
//!
//! Every field has a default, so a config file only needs to list what it
//! overrides. [`load_config_from_env`] reads the file named by
//! [`CONFIG_PATH_ENV`] and falls back to [`AnalysisConfig::builtin`].

use crate::crop::CropCatalog;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an override config file.
pub const CONFIG_PATH_ENV: &str = "CROPTRAIL_CONFIG_PATH";

/// Candidate property names per record attribute, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPriorities {
    pub id: Vec<String>,
    /// Fall back to the feature-level `id` member when no property matches.
    pub use_feature_id: bool,
    pub crop_code: Vec<String>,
    pub name: Vec<String>,
    pub area: Vec<String>,
}

impl Default for FieldPriorities {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }
        FieldPriorities {
            id: names(&["id", "Id", "ID"]),
            use_feature_id: true,
            crop_code: names(&["gridcode", "GRIDCODE", "type", "Type"]),
            name: names(&["plotName", "name"]),
            area: names(&["area", "Area"]),
        }
    }
}

/// Configuration for an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub catalog: CropCatalog,
    pub fields: FieldPriorities,
    /// Maximum number of rotation patterns reported.
    pub rotation_pattern_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            catalog: CropCatalog::builtin(),
            fields: FieldPriorities::default(),
            rotation_pattern_limit: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// Load configuration from [`CONFIG_PATH_ENV`], or the builtin default.
///
/// Returns the config and the path it was read from, if any. A missing or
/// unreadable file is logged and never fatal.
pub fn load_config_from_env() -> (AnalysisConfig, Option<PathBuf>) {
    load_config_from(env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
}

pub(crate) fn load_config_from(path: Option<PathBuf>) -> (AnalysisConfig, Option<PathBuf>) {
    if let Some(path) = path {
        match AnalysisConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "croptrail::config",
                    path = %path.display(),
                    "analysis_config.loaded=file"
                );
                return (config, Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "croptrail::config",
                    path = %path.display(),
                    error = %err,
                    "analysis_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "croptrail::config", "analysis_config.loaded=builtin");
    (AnalysisConfig::builtin(), None)
}
