use std::path::PathBuf;

/// Errors raised while loading an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid JSON for the config schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog maps the same code twice.
    #[error("crop catalog lists code {code} more than once")]
    DuplicateCropCode { code: i64 },

    /// A catalog entry uses the label reserved for missing crops.
    #[error("crop catalog code {code} uses the reserved label '{label}'")]
    ReservedCropLabel { code: i64, label: String },
}
