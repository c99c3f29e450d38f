use std::path::PathBuf;

/// Errors raised while loading or validating a tree configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parameter `{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("Parameter `initial_length` must be positive, got {0}")]
    NonPositiveLength(f64),
    #[error("max_depth {depth} exceeds the limit of {limit}")]
    DepthTooLarge { depth: u32, limit: u32 },
    #[error("Parameters allow up to {bound} instances, more than the limit of {limit}")]
    TooManyInstances { bound: u64, limit: u64 },
}
