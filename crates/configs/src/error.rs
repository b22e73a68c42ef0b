use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the configuration from being loaded or written.
///
/// Everything here is startup-fatal; validation problems are reported
/// separately as [`crate::ConfigError`] values.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Every candidate was missing or had an unsupported format.
    #[error("no usable config found! please make sure you have a valid configuration file! (tried: {})", display_paths(.tried))]
    ConfigNotFound { tried: Vec<PathBuf> },

    /// The file exists but could not be read or written.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse TOML config {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// JSON sources must hold a single top-level object.
    #[error("config {} must contain a top-level object", .path.display())]
    NotAMapping { path: PathBuf },

    /// JSON has no NaN or infinity; writing one would silently turn it into `null`.
    #[error("cannot store non-finite number at `{key}`")]
    NonFiniteFloat { key: String },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
