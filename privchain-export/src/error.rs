//! Error types for chain export.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while producing export artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serializing structured data failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing an artifact failed
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// An external render target failed
    #[error("render target failed: {0}")]
    Render(String),
}
