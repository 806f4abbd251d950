//! Error types for `privchain`
//!
//! Aggregates the per-layer errors and maps each to a process exit code.

use thiserror::Error;

pub use privchain_core::error::{CatalogError, ChainError, Severity, ValidationIssue};
pub use privchain_export::ExportError;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `privchain` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Catalog error (invalid YAML, validation failure, missing file)
    pub const CATALOG_ERROR: i32 = 2;

    /// I/O error (artifact not writable)
    pub const IO_ERROR: i32 = 3;

    /// Chain error (invalid transition, unknown vector)
    pub const CHAIN_ERROR: i32 = 5;

    /// Usage error (invalid arguments)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `privchain` operations.
#[derive(Debug, Error)]
pub enum PrivChainError {
    /// Catalog loading or validation error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rejected chain operation
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Artifact export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Invalid command-line usage not caught by the parser
    #[error("{0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrivChainError {
    /// Returns the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Catalog(_) => ExitCode::CATALOG_ERROR,
            Self::Chain(_) => ExitCode::CHAIN_ERROR,
            Self::Export(ExportError::Io { .. }) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Export(_) | Self::Json(_) => ExitCode::ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_mapping() {
        let catalog = PrivChainError::Catalog(CatalogError::MissingFile {
            path: PathBuf::from("missing.yaml"),
        });
        assert_eq!(catalog.exit_code(), ExitCode::CATALOG_ERROR);

        let chain = PrivChainError::Chain(ChainError::InvalidTransition {
            vector: "B: T2".to_string(),
            source_privilege: "Mid".to_string(),
            current: "Sandbox".to_string(),
        });
        assert_eq!(chain.exit_code(), ExitCode::CHAIN_ERROR);

        let io = PrivChainError::Export(ExportError::Io {
            path: PathBuf::from("/readonly/attack-chain.json"),
            source: std::io::Error::other("read-only"),
        });
        assert_eq!(io.exit_code(), ExitCode::IO_ERROR);

        let render = PrivChainError::Export(ExportError::Render("lost".to_string()));
        assert_eq!(render.exit_code(), ExitCode::ERROR);

        let usage = PrivChainError::Usage("bad".to_string());
        assert_eq!(usage.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_chain_error_is_transparent() {
        let err = PrivChainError::from(ChainError::UnknownVector {
            component: "v9".to_string(),
            technique: "jit".to_string(),
            suggestion: Some("v8".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "unknown attack vector 'v9/jit' (did you mean 'v8'?)"
        );
    }
}
