//! Core error types for `privchain`
//!
//! Catalog loading/validation errors and chain transition errors shared
//! across the workspace.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Catalog Errors
// ============================================================================

/// Catalog loading and validation errors.
///
/// These cover every failure mode between reading a catalog document and
/// freezing it into an immutable [`Catalog`](crate::catalog::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// YAML parsing or deserialization failed
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    ParseError {
        /// Path (or origin label) of the catalog document
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Catalog validation failed
    #[error("catalog validation failed for {path} ({} error(s))", errors.len())]
    ValidationError {
        /// Path (or origin label) of the catalog document
        path: String,
        /// Every error-severity issue found
        errors: Vec<ValidationIssue>,
    },

    /// Catalog file not found or unreadable
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Chain Errors
// ============================================================================

/// Errors raised by [`ChainEngine`](crate::chain::ChainEngine) operations.
///
/// Every variant is locally recoverable: the engine state is left exactly
/// as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The vector does not start from the current privilege level.
    #[error(
        "invalid transition: '{vector}' starts from '{source_privilege}' but the chain is at '{current}'"
    )]
    InvalidTransition {
        /// Display name of the rejected vector
        vector: String,
        /// The vector's source privilege
        source_privilege: String,
        /// The engine's current privilege
        current: String,
    },

    /// No technique with this id is offered by the component.
    #[error("unknown attack vector '{component}/{technique}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownVector {
        /// Requested component id
        component: String,
        /// Requested technique id
        technique: String,
        /// Closest known id, if one is near enough
        suggestion: Option<String>,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found while validating a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "components[2].techniques[0].cves[1]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - the catalog cannot be used
    Error,
    /// Warning - suspicious but loadable
    Warning,
}
