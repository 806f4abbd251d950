//! Built-in browser privilege-escalation catalog.
//!
//! Embedded at compile time and loaded through the same pipeline as
//! user-supplied catalogs.

use crate::catalog::loader::{CatalogLoader, LoadResult};
use crate::error::CatalogError;

/// YAML source of the built-in catalog.
pub const BUILTIN_CATALOG_YAML: &str = include_str!("../../catalog/browser.yaml");

/// Loads the built-in catalog.
///
/// # Errors
///
/// Returns an error only if the embedded document is malformed.
pub fn builtin_catalog() -> Result<LoadResult, CatalogError> {
    CatalogLoader::with_defaults().load_from_str(BUILTIN_CATALOG_YAML)
}
