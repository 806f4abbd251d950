//! Catalog loader
//!
//! Loading pipeline:
//! 1. Size check against [`CatalogLimits::max_catalog_size`]
//! 2. UTF-8 BOM strip
//! 3. YAML parsing into a [`CatalogDefinition`]
//! 4. Validation (collects every issue)
//! 5. Freeze into an `Arc<Catalog>`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::catalog::schema::CatalogDefinition;
use crate::catalog::validation::Validator;
use crate::error::CatalogError;

// ============================================================================
// Public API
// ============================================================================

/// Options for the catalog loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Size limits applied while loading.
    pub limits: CatalogLimits,
}

/// Limits on catalog size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct CatalogLimits {
    /// Maximum catalog document size in bytes.
    pub max_catalog_size: usize,

    /// Maximum number of declared levels.
    pub max_levels: usize,

    /// Maximum number of components.
    pub max_components: usize,

    /// Maximum number of techniques per component.
    pub max_techniques_per_component: usize,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            max_catalog_size: env_or("PRIVCHAIN_MAX_CATALOG_SIZE", 4 * 1024 * 1024),
            max_levels: env_or("PRIVCHAIN_MAX_LEVELS", 256),
            max_components: env_or("PRIVCHAIN_MAX_COMPONENTS", 1000),
            max_techniques_per_component: env_or("PRIVCHAIN_MAX_TECHNIQUES", 200),
        }
    }
}

/// Result of loading a catalog.
#[derive(Debug)]
pub struct LoadResult {
    /// The validated, frozen catalog.
    pub catalog: Arc<Catalog>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during catalog loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Catalog loader.
#[derive(Debug, Default)]
pub struct CatalogLoader {
    options: LoaderOptions,
}

impl CatalogLoader {
    /// Creates a new catalog loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new catalog loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds the size limit,
    /// fails to parse, or fails validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, CatalogError> {
        let metadata = std::fs::metadata(path).map_err(|_| CatalogError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size =
            usize::try_from(metadata.len()).unwrap_or(self.options.limits.max_catalog_size);
        self.check_size(file_size)?;

        let raw = std::fs::read_to_string(path).map_err(|_| CatalogError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_with_origin(&raw, path)
    }

    /// Loads a catalog from an in-memory YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exceeds the size limit, fails to
    /// parse, or fails validation.
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, CatalogError> {
        self.check_size(yaml.len())?;
        self.load_with_origin(yaml, Path::new("<inline>"))
    }

    fn check_size(&self, size: usize) -> Result<(), CatalogError> {
        if size > self.options.limits.max_catalog_size {
            return Err(CatalogError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{size} bytes"),
                expected: format!("at most {} bytes", self.options.limits.max_catalog_size),
            });
        }
        Ok(())
    }

    fn load_with_origin(&self, raw: &str, origin: &Path) -> Result<LoadResult, CatalogError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        if raw.trim().is_empty() {
            return Err(CatalogError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: "Catalog document is empty".to_string(),
            });
        }

        let def: CatalogDefinition =
            serde_yaml::from_str(raw).map_err(|e| CatalogError::ParseError {
                path: PathBuf::from(origin),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        let result = Validator::new().validate(&def, &self.options.limits);
        if result.has_errors() {
            return Err(CatalogError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }

        let warnings: Vec<LoadWarning> = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect();

        for warning in &warnings {
            warn!(origin = %origin.display(), "{warning}");
        }

        let catalog = Catalog::from_validated(def);
        debug!(
            origin = %origin.display(),
            catalog = %catalog.name(),
            levels = catalog.levels().len(),
            components = catalog.components().len(),
            techniques = catalog.technique_count(),
            "catalog loaded"
        );

        Ok(LoadResult {
            catalog: Arc::new(catalog),
            warnings,
        })
    }
}

/// Reads a numeric limit from the environment, falling back to `default`.
fn env_or(var: &str, default: usize) -> usize {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
