//! Privilege-escalation catalog
//!
//! The [`Catalog`] is the immutable, load-once registry of privilege
//! levels, target components, and exploitation techniques. Every other
//! part of the crate reads from it; nothing writes to it after
//! construction, so a shared `Arc<Catalog>` is safe to query from any
//! number of readers.

pub mod builtin;
pub mod loader;
pub mod schema;
pub mod validation;

pub use builtin::{BUILTIN_CATALOG_YAML, builtin_catalog};
pub use loader::{CatalogLimits, CatalogLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::{
    AttackVector, CatalogDefinition, ExploitationTechnique, PrivilegeLevel, TargetComponent,
};
pub use validation::{ValidationResult, Validator};

use indexmap::{IndexMap, IndexSet};

use crate::error::CatalogError;

/// Immutable registry of levels, components and techniques.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    start_level: String,
    levels: IndexMap<String, PrivilegeLevel>,
    components: Vec<TargetComponent>,
    terminal: IndexSet<String>,
}

impl Catalog {
    /// Validates `def` with default limits and freezes it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ValidationError`] listing every error-severity
    /// issue if the definition is not a well-formed catalog.
    pub fn new(def: CatalogDefinition) -> Result<Self, CatalogError> {
        let result = Validator::new().validate(&def, &CatalogLimits::default());
        if result.has_errors() {
            return Err(CatalogError::ValidationError {
                path: def.name,
                errors: result.errors,
            });
        }
        Ok(Self::from_validated(def))
    }

    /// Freezes a definition that has already passed validation.
    pub(crate) fn from_validated(def: CatalogDefinition) -> Self {
        let levels: IndexMap<String, PrivilegeLevel> = def
            .levels
            .into_iter()
            .map(|level| (level.name.clone(), level))
            .collect();

        let terminal = levels
            .keys()
            .filter(|name| {
                !def
                    .components
                    .iter()
                    .any(|c| &c.source_privilege == *name)
            })
            .cloned()
            .collect();

        Self {
            name: def.name,
            start_level: def.start_level,
            levels,
            components: def.components,
            terminal,
        }
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The level every chain starts from.
    #[must_use]
    pub fn start_level(&self) -> &str {
        &self.start_level
    }

    /// Declared levels in declaration order.
    #[must_use]
    pub fn levels(&self) -> Vec<&PrivilegeLevel> {
        self.levels.values().collect()
    }

    /// Looks up a declared level by name.
    #[must_use]
    pub fn level(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// Returns `true` if `name` is a declared level.
    #[must_use]
    pub fn is_known_level(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    /// All components in catalog order.
    #[must_use]
    pub fn components(&self) -> &[TargetComponent] {
        &self.components
    }

    /// Looks up a component by id.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&TargetComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Components reachable from `level`, in catalog order.
    ///
    /// A level that is not declared in the catalog yields an empty list
    /// rather than an error.
    #[must_use]
    pub fn components_by_source_level(&self, level: &str) -> Vec<&TargetComponent> {
        if !self.is_known_level(level) {
            return Vec::new();
        }
        self.components
            .iter()
            .filter(|c| c.source_privilege == level)
            .collect()
    }

    /// Finds a technique by its owning component and technique id.
    #[must_use]
    pub fn lookup_technique(
        &self,
        component_id: &str,
        technique_id: &str,
    ) -> Option<&ExploitationTechnique> {
        self.component(component_id)?
            .techniques
            .iter()
            .find(|t| t.id == technique_id)
    }

    /// Builds the attack vector for `(component_id, technique_id)`.
    #[must_use]
    pub fn vector(&self, component_id: &str, technique_id: &str) -> Option<AttackVector> {
        let component = self.component(component_id)?;
        let technique = component.techniques.iter().find(|t| t.id == technique_id)?;
        Some(AttackVector::new(component, technique))
    }

    /// Levels with no outgoing components.
    #[must_use]
    pub const fn terminal_levels(&self) -> &IndexSet<String> {
        &self.terminal
    }

    /// Returns `true` if `level` has no outgoing components.
    #[must_use]
    pub fn is_terminal(&self, level: &str) -> bool {
        self.terminal.contains(level)
    }

    /// Total number of techniques across all components.
    #[must_use]
    pub fn technique_count(&self) -> usize {
        self.components.iter().map(|c| c.techniques.len()).sum()
    }

    /// Suggests the closest component id for typo correction.
    ///
    /// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
    #[must_use]
    pub fn suggest_component(&self, input: &str) -> Option<String> {
        suggest(input, self.components.iter().map(|c| c.id.as_str()))
    }

    /// Suggests the closest technique id within a component.
    #[must_use]
    pub fn suggest_technique(&self, component_id: &str, input: &str) -> Option<String> {
        let component = self.component(component_id)?;
        suggest(input, component.techniques.iter().map(|t| t.id.as_str()))
    }
}

fn suggest<'a>(input: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    candidates
        .map(|c| (c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c.to_string())
}
