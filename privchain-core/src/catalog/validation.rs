//! Catalog validation
//!
//! Structural and semantic checks run on a deserialized
//! [`CatalogDefinition`] before it is frozen into a [`Catalog`].
//!
//! Validation collects ALL issues (doesn't stop at first) so a catalog
//! author sees every problem in one pass.
//!
//! [`Catalog`]: super::Catalog

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::loader::CatalogLimits;
use crate::catalog::schema::{CatalogDefinition, TargetComponent};
use crate::error::{Severity, ValidationIssue};

static CVE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CVE-\d{4}-\d{4,}$").expect("valid regex"));

/// Component and technique ids. `/` is excluded because it joins the two
/// in node ids and `--step` references.
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

// ============================================================================
// Public API
// ============================================================================

/// Result of catalog validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Catalog validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a catalog definition and returns every issue found.
    pub fn validate(
        &mut self,
        def: &CatalogDefinition,
        limits: &CatalogLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        if def.name.trim().is_empty() {
            self.add_error("name", "Catalog name is required and cannot be empty");
        }

        let declared = self.validate_levels(def);
        self.validate_components(def, &declared);
        self.validate_graph(def, &declared);
        self.validate_limits(def, limits);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Levels
    // ========================================================================

    /// Checks level declarations and returns the set of declared names.
    fn validate_levels<'a>(&mut self, def: &'a CatalogDefinition) -> HashSet<&'a str> {
        let mut declared = HashSet::new();

        for (i, level) in def.levels.iter().enumerate() {
            let path = format!("levels[{i}].name");
            if level.name.trim().is_empty() {
                self.add_error(&path, "Level name cannot be empty");
                continue;
            }
            if !declared.insert(level.name.as_str()) {
                self.add_error(&path, &format!("Duplicate level name '{}'", level.name));
            }
        }

        if def.start_level.trim().is_empty() {
            self.add_error("start_level", "Start level is required");
        } else if !declared.contains(def.start_level.as_str()) {
            self.add_error(
                "start_level",
                &format!("Start level '{}' is not a declared level", def.start_level),
            );
        }

        declared
    }

    // ========================================================================
    // Components
    // ========================================================================

    fn validate_components(&mut self, def: &CatalogDefinition, declared: &HashSet<&str>) {
        let mut component_ids = HashSet::new();

        for (i, component) in def.components.iter().enumerate() {
            let base = format!("components[{i}]");

            if component.id.trim().is_empty() {
                self.add_error(&format!("{base}.id"), "Component id cannot be empty");
            } else if !ID_RE.is_match(&component.id) {
                self.add_invalid_id(&format!("{base}.id"), "Component", &component.id);
            } else if !component_ids.insert(component.id.as_str()) {
                self.add_error(
                    &format!("{base}.id"),
                    &format!("Duplicate component id '{}'", component.id),
                );
            }

            if component.source_privilege == component.target_privilege {
                self.add_error(
                    &base,
                    &format!(
                        "Component '{}' escalates from '{}' to itself",
                        component.id, component.source_privilege
                    ),
                );
            }

            for (field, level) in [
                ("source_privilege", &component.source_privilege),
                ("target_privilege", &component.target_privilege),
            ] {
                if !declared.contains(level.as_str()) {
                    self.add_error(
                        &format!("{base}.{field}"),
                        &format!("Undeclared privilege level '{level}'"),
                    );
                }
            }

            self.validate_techniques(component, &base);
        }
    }

    fn validate_techniques(&mut self, component: &TargetComponent, base: &str) {
        if component.techniques.is_empty() {
            self.add_error(
                &format!("{base}.techniques"),
                &format!("Component '{}' offers no techniques", component.id),
            );
            return;
        }

        let mut technique_ids = HashSet::new();
        for (j, technique) in component.techniques.iter().enumerate() {
            let path = format!("{base}.techniques[{j}]");

            if technique.id.trim().is_empty() {
                self.add_error(&format!("{path}.id"), "Technique id cannot be empty");
            } else if !ID_RE.is_match(&technique.id) {
                self.add_invalid_id(&format!("{path}.id"), "Technique", &technique.id);
            } else if !technique_ids.insert(technique.id.as_str()) {
                self.add_error(
                    &format!("{path}.id"),
                    &format!(
                        "Duplicate technique '{}' in component '{}'",
                        technique.id, component.id
                    ),
                );
            }

            for (k, cve) in technique.cves.iter().enumerate() {
                if !CVE_ID_RE.is_match(cve) {
                    self.add_warning(
                        &format!("{path}.cves[{k}]"),
                        &format!("'{cve}' is not a CVE-YYYY-NNNN identifier"),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Graph Shape
    // ========================================================================

    /// Warns about levels that can never take part in a chain.
    fn validate_graph(&mut self, def: &CatalogDefinition, declared: &HashSet<&str>) {
        let referenced: HashSet<&str> = def
            .components
            .iter()
            .flat_map(|c| [c.source_privilege.as_str(), c.target_privilege.as_str()])
            .collect();

        for (i, level) in def.levels.iter().enumerate() {
            if !referenced.contains(level.name.as_str()) && level.name != def.start_level {
                self.add_warning(
                    &format!("levels[{i}]"),
                    &format!("Level '{}' is not referenced by any component", level.name),
                );
            }
        }

        if !declared.contains(def.start_level.as_str()) {
            return;
        }

        if !def
            .components
            .iter()
            .any(|c| c.source_privilege == def.start_level)
        {
            self.add_warning(
                "start_level",
                &format!("No component starts from '{}'", def.start_level),
            );
        }

        let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
        for component in &def.components {
            outgoing
                .entry(component.source_privilege.as_str())
                .or_default()
                .push(component.target_privilege.as_str());
        }

        let mut reachable = HashSet::from([def.start_level.as_str()]);
        let mut queue = VecDeque::from([def.start_level.as_str()]);
        while let Some(level) = queue.pop_front() {
            for &next in outgoing.get(level).into_iter().flatten() {
                if reachable.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        for (i, level) in def.levels.iter().enumerate() {
            if referenced.contains(level.name.as_str()) && !reachable.contains(level.name.as_str())
            {
                self.add_warning(
                    &format!("levels[{i}]"),
                    &format!(
                        "Level '{}' is unreachable from '{}'",
                        level.name, def.start_level
                    ),
                );
            }
        }
    }

    // ========================================================================
    // Limits
    // ========================================================================

    fn validate_limits(&mut self, def: &CatalogDefinition, limits: &CatalogLimits) {
        if def.levels.len() > limits.max_levels {
            self.add_error(
                "levels",
                &format!(
                    "Too many levels: {} (max {})",
                    def.levels.len(),
                    limits.max_levels
                ),
            );
        }

        if def.components.len() > limits.max_components {
            self.add_error(
                "components",
                &format!(
                    "Too many components: {} (max {})",
                    def.components.len(),
                    limits.max_components
                ),
            );
        }

        for (i, component) in def.components.iter().enumerate() {
            if component.techniques.len() > limits.max_techniques_per_component {
                self.add_error(
                    &format!("components[{i}].techniques"),
                    &format!(
                        "Too many techniques: {} (max {})",
                        component.techniques.len(),
                        limits.max_techniques_per_component
                    ),
                );
            }
        }
    }

    fn add_invalid_id(&mut self, path: &str, kind: &str, id: &str) {
        self.add_error(
            path,
            &format!("{kind} id '{id}' may only contain letters, digits, '-' and '_'"),
        );
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> CatalogDefinition {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn validate(yaml: &str) -> ValidationResult {
        Validator::new().validate(&parse(yaml), &CatalogLimits::default())
    }

    const VALID: &str = r"
name: fixture
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
  - name: Root
components:
  - id: A
    name: Component A
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: T1
        name: Technique One
        cves: [CVE-2023-2033]
  - id: B
    name: Component B
    source_privilege: Mid
    target_privilege: Root
    techniques:
      - id: T2
        name: Technique Two
";

    #[test]
    fn test_valid_catalog() {
        let result = validate(VALID);
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_self_loop_component_rejected() {
        let result = validate(
            r"
name: loop
start_level: Sandbox
levels:
  - name: Sandbox
components:
  - id: A
    name: A
    source_privilege: Sandbox
    target_privilege: Sandbox
    techniques:
      - id: T1
        name: T1
",
        );
        assert!(result.has_errors());
        assert!(result.errors.iter().any(|e| e.message.contains("to itself")));
    }

    #[test]
    fn test_undeclared_levels_rejected() {
        let result = validate(
            r"
name: undeclared
start_level: Nowhere
levels:
  - name: Sandbox
components:
  - id: A
    name: A
    source_privilege: Sandbox
    target_privilege: Kernel
    techniques:
      - id: T1
        name: T1
",
        );
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"start_level"));
        assert!(paths.contains(&"components[0].target_privilege"));
    }

    #[test]
    fn test_duplicate_component_and_technique_ids() {
        let result = validate(
            r"
name: dupes
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
components:
  - id: A
    name: A
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: T1
        name: T1
      - id: T1
        name: T1 again
  - id: A
    name: A again
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: T2
        name: T2
",
        );
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.path == "components[0].techniques[1].id")
        );
        assert!(result.errors.iter().any(|e| e.path == "components[1].id"));
    }

    #[test]
    fn test_ids_with_separator_rejected() {
        let result = validate(
            r"
name: slashes
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
components:
  - id: a
    name: A
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: b/c
        name: BC
  - id: a/b
    name: AB
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: c
        name: C
      - id: has space
        name: Spaced
",
        );
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "components[0].techniques[0].id",
                "components[1].id",
                "components[1].techniques[1].id",
            ]
        );
        assert!(result.errors[1].message.contains("'a/b'"));
    }

    #[test]
    fn test_component_without_techniques() {
        let result = validate(
            r"
name: empty
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
components:
  - id: A
    name: A
    source_privilege: Sandbox
    target_privilege: Mid
",
        );
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.path == "components[0].techniques")
        );
    }

    #[test]
    fn test_malformed_cve_is_warning() {
        let yaml = VALID.replace("CVE-2023-2033", "CVE-23-1");
        let result = validate(&yaml);
        assert!(result.is_valid());
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.path == "components[0].techniques[0].cves[0]")
        );
    }

    #[test]
    fn test_unreferenced_and_unreachable_levels_warn() {
        let result = validate(
            r"
name: islands
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
  - name: Orphan
  - name: IslandA
  - name: IslandB
components:
  - id: A
    name: A
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: T1
        name: T1
  - id: I
    name: I
    source_privilege: IslandA
    target_privilege: IslandB
    techniques:
      - id: T1
        name: T1
",
        );
        assert!(result.is_valid());
        let messages: Vec<&str> = result.warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("'Orphan' is not referenced")));
        assert!(messages.iter().any(|m| m.contains("'IslandA' is unreachable")));
        assert!(messages.iter().any(|m| m.contains("'IslandB' is unreachable")));
    }

    #[test]
    fn test_limits_enforced() {
        let limits = CatalogLimits {
            max_components: 1,
            ..CatalogLimits::default()
        };
        let result = Validator::new().validate(&parse(VALID), &limits);
        assert!(result.errors.iter().any(|e| e.path == "components"));
    }

    #[test]
    fn test_validator_is_reusable() {
        let mut validator = Validator::new();
        let bad = parse(&VALID.replace("start_level: Sandbox", "start_level: Missing"));
        assert!(
            validator
                .validate(&bad, &CatalogLimits::default())
                .has_errors()
        );
        assert!(
            validator
                .validate(&parse(VALID), &CatalogLimits::default())
                .is_valid()
        );
    }
}
