//! Catalog document schema
//!
//! Types deserialized from catalog YAML documents. Field names are
//! `snake_case` on the wire; `camelCase` aliases are accepted so catalogs
//! exported by other tooling load unchanged.

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Document
// ============================================================================

/// Root of a catalog document, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogDefinition {
    /// Catalog name (required)
    pub name: String,

    /// Level every chain starts from
    #[serde(alias = "startLevel")]
    pub start_level: String,

    /// Declared privilege levels, in display order
    #[serde(default)]
    pub levels: Vec<PrivilegeLevel>,

    /// Attackable components, in catalog order
    #[serde(default)]
    pub components: Vec<TargetComponent>,
}

// ============================================================================
// Levels
// ============================================================================

/// A named capability tier in the escalation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PrivilegeLevel {
    /// Unique level name (e.g. "Sandbox")
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// What code running at this level can do
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,

    /// What code running at this level cannot do
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<String>,

    /// Illustrative real-world examples
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

// ============================================================================
// Components and Techniques
// ============================================================================

/// An attackable surface leading from one privilege level to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TargetComponent {
    /// Unique component id
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Level the attacker must hold to reach this component
    #[serde(alias = "sourcePrivilege")]
    pub source_privilege: String,

    /// Level gained by exploiting this component
    #[serde(alias = "targetPrivilege")]
    pub target_privilege: String,

    /// Techniques offered by this component, in display order
    #[serde(default)]
    pub techniques: Vec<ExploitationTechnique>,
}

/// A specific exploitation method with its CVE/PoC/mitigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExploitationTechnique {
    /// Technique id, unique within its component
    pub id: String,

    /// Display name
    pub name: String,

    /// One-line description
    #[serde(default)]
    pub description: String,

    /// Long description
    #[serde(default, alias = "longDescription", alias = "long_description")]
    pub details: String,

    /// CVE identifiers demonstrating the technique
    #[serde(default)]
    pub cves: Vec<String>,

    /// Proof-of-concept reference URLs
    #[serde(default)]
    pub pocs: Vec<String>,

    /// Mitigations that break the technique
    #[serde(default)]
    pub mitigations: Vec<String>,

    /// Further reading
    #[serde(default)]
    pub references: Vec<String>,
}

// ============================================================================
// Attack Vectors
// ============================================================================

/// One technique applied through one component.
///
/// Derived on demand from the catalog and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackVector {
    /// `component.id + technique.id`
    pub id: String,
    /// `"{component.name}: {technique.name}"`
    pub name: String,
    /// Owning component id
    pub component_id: String,
    /// Applied technique id
    pub technique_id: String,
    /// Technique one-line description
    pub description: String,
    /// Technique long description
    pub details: String,
    /// Technique CVE identifiers
    pub cves: Vec<String>,
    /// Technique proof-of-concept URLs
    pub pocs: Vec<String>,
    /// Technique mitigations
    pub mitigations: Vec<String>,
    /// Technique references
    pub references: Vec<String>,
    /// Component source privilege
    pub source_privilege: String,
    /// Component target privilege
    pub target_privilege: String,
}

impl AttackVector {
    /// Instantiates `technique` as applied through `component`.
    #[must_use]
    pub fn new(component: &TargetComponent, technique: &ExploitationTechnique) -> Self {
        Self {
            id: format!("{}{}", component.id, technique.id),
            name: format!("{}: {}", component.name, technique.name),
            component_id: component.id.clone(),
            technique_id: technique.id.clone(),
            description: technique.description.clone(),
            details: technique.details.clone(),
            cves: technique.cves.clone(),
            pocs: technique.pocs.clone(),
            mitigations: technique.mitigations.clone(),
            references: technique.references.clone(),
            source_privilege: component.source_privilege.clone(),
            target_privilege: component.target_privilege.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_aliases() {
        let yaml = r"
name: aliases
startLevel: Sandbox
levels:
  - name: Sandbox
  - name: Renderer
components:
  - id: v8
    name: V8
    sourcePrivilege: Sandbox
    targetPrivilege: Renderer
    techniques:
      - id: jit
        name: JIT Bug
        longDescription: long text
";
        let def: CatalogDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.start_level, "Sandbox");
        assert_eq!(def.components[0].source_privilege, "Sandbox");
        assert_eq!(def.components[0].techniques[0].details, "long text");
    }

    #[test]
    fn test_attack_vector_derivation() {
        let technique = ExploitationTechnique {
            id: "T1".to_string(),
            name: "Type Confusion".to_string(),
            description: "short".to_string(),
            details: "long".to_string(),
            cves: vec!["CVE-2023-2033".to_string()],
            pocs: vec![],
            mitigations: vec!["V8 sandbox".to_string()],
            references: vec![],
        };
        let component = TargetComponent {
            id: "A".to_string(),
            name: "JS Engine".to_string(),
            description: String::new(),
            source_privilege: "Sandbox".to_string(),
            target_privilege: "Mid".to_string(),
            techniques: vec![technique.clone()],
        };

        let vector = AttackVector::new(&component, &technique);
        assert_eq!(vector.id, "AT1");
        assert_eq!(vector.name, "JS Engine: Type Confusion");
        assert_eq!(vector.source_privilege, "Sandbox");
        assert_eq!(vector.target_privilege, "Mid");
        assert_eq!(vector.cves, technique.cves);
        assert_eq!(vector.mitigations, technique.mitigations);
    }

    #[test]
    fn test_attack_vector_serializes_camel_case() {
        let technique = ExploitationTechnique {
            id: "t".to_string(),
            name: "T".to_string(),
            description: String::new(),
            details: String::new(),
            cves: vec![],
            pocs: vec![],
            mitigations: vec![],
            references: vec![],
        };
        let component = TargetComponent {
            id: "c".to_string(),
            name: "C".to_string(),
            description: String::new(),
            source_privilege: "A".to_string(),
            target_privilege: "B".to_string(),
            techniques: vec![],
        };
        let json = serde_json::to_value(AttackVector::new(&component, &technique)).unwrap();
        assert_eq!(json["sourcePrivilege"], "A");
        assert_eq!(json["targetPrivilege"], "B");
        assert_eq!(json["componentId"], "c");
    }
}
