//! Abstract node/edge graph consumed by layout engines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// Stable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Creates a new `NodeId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Id of the node for a privilege level.
    #[must_use]
    pub fn level(name: &str) -> Self {
        Self(format!("level:{name}"))
    }

    /// Id of the node for a component.
    #[must_use]
    pub fn component(id: &str) -> Self {
        Self(format!("component:{id}"))
    }

    /// Id of the node for a technique within its component.
    #[must_use]
    pub fn technique(component_id: &str, technique_id: &str) -> Self {
        Self(format!("technique:{component_id}/{technique_id}"))
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A diagram node. Each case carries only the fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNode {
    /// A privilege level.
    Level {
        /// Level name
        name: String,
    },
    /// A target component.
    Component {
        /// Component id
        id: String,
        /// Display name
        name: String,
        /// Level the component is attacked from
        source_privilege: String,
        /// Level the component leads to
        target_privilege: String,
    },
    /// A technique offered by a component.
    Technique {
        /// Owning component id
        component_id: String,
        /// Technique id
        technique_id: String,
        /// Display name
        name: String,
        /// Number of CVEs attached to the technique
        cve_count: usize,
    },
}

impl LayoutNode {
    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Level { name } | Self::Component { name, .. } | Self::Technique { name, .. } => {
                name
            }
        }
    }
}

/// Distinguishes catalog structure from escalation edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum EdgeKind {
    /// level → component or component → technique
    Structural,
    /// technique → gained level
    Escalation,
}

/// A directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// Source node
    pub from: NodeId,
    /// Destination node
    pub to: NodeId,
    /// Edge kind
    pub kind: EdgeKind,
    /// Optional edge label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Node set plus edge list. Node insertion order is significant: it is
/// the initial intra-rank order and the tie-breaker everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGraph {
    nodes: IndexMap<NodeId, LayoutNode>,
    edges: Vec<LayoutEdge>,
}

impl LayoutGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node unless one with the same id exists.
    ///
    /// Returns `true` if the node was inserted.
    pub fn add_node(&mut self, id: NodeId, node: LayoutNode) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, node);
        true
    }

    /// Appends an edge. Edges whose endpoints are unknown are ignored by layout.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, label: Option<String>) {
        self.edges.push(LayoutEdge {
            from,
            to,
            kind,
            label,
        });
    }

    /// Nodes in insertion order.
    #[must_use]
    pub const fn nodes(&self) -> &IndexMap<NodeId, LayoutNode> {
        &self.nodes
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    /// Builds the full catalog tree: levels → components → techniques → gained level.
    ///
    /// Only levels referenced by some component become nodes.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut graph = Self::new();

        for component in catalog.components() {
            for level in [&component.source_privilege, &component.target_privilege] {
                graph.add_node(
                    NodeId::level(level),
                    LayoutNode::Level {
                        name: level.clone(),
                    },
                );
            }
        }

        for component in catalog.components() {
            let component_id = NodeId::component(&component.id);
            graph.add_node(
                component_id.clone(),
                LayoutNode::Component {
                    id: component.id.clone(),
                    name: component.name.clone(),
                    source_privilege: component.source_privilege.clone(),
                    target_privilege: component.target_privilege.clone(),
                },
            );
            graph.add_edge(
                NodeId::level(&component.source_privilege),
                component_id.clone(),
                EdgeKind::Structural,
                None,
            );

            for technique in &component.techniques {
                let technique_id = NodeId::technique(&component.id, &technique.id);
                graph.add_node(
                    technique_id.clone(),
                    LayoutNode::Technique {
                        component_id: component.id.clone(),
                        technique_id: technique.id.clone(),
                        name: technique.name.clone(),
                        cve_count: technique.cves.len(),
                    },
                );
                graph.add_edge(
                    component_id.clone(),
                    technique_id.clone(),
                    EdgeKind::Structural,
                    None,
                );
                graph.add_edge(
                    technique_id,
                    NodeId::level(&component.target_privilege),
                    EdgeKind::Escalation,
                    None,
                );
            }
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLoader;

    fn fixture() -> Catalog {
        let yaml = r"
name: fixture
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
  - name: Root
  - name: Unused
components:
  - id: A
    name: Component A
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: T1
        name: Technique One
      - id: T2
        name: Technique Two
  - id: B
    name: Component B
    source_privilege: Mid
    target_privilege: Root
    techniques:
      - id: T3
        name: Technique Three
";
        let result = CatalogLoader::with_defaults().load_from_str(yaml).unwrap();
        (*result.catalog).clone()
    }

    #[test]
    fn test_catalog_graph_node_counts() {
        let graph = LayoutGraph::from_catalog(&fixture());
        let count = |pred: fn(&LayoutNode) -> bool| graph.nodes().values().filter(|n| pred(n)).count();

        assert_eq!(count(|n| matches!(n, LayoutNode::Level { .. })), 3);
        assert_eq!(count(|n| matches!(n, LayoutNode::Component { .. })), 2);
        assert_eq!(count(|n| matches!(n, LayoutNode::Technique { .. })), 3);
        assert!(graph.node(&NodeId::level("Unused")).is_none());
    }

    #[test]
    fn test_catalog_graph_edges() {
        let graph = LayoutGraph::from_catalog(&fixture());
        let structural = graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::Structural)
            .count();
        let escalation: Vec<&LayoutEdge> = graph
            .edges()
            .iter()
            .filter(|e| e.kind == EdgeKind::Escalation)
            .collect();

        // 2 level→component + 3 component→technique
        assert_eq!(structural, 5);
        assert_eq!(escalation.len(), 3);
        assert_eq!(escalation[0].from, NodeId::technique("A", "T1"));
        assert_eq!(escalation[0].to, NodeId::level("Mid"));
    }

    #[test]
    fn test_one_node_per_technique() {
        let catalog = fixture();
        let graph = LayoutGraph::from_catalog(&catalog);
        let techniques = graph
            .nodes()
            .values()
            .filter(|n| matches!(n, LayoutNode::Technique { .. }))
            .count();
        assert_eq!(techniques, catalog.technique_count());

        let builtin = crate::catalog::builtin_catalog().unwrap().catalog;
        let graph = LayoutGraph::from_catalog(&builtin);
        let techniques = graph
            .nodes()
            .values()
            .filter(|n| matches!(n, LayoutNode::Technique { .. }))
            .count();
        assert_eq!(techniques, builtin.technique_count());
    }

    #[test]
    fn test_colliding_technique_ids_do_not_load() {
        let yaml = r"
name: collide
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
";
        let err = CatalogLoader::with_defaults().load_from_str(yaml).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CatalogError::ValidationError { .. }
        ));
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = LayoutGraph::new();
        let id = NodeId::level("Sandbox");
        assert!(graph.add_node(
            id.clone(),
            LayoutNode::Level {
                name: "Sandbox".to_string()
            }
        ));
        assert!(!graph.add_node(
            id,
            LayoutNode::Level {
                name: "Other".to_string()
            }
        ));
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_node_serializes_with_kind_tag() {
        let node = LayoutNode::Component {
            id: "v8".to_string(),
            name: "V8".to_string(),
            source_privilege: "Sandbox".to_string(),
            target_privilege: "Renderer".to_string(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "component");
        assert_eq!(json["source_privilege"], "Sandbox");
        assert_eq!(node.label(), "V8");
    }
}
