//! Hierarchical layout of the catalog graph.
//!
//! Layout sits behind the [`LayoutEngine`] trait: input is an abstract
//! [`LayoutGraph`], output is a [`GraphLayout`] coordinate map. Nothing
//! here knows about rendering, so layout is testable on its own.
//!
//! [`CatalogLayout`] memoizes the full catalog tree for one
//! `Arc<Catalog>`; the catalog never changes after load, so the memo
//! never needs invalidating.

pub mod graph;
pub mod layered;

pub use graph::{EdgeKind, LayoutEdge, LayoutGraph, LayoutNode, NodeId};
pub use layered::{LayeredLayout, LayoutConfig};

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;

/// Computes node coordinates for a graph.
///
/// Implementations must be pure: identical input yields identical output.
pub trait LayoutEngine {
    /// Lays out `graph`.
    fn layout(&self, graph: &LayoutGraph) -> GraphLayout;
}

/// A 2-D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing rightwards
    pub x: f64,
    /// Vertical coordinate, growing downwards
    pub y: f64,
}

/// Placement of one node. `x`/`y` are the node's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
    /// Rank (0 = top)
    pub rank: usize,
    /// Position within the rank (0 = leftmost)
    pub order: usize,
}

/// Polyline for one edge, from source center through any bend points to
/// target center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRoute {
    /// Source node
    pub from: NodeId,
    /// Destination node
    pub to: NodeId,
    /// Edge kind
    pub kind: EdgeKind,
    /// Edge label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// `true` if the edge closes a cycle and points upwards
    #[serde(default)]
    pub reversed: bool,
    /// Polyline points
    pub points: Vec<Point>,
}

/// Coordinate map produced by a [`LayoutEngine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    /// Node positions in graph insertion order
    pub nodes: IndexMap<NodeId, NodePosition>,
    /// Edge routes in graph insertion order (self-loops and dangling edges dropped)
    pub edges: Vec<EdgeRoute>,
    /// Bounding box width
    pub width: f64,
    /// Bounding box height
    pub height: f64,
}

/// Catalog graph together with its layout: everything a tree view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTree {
    /// Nodes and edges
    pub graph: LayoutGraph,
    /// Coordinates
    pub layout: GraphLayout,
}

/// Memoized layout of the full catalog tree for one catalog instance.
#[derive(Debug)]
pub struct CatalogLayout<E = LayeredLayout> {
    catalog: Arc<Catalog>,
    engine: E,
    tree: OnceLock<Arc<CatalogTree>>,
}

impl<E: LayoutEngine> CatalogLayout<E> {
    /// Binds a layout engine to a catalog. Nothing is computed until
    /// [`Self::tree`] is first called.
    pub const fn new(catalog: Arc<Catalog>, engine: E) -> Self {
        Self {
            catalog,
            engine,
            tree: OnceLock::new(),
        }
    }

    /// The laid-out catalog tree, computed on first use.
    pub fn tree(&self) -> Arc<CatalogTree> {
        Arc::clone(self.tree.get_or_init(|| {
            let graph = LayoutGraph::from_catalog(&self.catalog);
            let layout = self.engine.layout(&graph);
            debug!(
                catalog = %self.catalog.name(),
                nodes = layout.nodes.len(),
                edges = layout.edges.len(),
                width = layout.width,
                height = layout.height,
                "catalog layout computed"
            );
            Arc::new(CatalogTree { graph, layout })
        }))
    }

    /// Returns `true` if this memo was built for `catalog` (by identity).
    #[must_use]
    pub fn is_for(&self, catalog: &Arc<Catalog>) -> bool {
        Arc::ptr_eq(&self.catalog, catalog)
    }
}
