//! Rendered-snapshot export (`attack-chain.png`).
//!
//! Rasterization is not done here. The chain is laid out into a
//! [`SnapshotScene`] and handed to an external [`RenderTarget`]; when no
//! target exists the export is skipped.

use privchain_core::chain::ChainSnapshot;
use privchain_core::layout::{EdgeKind, LayoutEngine, LayoutGraph, LayoutNode, NodeId, Point};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExportError;
use crate::label::{short_label, visited_levels};

/// A laid-out node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Node id
    pub id: String,
    /// Display label
    pub label: String,
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

/// A routed, labelled edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    /// Source node id
    pub from: String,
    /// Destination node id
    pub to: String,
    /// Short technique label
    pub label: String,
    /// Polyline from source center to destination center
    pub points: Vec<Point>,
}

/// Everything a rasterizer needs to draw the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotScene {
    /// Level nodes in visitation order
    pub nodes: Vec<SceneNode>,
    /// One edge per chain step
    pub edges: Vec<SceneEdge>,
    /// Bounding box width
    pub width: f64,
    /// Bounding box height
    pub height: f64,
}

impl SnapshotScene {
    /// Lays out the chain of `snapshot` with `engine`.
    #[must_use]
    pub fn build(snapshot: &ChainSnapshot, engine: &dyn LayoutEngine) -> Self {
        let mut graph = LayoutGraph::new();
        for level in visited_levels(&snapshot.chain) {
            graph.add_node(
                NodeId::level(level),
                LayoutNode::Level {
                    name: level.to_string(),
                },
            );
        }
        for vector in &snapshot.chain {
            graph.add_edge(
                NodeId::level(&vector.source_privilege),
                NodeId::level(&vector.target_privilege),
                EdgeKind::Escalation,
                Some(short_label(&vector.name).to_string()),
            );
        }

        let layout = engine.layout(&graph);

        let nodes = layout
            .nodes
            .iter()
            .map(|(id, pos)| SceneNode {
                id: id.to_string(),
                label: graph.node(id).map_or_else(String::new, |n| n.label().to_string()),
                x: pos.x,
                y: pos.y,
                width: pos.width,
                height: pos.height,
            })
            .collect();

        let edges = layout
            .edges
            .into_iter()
            .map(|route| SceneEdge {
                from: route.from.to_string(),
                to: route.to.to_string(),
                label: route.label.unwrap_or_default(),
                points: route.points,
            })
            .collect();

        Self {
            nodes,
            edges,
            width: layout.width,
            height: layout.height,
        }
    }
}

/// An external rasterizer.
pub trait RenderTarget {
    /// Draws `scene` and returns the encoded image.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Render` if drawing fails.
    fn rasterize(&self, scene: &SnapshotScene) -> Result<Vec<u8>, ExportError>;
}

/// Renders the snapshot through `target`.
///
/// Returns `Ok(None)` when there is no render target; this is not an error
/// and leaves the other formats unaffected.
///
/// # Errors
///
/// Returns the target's error if rasterization fails.
pub fn export_snapshot(
    snapshot: &ChainSnapshot,
    target: Option<&dyn RenderTarget>,
    engine: &dyn LayoutEngine,
) -> Result<Option<Vec<u8>>, ExportError> {
    let Some(target) = target else {
        debug!("no render target; skipping snapshot export");
        return Ok(None);
    };

    let scene = SnapshotScene::build(snapshot, engine);
    debug!(
        nodes = scene.nodes.len(),
        edges = scene.edges.len(),
        "rasterizing snapshot"
    );
    target.rasterize(&scene).map(Some)
}
