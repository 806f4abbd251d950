//! Layered (Sugiyama-style) top-to-bottom layout.
//!
//! Phases:
//! 1. Cycle breaking: back edges found by a DFS in node order are ignored
//!    for ranking and ordering.
//! 2. Ranking: sources get rank 0, every other node gets
//!    `1 + max(rank of predecessors)`.
//! 3. Normalization: edges spanning several ranks are split with virtual
//!    nodes so every segment joins adjacent ranks.
//! 4. Ordering: alternating down/up barycenter sweeps; the ordering with
//!    the fewest crossings wins (first one on ties).
//! 5. Placement: each rank is packed left to right and centered on the
//!    widest rank; `y` comes from the rank and the rank separation.
//!
//! Every step iterates in insertion order and breaks ties by position, so
//! identical input always yields identical output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::graph::LayoutGraph;
use super::{EdgeRoute, GraphLayout, LayoutEngine, NodePosition, Point};

/// Separation constants and sweep budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Width of every real node.
    pub node_width: f64,
    /// Height of every real node.
    pub node_height: f64,
    /// Horizontal gap between neighbours in a rank.
    pub node_sep: f64,
    /// Vertical gap between ranks.
    pub rank_sep: f64,
    /// Number of barycenter sweeps.
    pub sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 172.0,
            node_height: 36.0,
            node_sep: 50.0,
            rank_sep: 80.0,
            sweeps: 8,
        }
    }
}

/// The default [`LayoutEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayeredLayout {
    config: LayoutConfig,
}

impl LayeredLayout {
    /// Creates a layout engine with the given constants.
    #[must_use]
    pub const fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The constants in use.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, graph: &LayoutGraph) -> GraphLayout {
        let prepared = Prepared::new(graph);
        let ranks = prepared.ranks();
        let mut layered = Layered::new(&prepared, &ranks);
        layered.order(self.config.sweeps);
        layered.place(&prepared, graph, &self.config)
    }
}

// ============================================================================
// Phase 1-2: indexing, cycle breaking, ranking
// ============================================================================

/// A graph edge by node index.
#[derive(Debug, Clone, Copy)]
struct IndexedEdge {
    /// Index into `LayoutGraph::edges`
    edge: usize,
    from: usize,
    to: usize,
    back: bool,
}

struct Prepared {
    node_count: usize,
    edges: Vec<IndexedEdge>,
}

impl Prepared {
    fn new(graph: &LayoutGraph) -> Self {
        let nodes = graph.nodes();
        let node_count = nodes.len();

        let mut edges: Vec<IndexedEdge> = graph
            .edges()
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                let from = nodes.get_index_of(&e.from)?;
                let to = nodes.get_index_of(&e.to)?;
                (from != to).then_some(IndexedEdge {
                    edge: i,
                    from,
                    to,
                    back: false,
                })
            })
            .collect();

        mark_back_edges(node_count, &mut edges);
        Self { node_count, edges }
    }

    fn forward_edges(&self) -> impl Iterator<Item = &IndexedEdge> {
        self.edges.iter().filter(|e| !e.back)
    }

    /// Longest-path ranking over the acyclic (forward) edges.
    fn ranks(&self) -> Vec<usize> {
        let mut indegree = vec![0usize; self.node_count];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); self.node_count];
        for e in self.forward_edges() {
            indegree[e.to] += 1;
            successors[e.from].push(e.to);
        }

        let mut rank = vec![0usize; self.node_count];
        let mut ready: std::collections::VecDeque<usize> =
            (0..self.node_count).filter(|&n| indegree[n] == 0).collect();

        while let Some(n) = ready.pop_front() {
            for &s in &successors[n] {
                rank[s] = rank[s].max(rank[n] + 1);
                indegree[s] -= 1;
                if indegree[s] == 0 {
                    ready.push_back(s);
                }
            }
        }

        rank
    }
}

/// Marks edges that close a cycle, using an iterative DFS started from
/// every unvisited node in index order.
fn mark_back_edges(node_count: usize, edges: &mut [IndexedEdge]) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (i, e) in edges.iter().enumerate() {
        outgoing[e.from].push(i);
    }

    let mut mark = vec![Mark::Unvisited; node_count];
    for root in 0..node_count {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        // (node, next outgoing edge cursor)
        let mut stack = vec![(root, 0usize)];
        mark[root] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            if let Some(&edge_index) = outgoing[node].get(top.1) {
                top.1 += 1;
                let to = edges[edge_index].to;
                match mark[to] {
                    Mark::OnStack => edges[edge_index].back = true,
                    Mark::Unvisited => {
                        mark[to] = Mark::OnStack;
                        stack.push((to, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                mark[node] = Mark::Done;
                stack.pop();
            }
        }
    }
}

// ============================================================================
// Phase 3-4: virtual nodes and crossing minimization
// ============================================================================

struct Layered {
    /// Node index → rank, for real and virtual nodes
    rank: Vec<usize>,
    /// Per rank, node indices in current order
    layers: Vec<Vec<usize>>,
    /// Neighbours in the rank above
    upper: Vec<Vec<usize>>,
    /// Neighbours in the rank below
    lower: Vec<Vec<usize>>,
    /// Per forward edge (by `IndexedEdge::edge`): virtual nodes along it
    chains: IndexMap<usize, Vec<usize>>,
    real_count: usize,
}

impl Layered {
    fn new(prepared: &Prepared, ranks: &[usize]) -> Self {
        let real_count = prepared.node_count;
        let mut rank = ranks.to_vec();
        let mut upper: Vec<Vec<usize>> = vec![Vec::new(); real_count];
        let mut lower: Vec<Vec<usize>> = vec![Vec::new(); real_count];
        let mut chains = IndexMap::new();

        for e in prepared.forward_edges() {
            let mut prev = e.from;
            let mut virtuals = Vec::new();
            for r in (ranks[e.from] + 1)..ranks[e.to] {
                let v = rank.len();
                rank.push(r);
                upper.push(Vec::new());
                lower.push(Vec::new());
                lower[prev].push(v);
                upper[v].push(prev);
                virtuals.push(v);
                prev = v;
            }
            lower[prev].push(e.to);
            upper[e.to].push(prev);
            chains.insert(e.edge, virtuals);
        }

        let depth = rank.iter().copied().max().map_or(0, |r| r + 1);
        let mut layers = vec![Vec::new(); depth];
        for (node, &r) in rank.iter().enumerate() {
            layers[r].push(node);
        }

        Self {
            rank,
            layers,
            upper,
            lower,
            chains,
            real_count,
        }
    }

    fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.rank.len()];
        for layer in &self.layers {
            for (i, &n) in layer.iter().enumerate() {
                pos[n] = i;
            }
        }
        pos
    }

    /// Runs `sweeps` alternating barycenter passes, keeping the best ordering.
    fn order(&mut self, sweeps: usize) {
        let mut best = self.layers.clone();
        let mut best_crossings = self.crossings();

        for sweep in 0..sweeps {
            if best_crossings == 0 {
                break;
            }
            if sweep % 2 == 0 {
                for r in 1..self.layers.len() {
                    self.reorder(r, true);
                }
            } else {
                for r in (0..self.layers.len().saturating_sub(1)).rev() {
                    self.reorder(r, false);
                }
            }

            let crossings = self.crossings();
            if crossings < best_crossings {
                best_crossings = crossings;
                best.clone_from(&self.layers);
            }
        }

        self.layers = best;
    }

    /// Sorts rank `r` by the barycenter of its neighbours in the adjacent rank.
    /// Nodes with no such neighbours keep their current position as key.
    fn reorder(&mut self, r: usize, use_upper: bool) {
        let pos = self.positions();
        let neighbours = if use_upper { &self.upper } else { &self.lower };

        let mut keyed: Vec<(f64, usize, usize)> = self.layers[r]
            .iter()
            .map(|&n| {
                let adjacent = &neighbours[n];
                #[allow(clippy::cast_precision_loss)]
                let key = if adjacent.is_empty() {
                    pos[n] as f64
                } else {
                    adjacent.iter().map(|&m| pos[m] as f64).sum::<f64>() / adjacent.len() as f64
                };
                (key, pos[n], n)
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        self.layers[r] = keyed.into_iter().map(|(_, _, n)| n).collect();
    }

    /// Total crossings between every pair of adjacent ranks.
    fn crossings(&self) -> usize {
        let pos = self.positions();
        let mut total = 0;

        for layer in self.layers.iter().take(self.layers.len().saturating_sub(1)) {
            let segments: Vec<(usize, usize)> = layer
                .iter()
                .flat_map(|&u| self.lower[u].iter().map(move |&v| (u, v)))
                .map(|(u, v)| (pos[u], pos[v]))
                .collect();

            for (i, a) in segments.iter().enumerate() {
                for b in &segments[i + 1..] {
                    if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                        total += 1;
                    }
                }
            }
        }

        total
    }

    // ========================================================================
    // Phase 5: coordinates
    // ========================================================================

    #[allow(clippy::cast_precision_loss)]
    fn place(&self, prepared: &Prepared, graph: &LayoutGraph, config: &LayoutConfig) -> GraphLayout {
        let width_of = |n: usize| {
            if n < self.real_count {
                config.node_width
            } else {
                0.0
            }
        };

        let layer_width = |layer: &[usize]| {
            let nodes: f64 = layer.iter().map(|&n| width_of(n)).sum();
            nodes + config.node_sep * layer.len().saturating_sub(1) as f64
        };

        let total_width = self
            .layers
            .iter()
            .map(|l| layer_width(l))
            .fold(0.0_f64, f64::max);

        let mut centers = vec![Point { x: 0.0, y: 0.0 }; self.rank.len()];
        for (r, layer) in self.layers.iter().enumerate() {
            let mut x = (total_width - layer_width(layer)) / 2.0;
            let y = (r as f64).mul_add(config.node_height + config.rank_sep, config.node_height / 2.0);
            for &n in layer {
                let w = width_of(n);
                centers[n] = Point { x: x + w / 2.0, y };
                x += w + config.node_sep;
            }
        }

        let pos = self.positions();
        let nodes = graph
            .nodes()
            .keys()
            .enumerate()
            .map(|(n, id)| {
                (
                    id.clone(),
                    NodePosition {
                        x: centers[n].x,
                        y: centers[n].y,
                        width: config.node_width,
                        height: config.node_height,
                        rank: self.rank[n],
                        order: pos[n],
                    },
                )
            })
            .collect();

        let edges = prepared
            .edges
            .iter()
            .map(|e| {
                let source = &graph.edges()[e.edge];
                let mut points = vec![centers[e.from]];
                if let Some(virtuals) = self.chains.get(&e.edge) {
                    points.extend(virtuals.iter().map(|&v| centers[v]));
                }
                points.push(centers[e.to]);
                EdgeRoute {
                    from: source.from.clone(),
                    to: source.to.clone(),
                    kind: source.kind,
                    label: source.label.clone(),
                    reversed: e.back,
                    points,
                }
            })
            .collect();

        let height = if self.layers.is_empty() {
            0.0
        } else {
            (self.layers.len() as f64).mul_add(config.node_height, config.rank_sep * (self.layers.len() - 1) as f64)
        };

        GraphLayout {
            nodes,
            edges,
            width: total_width,
            height,
        }
    }
}
