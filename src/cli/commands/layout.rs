//! `layout` command
//!
//! Lays out the full catalog tree and prints coordinates.

use std::path::Path;

use privchain_core::layout::{CatalogTree, EdgeKind, LayoutConfig};

use super::load_catalog;
use crate::cli::args::{LayoutArgs, OutputFormat};
use crate::error::PrivChainError;
use crate::session::Session;

/// Print the catalog tree layout.
///
/// # Errors
///
/// Returns a usage error for negative or non-finite separations, or a
/// catalog error if the catalog cannot be loaded.
pub fn run(args: &LayoutArgs, catalog_path: Option<&Path>) -> Result<(), PrivChainError> {
    let config = layout_config(args)?;
    let session = Session::with_layout(load_catalog(catalog_path)?, config);
    let tree = session.catalog_tree();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*tree)?),
        OutputFormat::Human => print!("{}", render_human(&tree, args.edges)),
    }
    Ok(())
}

fn layout_config(args: &LayoutArgs) -> Result<LayoutConfig, PrivChainError> {
    let mut config = LayoutConfig::default();
    for (flag, value, slot) in [
        ("--node-sep", args.node_sep, &mut config.node_sep),
        ("--rank-sep", args.rank_sep, &mut config.rank_sep),
    ] {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(PrivChainError::Usage(format!(
                    "{flag} must be a non-negative number, got {value}"
                )));
            }
            *slot = value;
        }
    }
    Ok(config)
}

fn render_human(tree: &CatalogTree, only: Option<EdgeKind>) -> String {
    let layout = &tree.layout;
    let mut out = format!(
        "{} nodes, {} edges, {:.0} x {:.0}\n",
        layout.nodes.len(),
        layout.edges.len(),
        layout.width,
        layout.height
    );

    let mut by_rank: Vec<_> = layout.nodes.iter().collect();
    by_rank.sort_by_key(|(_, pos)| (pos.rank, pos.order));

    let mut current_rank = None;
    for (id, pos) in by_rank {
        if current_rank != Some(pos.rank) {
            current_rank = Some(pos.rank);
            out.push_str(&format!("\nrank {}\n", pos.rank));
        }
        let label = tree.graph.node(id).map_or("", |n| n.label());
        out.push_str(&format!(
            "  ({:>7.1}, {:>7.1})  {label}  [{id}]\n",
            pos.x, pos.y
        ));
    }

    out.push_str("\nedges\n");
    for edge in layout
        .edges
        .iter()
        .filter(|e| only.is_none_or(|kind| e.kind == kind))
    {
        let bends = edge.points.len().saturating_sub(2);
        let reversed = if edge.reversed { ", reversed" } else { "" };
        out.push_str(&format!(
            "  {} -> {}  ({} bend(s){reversed})\n",
            edge.from, edge.to, bends
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use privchain_core::catalog::builtin_catalog;

    fn args(node_sep: Option<f64>, rank_sep: Option<f64>) -> LayoutArgs {
        LayoutArgs {
            format: OutputFormat::Human,
            node_sep,
            rank_sep,
            edges: None,
        }
    }

    #[test]
    fn test_separation_overrides() {
        let config = layout_config(&args(Some(10.0), None)).unwrap();
        assert!((config.node_sep - 10.0).abs() < f64::EPSILON);
        assert!((config.rank_sep - LayoutConfig::default().rank_sep).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_separation_is_usage_error() {
        let err = layout_config(&args(None, Some(-1.0))).unwrap_err();
        assert!(matches!(err, PrivChainError::Usage(_)));
        assert!(err.to_string().contains("--rank-sep"));
    }

    #[test]
    fn test_human_output_filters_edges() {
        let session = Session::new(builtin_catalog().unwrap().catalog);
        let tree = session.catalog_tree();

        let all = render_human(&tree, None);
        let escalation = render_human(&tree, Some(EdgeKind::Escalation));
        assert!(all.contains("\nrank 0\n"));
        assert!(all.contains("[level:Sandbox]"));
        assert!(escalation.contains("technique:v8/jit-type-confusion -> level:Renderer"));
        assert!(!escalation.contains("level:Sandbox -> component:v8"));
        assert!(all.contains("level:Sandbox -> component:v8"));
    }
}
