//! `moves` command
//!
//! Replays the given steps and lists what can be attacked next.

use std::path::Path;

use privchain_core::chain::ChainEngine;
use serde::Serialize;

use super::{load_catalog, replay_session};
use crate::cli::args::{MovesArgs, OutputFormat};
use crate::error::PrivChainError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MovesView<'a> {
    current_privilege: &'a str,
    steps: usize,
    complete: bool,
    moves: Vec<MoveView<'a>>,
}

#[derive(Serialize)]
struct MoveView<'a> {
    component: &'a str,
    technique: &'a str,
    name: String,
    target: &'a str,
}

impl<'a> MovesView<'a> {
    fn new(engine: &'a ChainEngine) -> Self {
        let moves = engine
            .available_moves()
            .into_iter()
            .flat_map(|component| {
                component.techniques.iter().map(move |technique| MoveView {
                    component: &component.id,
                    technique: &technique.id,
                    name: format!("{}: {}", component.name, technique.name),
                    target: &component.target_privilege,
                })
            })
            .collect();

        Self {
            current_privilege: engine.current_privilege(),
            steps: engine.chain().len(),
            complete: engine.is_complete(),
            moves,
        }
    }
}

/// List the moves available after replaying `args.steps`.
///
/// # Errors
///
/// Returns a catalog error if the catalog cannot be loaded, or a chain
/// error if a step is unknown or inapplicable.
pub fn run(args: &MovesArgs, catalog_path: Option<&Path>) -> Result<(), PrivChainError> {
    let session = replay_session(load_catalog(catalog_path)?, &args.steps)?;
    let view = MovesView::new(session.engine());

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Human => print!("{}", render_human(&view)),
    }
    Ok(())
}

fn render_human(view: &MovesView<'_>) -> String {
    let mut out = format!(
        "Current privilege: {} ({} step(s){})\n",
        view.current_privilege,
        view.steps,
        if view.complete { ", complete" } else { "" }
    );

    if view.moves.is_empty() {
        out.push_str("No moves available.\n");
        return out;
    }

    out.push_str("Available moves:\n");
    let width = view
        .moves
        .iter()
        .map(|m| m.component.len() + m.technique.len() + 1)
        .max()
        .unwrap_or(0);
    for m in &view.moves {
        let step = format!("{}/{}", m.component, m.technique);
        out.push_str(&format!("  {step:<width$}  {} -> {}\n", m.name, m.target));
    }
    out
}
