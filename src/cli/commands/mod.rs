//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod catalog;
pub mod chain;
pub mod completions;
pub mod layout;
pub mod moves;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use privchain_core::catalog::{Catalog, CatalogLoader, builtin_catalog};
use tracing::debug;

use crate::cli::args::{CatalogSubcommand, Cli, Commands, StepRef};
use crate::error::PrivChainError;
use crate::session::Session;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), PrivChainError> {
    let catalog_path = cli.catalog.as_deref();
    match cli.command {
        Commands::Catalog(cmd) => match cmd.subcommand {
            CatalogSubcommand::Show(args) => catalog::show(&args, catalog_path),
            CatalogSubcommand::Validate(args) => catalog::validate(&args),
        },
        Commands::Moves(args) => moves::run(&args, catalog_path),
        Commands::Chain(args) => chain::run(&args, catalog_path),
        Commands::Layout(args) => layout::run(&args, catalog_path),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the catalog at `path`, or the built-in catalog when `None`.
///
/// # Errors
///
/// Returns a catalog error if the file is missing or invalid.
pub fn load_catalog(path: Option<&Path>) -> Result<Arc<Catalog>, PrivChainError> {
    let result = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading catalog file");
            CatalogLoader::with_defaults().load(path)?
        }
        None => builtin_catalog()?,
    };
    Ok(result.catalog)
}

/// Starts a session on `catalog` and applies `steps` in order.
///
/// # Errors
///
/// Returns a chain error for the first unknown or inapplicable step.
pub fn replay_session(catalog: Arc<Catalog>, steps: &[StepRef]) -> Result<Session, PrivChainError> {
    let mut session = Session::new(catalog);
    session.replay(
        steps
            .iter()
            .map(|s| (s.component.as_str(), s.technique.as_str())),
    )?;
    Ok(session)
}
