//! `chain` command
//!
//! Builds a chain from `--step` arguments and exports it.

use std::path::Path;

use privchain_export::{ExportFormat, write_all};
use tracing::info;

use super::{load_catalog, replay_session};
use crate::cli::args::ChainArgs;
use crate::error::{ExportError, PrivChainError};
use crate::session::{Command, CommandOutcome};

/// Build the chain and write the requested artifact(s).
///
/// # Errors
///
/// Returns a catalog, chain or export error.
pub fn run(args: &ChainArgs, catalog_path: Option<&Path>) -> Result<(), PrivChainError> {
    let mut session = replay_session(load_catalog(catalog_path)?, &args.steps)?;

    if let Some(dir) = &args.out_dir {
        let written = write_all(&session.snapshot(), dir, None)?;
        for path in written {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let format = ExportFormat::from(args.format);
    let outcome = session.execute(Command::RequestExport(format))?;
    let CommandOutcome::Exported {
        content: Some(content),
        ..
    } = outcome
    else {
        return Ok(());
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &content).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), format = %format, "artifact written");
        }
        None => print!("{}", String::from_utf8_lossy(&content)),
    }
    Ok(())
}
