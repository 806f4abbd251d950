//! `privchain` export: attack chain artifacts
//!
//! Serializes a [`ChainSnapshot`](privchain_core::chain::ChainSnapshot)
//! into JSON, a PlantUML activity diagram, a Mermaid flowchart, a
//! LaTeX/TikZ report and a laid-out snapshot scene for external
//! rasterizers. Every exporter accepts the empty chain.

pub mod error;
pub mod escape;
pub mod json;
pub mod label;
pub mod latex;
pub mod mermaid;
pub mod plantuml;
pub mod snapshot;

use std::fs;
use std::path::{Path, PathBuf};

use privchain_core::chain::ChainSnapshot;
use privchain_core::layout::LayeredLayout;
use tracing::{debug, info};

pub use error::ExportError;
pub use snapshot::{RenderTarget, SnapshotScene, export_snapshot};

/// Artifact kinds, one per exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Structured step list (`attack-chain.json`).
    Json,
    /// Activity diagram (`attack-chain.puml`).
    PlantUml,
    /// Node/edge flowchart (`attack-chain.mmd`).
    Mermaid,
    /// Typeset report (`attack-chain.tex`).
    Latex,
    /// Rasterized snapshot (`attack-chain.png`).
    Snapshot,
}

impl ExportFormat {
    /// Every format, in artifact order.
    pub const ALL: [Self; 5] = [
        Self::Json,
        Self::PlantUml,
        Self::Mermaid,
        Self::Latex,
        Self::Snapshot,
    ];

    /// Conventional artifact file name.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Json => "attack-chain.json",
            Self::PlantUml => "attack-chain.puml",
            Self::Mermaid => "attack-chain.mmd",
            Self::Latex => "attack-chain.tex",
            Self::Snapshot => "attack-chain.png",
        }
    }

    /// Returns `true` for formats that produce text.
    #[must_use]
    pub const fn is_text(self) -> bool {
        !matches!(self, Self::Snapshot)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::PlantUml => "plantuml",
            Self::Mermaid => "mermaid",
            Self::Latex => "latex",
            Self::Snapshot => "snapshot",
        };
        f.write_str(name)
    }
}

/// Serializes a chain snapshot into one text format.
pub trait ChainExporter {
    /// Render the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the snapshot cannot be rendered.
    fn export(&self, snapshot: &ChainSnapshot) -> Result<String, ExportError>;

    /// Returns the format this exporter produces.
    fn format(&self) -> ExportFormat;
}

/// Create an exporter for a text format.
///
/// Returns `None` for [`ExportFormat::Snapshot`], which needs a
/// [`RenderTarget`] and goes through [`export_snapshot`] instead.
#[must_use]
pub fn create_exporter(format: ExportFormat) -> Option<Box<dyn ChainExporter>> {
    match format {
        ExportFormat::Json => Some(Box::new(json::JsonExporter)),
        ExportFormat::PlantUml => Some(Box::new(plantuml::PlantUmlExporter)),
        ExportFormat::Mermaid => Some(Box::new(mermaid::MermaidExporter)),
        ExportFormat::Latex => Some(Box::new(latex::LatexExporter)),
        ExportFormat::Snapshot => None,
    }
}

/// Write every artifact for `snapshot` into `dir`.
///
/// The PNG is skipped when `target` is `None`; all other artifacts are
/// always written. Returns the written paths in [`ExportFormat::ALL`] order.
///
/// # Errors
///
/// Returns `ExportError` if rendering fails or a file cannot be written.
pub fn write_all(
    snapshot: &ChainSnapshot,
    dir: &Path,
    target: Option<&dyn RenderTarget>,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(ExportFormat::ALL.len());
    for format in ExportFormat::ALL {
        let path = dir.join(format.file_name());
        let bytes = if let Some(exporter) = create_exporter(format) {
            exporter.export(snapshot)?.into_bytes()
        } else {
            match export_snapshot(snapshot, target, &LayeredLayout::default())? {
                Some(png) => png,
                None => continue,
            }
        };
        fs::write(&path, bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(format = %format, path = %path.display(), "artifact written");
        written.push(path);
    }

    info!(
        dir = %dir.display(),
        artifacts = written.len(),
        steps = snapshot.len(),
        "attack chain exported"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_snapshot() -> ChainSnapshot {
        ChainSnapshot {
            start_level: "Sandbox".to_string(),
            current_privilege: "Sandbox".to_string(),
            chain: vec![],
            complete: false,
            taken_at: Utc::now(),
        }
    }

    struct FixedPng;

    impl RenderTarget for FixedPng {
        fn rasterize(&self, _scene: &SnapshotScene) -> Result<Vec<u8>, ExportError> {
            Ok(b"\x89PNG".to_vec())
        }
    }

    #[test]
    fn test_file_names() {
        let names: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "attack-chain.json",
                "attack-chain.puml",
                "attack-chain.mmd",
                "attack-chain.tex",
                "attack-chain.png",
            ]
        );
    }

    #[test]
    fn test_create_exporter_matches_format() {
        for format in ExportFormat::ALL {
            match create_exporter(format) {
                Some(exporter) => assert_eq!(exporter.format(), format),
                None => assert_eq!(format, ExportFormat::Snapshot),
            }
        }
    }

    #[test]
    fn test_write_all_skips_png_without_target() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_all(&empty_snapshot(), dir.path(), None).unwrap();

        assert_eq!(written.len(), 4);
        assert!(dir.path().join("attack-chain.tex").exists());
        assert!(!dir.path().join("attack-chain.png").exists());
    }

    #[test]
    fn test_write_all_with_target() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_all(&empty_snapshot(), dir.path(), Some(&FixedPng)).unwrap();

        assert_eq!(written.len(), 5);
        let png = std::fs::read(dir.path().join("attack-chain.png")).unwrap();
        assert_eq!(png, b"\x89PNG");
    }
}
