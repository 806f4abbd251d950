//! Command session
//!
//! A [`Session`] owns one [`ChainEngine`] and turns discrete [`Command`]s
//! from the interaction surface into engine calls and export artifacts.
//! It holds no presentation state: which panels are open, what is
//! highlighted and so on belong to whatever front end drives it.

use std::sync::Arc;

use privchain_core::catalog::{AttackVector, Catalog};
use privchain_core::chain::{ChainEngine, ChainSnapshot, VectorPreview};
use privchain_core::layout::{CatalogLayout, CatalogTree, LayeredLayout, LayoutConfig};
use privchain_export::{ExportFormat, RenderTarget, create_exporter, export_snapshot};
use tracing::debug;

use crate::error::PrivChainError;

/// A discrete request from the interaction surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Inspect a vector without applying it.
    Select {
        /// Component id
        component: String,
        /// Technique id
        technique: String,
    },
    /// Apply a vector to the chain.
    Escalate {
        /// Component id
        component: String,
        /// Technique id
        technique: String,
    },
    /// Discard the chain and return to the start level.
    Reset,
    /// Produce one export artifact from the current chain.
    RequestExport(ExportFormat),
}

/// What a [`Command`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The selected vector and whether it applies now.
    Selected(VectorPreview),
    /// The chain grew by one step.
    Escalated {
        /// Level held after the step
        current_privilege: String,
        /// Whether a terminal level was reached
        complete: bool,
    },
    /// The chain was discarded.
    Reset,
    /// An artifact was produced, or skipped for lack of a render target.
    Exported {
        /// Requested format
        format: ExportFormat,
        /// Artifact bytes; `None` when the export was skipped
        content: Option<Vec<u8>>,
    },
}

/// Engine plus the collaborators its commands need.
pub struct Session {
    engine: ChainEngine,
    layout: LayeredLayout,
    catalog_layout: CatalogLayout<LayeredLayout>,
    render_target: Option<Box<dyn RenderTarget>>,
}

impl Session {
    /// Starts a session at the catalog's start level with default layout
    /// constants and no render target.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_layout(catalog, LayoutConfig::default())
    }

    /// Starts a session with the given layout constants.
    #[must_use]
    pub fn with_layout(catalog: Arc<Catalog>, config: LayoutConfig) -> Self {
        let layout = LayeredLayout::new(config);
        Self {
            catalog_layout: CatalogLayout::new(Arc::clone(&catalog), layout),
            engine: ChainEngine::new(catalog),
            layout,
            render_target: None,
        }
    }

    /// Attaches an external rasterizer for snapshot exports.
    #[must_use]
    pub fn with_render_target(mut self, target: Box<dyn RenderTarget>) -> Self {
        self.render_target = Some(target);
        self
    }

    /// The underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &ChainEngine {
        &self.engine
    }

    /// Immutable copy of the current chain.
    #[must_use]
    pub fn snapshot(&self) -> ChainSnapshot {
        self.engine.snapshot()
    }

    /// The laid-out catalog tree, computed once per session.
    #[must_use]
    pub fn catalog_tree(&self) -> Arc<CatalogTree> {
        self.catalog_layout.tree()
    }

    /// Applies each `(component, technique)` pair in order.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected step and returns its error; earlier
    /// steps stay applied.
    pub fn replay<'a, I>(&mut self, steps: I) -> Result<&[AttackVector], PrivChainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (component, technique) in steps {
            self.engine.escalate_by_id(component, technique)?;
        }
        Ok(self.engine.chain())
    }

    /// Executes one command.
    ///
    /// # Errors
    ///
    /// Returns [`PrivChainError::Chain`] for unknown or inapplicable
    /// vectors and [`PrivChainError::Export`] if an exporter fails. The
    /// engine state is unchanged on error.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, PrivChainError> {
        debug!(?command, "executing command");
        match command {
            Command::Select {
                component,
                technique,
            } => Ok(CommandOutcome::Selected(
                self.engine.preview(&component, &technique)?,
            )),
            Command::Escalate {
                component,
                technique,
            } => {
                self.engine.escalate_by_id(&component, &technique)?;
                Ok(CommandOutcome::Escalated {
                    current_privilege: self.engine.current_privilege().to_string(),
                    complete: self.engine.is_complete(),
                })
            }
            Command::Reset => {
                self.engine.reset();
                Ok(CommandOutcome::Reset)
            }
            Command::RequestExport(format) => {
                let snapshot = self.engine.snapshot();
                let content = match create_exporter(format) {
                    Some(exporter) => Some(exporter.export(&snapshot)?.into_bytes()),
                    None => {
                        export_snapshot(&snapshot, self.render_target.as_deref(), &self.layout)?
                    }
                };
                Ok(CommandOutcome::Exported { format, content })
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine)
            .field("layout", &self.layout)
            .field("render_target", &self.render_target.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use privchain_core::catalog::CatalogLoader;
    use privchain_export::{ExportError, SnapshotScene};

    fn fixture() -> Arc<Catalog> {
        let yaml = r"
name: fixture
start_level: Sandbox
levels:
  - name: Sandbox
  - name: Mid
  - name: Root
components:
  - id: A
    name: Component A
    source_privilege: Sandbox
    target_privilege: Mid
    techniques:
      - id: T1
        name: Technique One
  - id: B
    name: Component B
    source_privilege: Mid
    target_privilege: Root
    techniques:
      - id: T2
        name: Technique Two
";
        CatalogLoader::with_defaults()
            .load_from_str(yaml)
            .unwrap()
            .catalog
    }

    fn escalate(component: &str, technique: &str) -> Command {
        Command::Escalate {
            component: component.to_string(),
            technique: technique.to_string(),
        }
    }

    struct EdgeCount;

    impl RenderTarget for EdgeCount {
        fn rasterize(&self, scene: &SnapshotScene) -> Result<Vec<u8>, ExportError> {
            Ok(scene.edges.len().to_string().into_bytes())
        }
    }

    #[test]
    fn test_scenario_a_through_commands() {
        let mut session = Session::new(fixture());

        let outcome = session.execute(escalate("A", "T1")).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Escalated {
                current_privilege: "Mid".to_string(),
                complete: false
            }
        );

        let outcome = session.execute(escalate("B", "T2")).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Escalated {
                current_privilege: "Root".to_string(),
                complete: true
            }
        );
    }

    #[test]
    fn test_select_does_not_mutate() {
        let mut session = Session::new(fixture());
        let outcome = session
            .execute(Command::Select {
                component: "B".to_string(),
                technique: "T2".to_string(),
            })
            .unwrap();

        match outcome {
            CommandOutcome::Selected(preview) => assert!(!preview.applicable),
            other => panic!("expected Selected, got {other:?}"),
        }
        assert!(session.engine().chain().is_empty());
    }

    #[test]
    fn test_rejected_escalation_is_chain_error() {
        let mut session = Session::new(fixture());
        let err = session.execute(escalate("B", "T2")).unwrap_err();
        assert!(matches!(err, PrivChainError::Chain(_)));
        assert_eq!(session.engine().current_privilege(), "Sandbox");
    }

    #[test]
    fn test_reset_command() {
        let mut session = Session::new(fixture());
        session.replay([("A", "T1"), ("B", "T2")]).unwrap();
        assert_eq!(session.execute(Command::Reset).unwrap(), CommandOutcome::Reset);
        assert!(session.engine().chain().is_empty());
        assert!(!session.engine().is_complete());
    }

    #[test]
    fn test_snapshot_export_without_target_is_skipped() {
        let mut session = Session::new(fixture());
        let outcome = session
            .execute(Command::RequestExport(ExportFormat::Snapshot))
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Exported {
                format: ExportFormat::Snapshot,
                content: None
            }
        );

        let outcome = session
            .execute(Command::RequestExport(ExportFormat::Json))
            .unwrap();
        assert!(matches!(
            outcome,
            CommandOutcome::Exported {
                content: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_snapshot_export_with_target() {
        let mut session = Session::new(fixture()).with_render_target(Box::new(EdgeCount));
        session.replay([("A", "T1")]).unwrap();
        let outcome = session
            .execute(Command::RequestExport(ExportFormat::Snapshot))
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Exported {
                format: ExportFormat::Snapshot,
                content: Some(b"1".to_vec())
            }
        );
    }

    #[test]
    fn test_replay_stops_at_first_failure() {
        let mut session = Session::new(fixture());
        let err = session.replay([("A", "T1"), ("A", "T1")]).unwrap_err();
        assert!(matches!(err, PrivChainError::Chain(_)));
        assert_eq!(session.engine().chain().len(), 1);
    }

    #[test]
    fn test_catalog_tree_is_shared() {
        let session = Session::new(fixture());
        assert!(Arc::ptr_eq(&session.catalog_tree(), &session.catalog_tree()));
    }
}
