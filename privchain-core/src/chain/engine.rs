//! Chain engine orchestration
//!
//! The [`ChainEngine`] enforces valid privilege-escalation sequencing
//! against a shared [`Catalog`]. Every mutation builds the next
//! [`EngineState`] in full and swaps it in, so a failed call never leaves
//! a partially updated chain behind.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::{AttackVector, Catalog, TargetComponent};
use crate::error::ChainError;

use super::state::{ChainSnapshot, EngineState};

/// Result of a `Select` command: the vector and whether it applies now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorPreview {
    /// The selected vector
    pub vector: AttackVector,
    /// `true` if `escalate` would accept it in the current state
    pub applicable: bool,
}

/// State machine over privilege levels.
#[derive(Debug, Clone)]
pub struct ChainEngine {
    catalog: Arc<Catalog>,
    state: EngineState,
}

impl ChainEngine {
    /// Creates an engine in the initial state `(start_level, [])`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = EngineState::initial(catalog.start_level());
        Self { catalog, state }
    }

    /// The catalog this engine validates against.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Level every chain starts from.
    #[must_use]
    pub fn start_level(&self) -> &str {
        self.catalog.start_level()
    }

    /// Current engine state.
    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    /// Current privilege level name.
    #[must_use]
    pub fn current_privilege(&self) -> &str {
        self.state.current_privilege()
    }

    /// Applied vectors in order.
    #[must_use]
    pub fn chain(&self) -> &[AttackVector] {
        self.state.chain()
    }

    /// Components attackable from the current privilege level.
    #[must_use]
    pub fn available_moves(&self) -> Vec<&TargetComponent> {
        self.catalog
            .components_by_source_level(self.state.current_privilege())
    }

    /// Applies `vector` if it starts from the current privilege level.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidTransition`] when
    /// `vector.source_privilege` differs from the current level; the state
    /// is unchanged in that case.
    pub fn escalate(&mut self, vector: AttackVector) -> Result<&EngineState, ChainError> {
        if vector.source_privilege != self.state.current_privilege() {
            warn!(
                vector = %vector.name,
                source = %vector.source_privilege,
                current = %self.state.current_privilege(),
                "rejected escalation"
            );
            return Err(ChainError::InvalidTransition {
                vector: vector.name,
                source_privilege: vector.source_privilege,
                current: self.state.current_privilege().to_string(),
            });
        }

        info!(
            step = self.state.len() + 1,
            vector = %vector.name,
            from = %vector.source_privilege,
            to = %vector.target_privilege,
            "escalated"
        );

        self.state = self.state.extended(vector);

        if self.is_complete() {
            info!(
                level = %self.state.current_privilege(),
                steps = self.state.len(),
                "attack chain complete"
            );
        }

        Ok(&self.state)
    }

    /// Resolves `(component_id, technique_id)` through the catalog and escalates.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownVector`] if the catalog has no such
    /// technique, or [`ChainError::InvalidTransition`] as for [`Self::escalate`].
    pub fn escalate_by_id(
        &mut self,
        component_id: &str,
        technique_id: &str,
    ) -> Result<&EngineState, ChainError> {
        let vector = self.resolve(component_id, technique_id)?;
        self.escalate(vector)
    }

    /// Looks up a vector without touching the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownVector`] if the catalog has no such technique.
    pub fn preview(
        &self,
        component_id: &str,
        technique_id: &str,
    ) -> Result<VectorPreview, ChainError> {
        let vector = self.resolve(component_id, technique_id)?;
        let applicable = vector.source_privilege == self.state.current_privilege();
        Ok(VectorPreview { vector, applicable })
    }

    /// Returns to the initial state. Always succeeds.
    pub fn reset(&mut self) {
        debug!(
            discarded_steps = self.state.len(),
            "resetting attack chain"
        );
        self.state = EngineState::initial(self.catalog.start_level());
    }

    /// `true` once a terminal level is reached with a non-empty chain.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.state.is_empty() && self.catalog.is_terminal(self.state.current_privilege())
    }

    /// Takes an immutable copy of the current state for export.
    #[must_use]
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            start_level: self.catalog.start_level().to_string(),
            current_privilege: self.state.current_privilege().to_string(),
            chain: self.state.chain().to_vec(),
            complete: self.is_complete(),
            taken_at: Utc::now(),
        }
    }

    fn resolve(&self, component_id: &str, technique_id: &str) -> Result<AttackVector, ChainError> {
        self.catalog
            .vector(component_id, technique_id)
            .ok_or_else(|| {
                let suggestion = if self.catalog.component(component_id).is_some() {
                    self.catalog
                        .suggest_technique(component_id, technique_id)
                        .map(|t| format!("{component_id}/{t}"))
                } else {
                    self.catalog.suggest_component(component_id)
                };
                ChainError::UnknownVector {
                    component: component_id.to_string(),
                    technique: technique_id.to_string(),
                    suggestion,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLoader;

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

    #[test]
    fn test_initial_state() {
        let engine = ChainEngine::new(fixture());
        assert_eq!(engine.current_privilege(), "Sandbox");
        assert!(engine.chain().is_empty());
        assert!(!engine.is_complete());
    }

    #[test]
    fn test_two_step_chain_reaches_root() {
        let catalog = fixture();
        let mut engine = ChainEngine::new(Arc::clone(&catalog));

        let v1 = catalog.vector("A", "T1").unwrap();
        engine.escalate(v1.clone()).unwrap();
        assert_eq!(engine.chain(), std::slice::from_ref(&v1));
        assert_eq!(engine.current_privilege(), "Mid");
        assert!(!engine.is_complete());

        let v2 = catalog.vector("B", "T2").unwrap();
        engine.escalate(v2.clone()).unwrap();
        assert_eq!(engine.chain(), &[v1, v2]);
        assert_eq!(engine.current_privilege(), "Root");
        assert!(engine.is_complete());
        assert!(engine.available_moves().is_empty());
    }

    #[test]
    fn test_invalid_transition_leaves_state_unchanged() {
        let catalog = fixture();
        let mut engine = ChainEngine::new(Arc::clone(&catalog));
        let before = engine.state().clone();

        let err = engine
            .escalate(catalog.vector("B", "T2").unwrap())
            .unwrap_err();

        assert!(matches!(err, ChainError::InvalidTransition { .. }));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_escalate_by_id_unknown_vector() {
        let mut engine = ChainEngine::new(fixture());
        let err = engine.escalate_by_id("A", "T9").unwrap_err();
        match err {
            ChainError::UnknownVector { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("A/T1"));
            }
            other => panic!("expected UnknownVector, got {other:?}"),
        }
        assert!(engine.chain().is_empty());
    }

    #[test]
    fn test_reset_from_terminal_state() {
        let mut engine = ChainEngine::new(fixture());
        engine.escalate_by_id("A", "T1").unwrap();
        engine.escalate_by_id("B", "T2").unwrap();
        assert!(engine.is_complete());

        engine.reset();
        assert_eq!(engine.current_privilege(), "Sandbox");
        assert!(engine.chain().is_empty());
        assert!(!engine.is_complete());
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let engine = ChainEngine::new(fixture());
        let preview = engine.preview("B", "T2").unwrap();
        assert!(!preview.applicable);
        assert_eq!(preview.vector.id, "BT2");
        let preview = engine.preview("A", "T1").unwrap();
        assert!(preview.applicable);
        assert!(engine.chain().is_empty());
    }

    #[test]
    fn test_available_moves_follow_current_level() {
        let mut engine = ChainEngine::new(fixture());
        let ids: Vec<&str> = engine.available_moves().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);

        engine.escalate_by_id("A", "T1").unwrap();
        let ids: Vec<&str> = engine.available_moves().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut engine = ChainEngine::new(fixture());
        engine.escalate_by_id("A", "T1").unwrap();
        let snapshot = engine.snapshot();

        engine.escalate_by_id("B", "T2").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.current_privilege, "Mid");
        assert!(!snapshot.complete);
        assert_eq!(snapshot.start_level, "Sandbox");
    }
}
