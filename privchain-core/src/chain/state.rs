//! Chain state representation
//!
//! [`EngineState`] is the `(current_privilege, chain)` pair owned by the
//! [`ChainEngine`](super::ChainEngine). [`ChainSnapshot`] is the owned,
//! immutable copy handed to exporters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::AttackVector;

/// Current privilege plus the ordered chain of applied vectors.
///
/// Invariants (upheld by the engine, never by callers):
/// - `chain[i].target_privilege == chain[i + 1].source_privilege`
/// - `chain[0].source_privilege` is the catalog start level
/// - `current_privilege` is the last target, or the start level when empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    current_privilege: String,
    chain: Vec<AttackVector>,
}

impl EngineState {
    /// The state every session starts in.
    #[must_use]
    pub fn initial(start_level: &str) -> Self {
        Self {
            current_privilege: start_level.to_string(),
            chain: Vec::new(),
        }
    }

    /// Returns the state after appending `vector`.
    ///
    /// The caller has already checked the transition.
    pub(crate) fn extended(&self, vector: AttackVector) -> Self {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.extend(self.chain.iter().cloned());
        let current_privilege = vector.target_privilege.clone();
        chain.push(vector);
        Self {
            current_privilege,
            chain,
        }
    }

    /// Current privilege level name.
    #[must_use]
    pub fn current_privilege(&self) -> &str {
        &self.current_privilege
    }

    /// Applied vectors in order.
    #[must_use]
    pub fn chain(&self) -> &[AttackVector] {
        &self.chain
    }

    /// Number of applied vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if no vector has been applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

/// Immutable copy of the engine state taken for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSnapshot {
    /// Catalog start level
    pub start_level: String,
    /// Privilege held when the snapshot was taken
    pub current_privilege: String,
    /// Applied vectors in order
    pub chain: Vec<AttackVector>,
    /// Whether the chain had reached a terminal level
    pub complete: bool,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl ChainSnapshot {
    /// Number of steps in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Level the chain starts from: the first step's source, or the start level.
    #[must_use]
    pub fn source_level(&self) -> &str {
        self.chain
            .first()
            .map_or(self.start_level.as_str(), |v| v.source_privilege.as_str())
    }

    /// Level the chain ends at.
    #[must_use]
    pub fn target_level(&self) -> &str {
        &self.current_privilege
    }
}
