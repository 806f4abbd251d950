//! Attack chain state machine
//!
//! States are `(current_privilege, chain)` pairs; the only transitions are
//! `escalate` (append one vector) and `reset` (back to the start level).

pub mod engine;
pub mod state;

pub use engine::{ChainEngine, VectorPreview};
pub use state::{ChainSnapshot, EngineState};
