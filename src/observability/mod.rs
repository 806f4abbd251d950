//! Observability
//!
//! Structured logging for `privchain` runs.

pub mod logging;

pub use logging::{LogFormat, init_logging};
