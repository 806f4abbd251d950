//! `privchain` - browser privilege-escalation attack chain simulator
//!
//! Command-line surface over `privchain-core` (catalog, chain engine,
//! layout) and `privchain-export` (artifact exporters). The [`session`]
//! module is the command adapter the CLI drives.

pub mod cli;
pub mod error;
pub mod observability;
pub mod session;
