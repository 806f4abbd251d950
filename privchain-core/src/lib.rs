//! `privchain` core: catalog, chain engine and layout
//!
//! This crate holds everything that does not touch a terminal or a file
//! format: the immutable attack-vector [`catalog`], the escalation
//! state machine in [`chain`], and the layered graph layout in
//! [`layout`]. It is shared by `privchain` (CLI) and `privchain-export`
//! (exporters).

pub mod catalog;
pub mod chain;
pub mod error;
pub mod layout;
