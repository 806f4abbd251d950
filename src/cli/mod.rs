//! Command-line interface
//!
//! Argument parsing and command handlers for the `privchain` binary.

pub mod args;
pub mod commands;
