//! # planner-cli
//!
//! Command definitions for the `planner` binary. Each subcommand loads the
//! configuration, opens the record store, and prints its result as a table
//! or as JSON.

pub mod commands;
pub mod output;

pub use commands::Cli;
