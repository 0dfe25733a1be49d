//! Command-line driver
//!
//! Runs the create → mine → append loop and reports the resulting chain.

pub mod commands;
pub mod config;

pub use commands::{cmd_run, cmd_verify, CliResult};
pub use config::{parse_or_default, RunConfig, DEFAULT_BLOCK_COUNT};
