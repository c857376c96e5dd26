//! CLI Adapter
//!
//! Command-line interface for the pair sniper.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CheckCmd, CliApp, Command, RunCmd, WatchCmd, DEFAULT_CONFIG};
