//! CLI Adapter
//!
//! Command-line interface for the boost tracker.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CheckConfigCmd, CliApp, Command, ReportCmd, RunCmd};
