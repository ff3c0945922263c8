//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::report::ReportArgs;

/// Agent work-time accounting.
///
/// Turns telephony agent status feeds into per-agent breakdowns of time spent
/// available, on break, on calls and logged out.
#[derive(Debug, Parser)]
#[command(name = "awt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report per-agent work time from newline-delimited JSON status records.
    Report(ReportArgs),

    /// Print the effective configuration.
    Config,
}
