//! Agent work-time CLI library.
//!
//! This crate provides the CLI interface for agent work-time reports.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
