//! Config command: print the effective configuration.

use std::io::Write;

use anyhow::{Context, Result};

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, config).context("failed to serialize config")?;
    writeln!(writer)?;
    Ok(())
}
