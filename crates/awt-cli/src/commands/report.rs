//! Report command: per-agent work time from a status feed.
//!
//! Reads newline-delimited JSON status records, runs one accumulator per
//! agent and prints either a human-readable breakdown or the snapshots as JSON.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use awt_core::{AgentReport, FieldMapping, StatusEvent, accumulate_by_owner};

use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Newline-delimited JSON status records. Reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Only report this agent.
    #[arg(long)]
    pub owner: Option<String>,

    /// Sort records by timestamp before accumulating.
    #[arg(long)]
    pub sort: bool,

    /// Skip owner, chronology and device validation.
    #[arg(long)]
    pub lenient: bool,

    /// Allow agents to change device while logged in.
    #[arg(long)]
    pub no_device_check: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let mut options = config.accumulator.clone();
    if args.lenient {
        options.throws = false;
    }
    if args.no_device_check {
        options.check_device_id = false;
    }
    let mapping = options.field_mapping();

    let mut events = match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            parse_events(BufReader::new(file), &mapping)?
        }
        None => parse_events(io::stdin().lock(), &mapping)?,
    };

    if let Some(owner) = &args.owner {
        events.retain(|e| e.owner_id == *owner);
    }
    if args.sort || config.sort_events {
        events.sort_by_key(|e| e.timestamp);
    }
    tracing::debug!(events = events.len(), "status events loaded");

    let reports = accumulate_by_owner(events, &options);

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &reports)
            .context("failed to serialize reports")?;
        writeln!(writer)?;
    } else {
        write!(writer, "{}", format_reports(&reports))?;
    }
    Ok(())
}

fn parse_events<R: BufRead>(reader: R, mapping: &FieldMapping) -> Result<Vec<StatusEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: serde_json::Value = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let event = mapping
            .extract(&record)
            .with_context(|| format!("invalid status record on line {}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Formats milliseconds as "Xh Ym" if >= 1 hour, "Xm" otherwise.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn format_reports(reports: &[AgentReport]) -> String {
    let mut output = String::new();

    if reports.is_empty() {
        writeln!(output, "No status events.").unwrap();
        return output;
    }

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }
        writeln!(output, "{}", report.owner_id).unwrap();
        writeln!(
            output,
            "  events:    {} accepted, {} rejected",
            report.accepted, report.rejected
        )
        .unwrap();

        let snapshot = match &report.result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                writeln!(output, "  error:     {e}").unwrap();
                continue;
            }
        };

        let state = if snapshot.is_on_call {
            "on call"
        } else if snapshot.is_available {
            "available"
        } else if snapshot.is_logged_in {
            "logged in"
        } else {
            "logged out"
        };
        let status = snapshot
            .current_status
            .as_ref()
            .map_or("-", |s| s.name.as_str());
        writeln!(output, "  status:    {status} ({state})").unwrap();
        writeln!(
            output,
            "  device:    {}",
            snapshot.current_device_id.as_deref().unwrap_or("-")
        )
        .unwrap();
        writeln!(
            output,
            "  logged in: {}",
            format_duration(snapshot.logged_in_ms)
        )
        .unwrap();
        for (bucket, ms) in snapshot.timers.iter() {
            writeln!(output, "    {:<16}{}", bucket.as_str(), format_duration(ms)).unwrap();
        }
    }

    output
}
