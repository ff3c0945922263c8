//! Parallel accumulation over many agents' event histories.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::accumulator::WorkTimeAccumulator;
use crate::error::Error;
use crate::event::StatusEvent;
use crate::options::AccumulatorOptions;
use crate::snapshot::WorkTimeSnapshot;

/// Outcome of accumulating one agent's events.
#[derive(Debug, Clone)]
pub struct AgentReport {
    pub owner_id: String,
    /// Events applied to the accumulator.
    pub accepted: usize,
    /// Events refused by strict validation and skipped.
    pub rejected: usize,
    /// The snapshot, or `EmptyResult` when every event was rejected.
    pub result: Result<WorkTimeSnapshot, Error>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson<'a> {
    owner_id: &'a str,
    accepted: usize,
    rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a WorkTimeSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for AgentReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ReportJson {
            owner_id: &self.owner_id,
            accepted: self.accepted,
            rejected: self.rejected,
            snapshot: self.result.as_ref().ok(),
            error: self.result.as_ref().err().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

/// Runs one accumulator per owner over `events`.
///
/// Events are grouped by owner id, keeping each owner's input order, and the
/// groups are driven in parallel. Rejected events are logged and skipped.
/// Reports are sorted by owner id.
pub fn accumulate_by_owner(
    events: impl IntoIterator<Item = StatusEvent>,
    options: &AccumulatorOptions,
) -> Vec<AgentReport> {
    let mut by_owner: BTreeMap<String, Vec<StatusEvent>> = BTreeMap::new();
    for event in events {
        by_owner.entry(event.owner_id.clone()).or_default().push(event);
    }

    let groups: Vec<(String, Vec<StatusEvent>)> = by_owner.into_iter().collect();
    groups
        .into_par_iter()
        .map(|(owner_id, events)| accumulate_owner(owner_id, &events, options))
        .collect()
}

fn accumulate_owner(
    owner_id: String,
    events: &[StatusEvent],
    options: &AccumulatorOptions,
) -> AgentReport {
    let mut acc = WorkTimeAccumulator::new(owner_id.clone(), options.clone());
    let mut accepted = 0;
    let mut rejected = 0;

    for event in events {
        match acc.ingest(event) {
            Ok(()) => accepted += 1,
            Err(e) => {
                rejected += 1;
                tracing::warn!(
                    owner = %owner_id,
                    timestamp = event.timestamp,
                    status = %event.status_name,
                    error = %e,
                    "skipping rejected status event"
                );
            }
        }
    }

    tracing::debug!(owner = %owner_id, accepted, rejected, "agent accumulated");

    AgentReport {
        owner_id,
        accepted,
        rejected,
        result: acc.snapshot(),
    }
}
