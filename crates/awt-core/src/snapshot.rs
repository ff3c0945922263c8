//! Immutable read-out of an accumulator.

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

use crate::ledger::{Counters, Timers};
use crate::status::{Status, StatusKind};

/// The status in effect when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentStatus {
    pub code: i64,
    pub category: StatusKind,
    pub name: String,
}

impl From<&Status> for CurrentStatus {
    fn from(status: &Status) -> Self {
        Self {
            code: status.kind.code(),
            category: status.kind,
            name: status.name.clone(),
        }
    }
}

/// Accumulated work-time metrics for one agent.
///
/// All durations are milliseconds; `*_h` fields are the same instants as
/// RFC 3339 UTC strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTimeSnapshot {
    pub owner_id: Option<String>,
    pub current_device_id: Option<String>,
    pub current_status: Option<CurrentStatus>,
    pub is_logged_in: bool,
    pub is_on_call: bool,
    pub is_available: bool,
    /// Every ingested event, by reported category.
    pub event_counters: Counters,
    /// Effective transitions of the current status.
    pub status_counters: Counters,
    /// Events whose status code has no known category.
    pub unrecognized_events: u64,
    pub timers: Timers,
    /// Sum of every timer except `logout`.
    pub logged_in_ms: i64,
    /// Distinct devices seen while logged in, in first-seen order.
    pub devices: Vec<String>,
    pub first_status_time: Option<i64>,
    pub first_status_time_h: Option<String>,
    pub last_status_time: Option<i64>,
    pub last_status_time_h: Option<String>,
    pub last_login_time: Option<i64>,
    pub last_login_time_h: Option<String>,
}

/// Formats epoch millis as `2016-02-21T10:00:00.000Z`.
pub(crate) fn human_time(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
