//! Agent work-time accounting.
//!
//! This crate turns a chronologically ordered stream of agent status events
//! from a telephony platform into per-agent time breakdowns:
//! - Accumulator: the per-agent status state machine and its validation
//! - Ledger: timer buckets and occurrence counters
//! - Snapshot: the immutable result record
//! - Batch: parallel accumulation across many agents

mod accumulator;
pub mod batch;
mod error;
pub mod event;
pub mod ledger;
mod options;
pub mod snapshot;
pub mod status;

pub use accumulator::WorkTimeAccumulator;
pub use batch::{AgentReport, accumulate_by_owner};
pub use error::{Error, ExtractError};
pub use event::{FieldMapping, StatusEvent};
pub use ledger::{Counters, Timers};
pub use options::AccumulatorOptions;
pub use snapshot::{CurrentStatus, WorkTimeSnapshot};
pub use status::{Bucket, Status, StatusKind, UnknownStatus};
