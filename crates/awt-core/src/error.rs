//! Error types for ingestion and snapshots.

use thiserror::Error;

/// Failures surfaced by [`WorkTimeAccumulator`](crate::WorkTimeAccumulator).
///
/// The first three variants are data-quality violations and are only raised in
/// strict mode. `EmptyResult` is always raised.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The event belongs to a different agent than the accumulator.
    #[error("owner mismatch: expected [{expected}], given [{given}]")]
    OwnerMismatch { expected: String, given: String },

    /// The event is older than the last accepted one.
    #[error("status events are not sorted by time: event at {given} after {last}")]
    ChronologyViolation { last: i64, given: i64 },

    /// The device changed while the agent was logged in.
    #[error("device mismatch: expected [{expected}], given [{}]", .given.as_deref().unwrap_or("none"))]
    DeviceMismatch {
        expected: String,
        given: Option<String>,
    },

    /// A snapshot was requested before any event was ingested.
    #[error("work time is empty")]
    EmptyResult,

    /// A raw record could not be decoded into a status event.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Failures decoding a raw record through a [`FieldMapping`](crate::FieldMapping).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The record is not a JSON object.
    #[error("status record must be a JSON object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("missing field `{field}`")]
    MissingField { field: String },

    /// A field is present but has an unusable value.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}
