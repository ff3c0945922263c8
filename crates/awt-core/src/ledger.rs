//! Timer buckets and occurrence counters.
//!
//! Both maps are pre-populated with their full key set at construction, so a
//! category that never occurred reads as zero rather than absent.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::status::{Bucket, Status, StatusKind};

/// Accumulated milliseconds per timer bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timers(BTreeMap<Bucket, i64>);

impl Default for Timers {
    fn default() -> Self {
        Self(Bucket::ALL.into_iter().map(|b| (b, 0)).collect())
    }
}

impl Timers {
    /// Closes the interval that started at `old` and ends at `new`, adding
    /// the elapsed time to the bucket of the old status.
    ///
    /// No-op when the old status accrues into no bucket. Negative intervals
    /// (possible only with validation disabled) are clamped to zero. Totals
    /// saturate at `i64::MAX` instead of overflowing.
    pub fn close_interval(&mut self, old: &Status, new_time: i64) {
        let Some(bucket) = old.kind.bucket() else {
            return;
        };
        let elapsed = new_time.saturating_sub(old.time);
        if elapsed < 0 {
            tracing::warn!(
                bucket = %bucket,
                from = old.time,
                to = new_time,
                "negative interval clamped to zero"
            );
            return;
        }
        let total = self.0.entry(bucket).or_insert(0);
        *total = total.saturating_add(elapsed);
    }

    #[must_use]
    pub fn get(&self, bucket: Bucket) -> i64 {
        self.0.get(&bucket).copied().unwrap_or(0)
    }

    /// Zeroes every bucket.
    pub fn reset(&mut self) {
        self.0.values_mut().for_each(|ms| *ms = 0);
    }

    /// Time spent logged in: every bucket except `logout`.
    #[must_use]
    pub fn logged_in_total(&self) -> i64 {
        self.0
            .iter()
            .filter(|(bucket, _)| **bucket != Bucket::Logout)
            .fold(0_i64, |acc, (_, ms)| acc.saturating_add(*ms))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, i64)> + '_ {
        self.0.iter().map(|(b, ms)| (*b, *ms))
    }
}

/// Occurrences per status category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Counters(BTreeMap<StatusKind, u64>);

impl Default for Counters {
    fn default() -> Self {
        Self(StatusKind::ALL.into_iter().map(|k| (k, 0)).collect())
    }
}

impl Counters {
    pub fn increment(&mut self, kind: StatusKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }

    #[must_use]
    pub fn get(&self, kind: StatusKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, u64)> + '_ {
        self.0.iter().map(|(k, n)| (*k, *n))
    }
}
