//! Per-agent work-time accumulator.
//!
//! Feed status events in chronological order via
//! [`ingest`](WorkTimeAccumulator::ingest), then call
//! [`snapshot`](WorkTimeAccumulator::snapshot) to read the time spent in each
//! status.
//!
//! # State
//!
//! The state is not just the current status. Besides it the accumulator keeps:
//! - a *pending* status received during a call, applied once the call ends
//!   (the status to return to, or a deferred logout)
//! - a *pre-login* status received while logged out, restored on next login
//! - the logged-in and on-call flags
//!
//! Login and call-end events never become the current status.

use serde_json::Value;

use crate::error::Error;
use crate::event::{FieldMapping, StatusEvent};
use crate::ledger::{Counters, Timers};
use crate::options::AccumulatorOptions;
use crate::snapshot::{CurrentStatus, WorkTimeSnapshot};
use crate::status::{Status, StatusKind};

/// Work-time state machine for a single agent.
///
/// Single-writer: one instance must be fed by one thread of control.
/// Independent instances share nothing and may run in parallel.
#[derive(Debug, Clone)]
pub struct WorkTimeAccumulator {
    owner_id: Option<String>,
    options: AccumulatorOptions,
    fields: FieldMapping,

    current: Option<Status>,
    pending: Option<Status>,
    pre_login: Option<Status>,

    timers: Timers,
    event_counters: Counters,
    status_counters: Counters,
    unrecognized_events: u64,

    device_id: Option<String>,
    devices: Vec<String>,

    logged_in: bool,
    on_call: bool,
    available: bool,

    first_status_time: Option<i64>,
    last_status_time: Option<i64>,
    last_login_time: Option<i64>,
    last_event_time: Option<i64>,
}

impl WorkTimeAccumulator {
    /// Creates an accumulator bound to one agent.
    pub fn new(owner_id: impl Into<String>, options: AccumulatorOptions) -> Self {
        let owner_id = owner_id.into();
        Self::build((!owner_id.is_empty()).then_some(owner_id), options)
    }

    /// Creates an accumulator that accepts events from any owner.
    #[must_use]
    pub fn unbound(options: AccumulatorOptions) -> Self {
        Self::build(None, options)
    }

    fn build(owner_id: Option<String>, options: AccumulatorOptions) -> Self {
        Self {
            owner_id,
            fields: options.field_mapping(),
            options,
            current: None,
            pending: None,
            pre_login: None,
            timers: Timers::default(),
            event_counters: Counters::default(),
            status_counters: Counters::default(),
            unrecognized_events: 0,
            device_id: None,
            devices: Vec::new(),
            // A tracking window may open mid-shift.
            logged_in: true,
            on_call: false,
            available: false,
            first_status_time: None,
            last_status_time: None,
            last_login_time: None,
            last_event_time: None,
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub const fn options(&self) -> &AccumulatorOptions {
        &self.options
    }

    pub const fn current_status(&self) -> Option<&Status> {
        self.current.as_ref()
    }

    pub const fn pending_status(&self) -> Option<&Status> {
        self.pending.as_ref()
    }

    pub const fn timers(&self) -> &Timers {
        &self.timers
    }

    pub const fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub const fn is_on_call(&self) -> bool {
        self.on_call
    }

    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// Decodes a raw record with the configured field names, then ingests it.
    pub fn ingest_record(&mut self, record: &Value) -> Result<(), Error> {
        let event = self.fields.extract(record)?;
        self.ingest(&event)
    }

    /// Applies one status event.
    ///
    /// In strict mode a violation is returned before anything is mutated, so
    /// the caller may skip the event and continue.
    pub fn ingest(&mut self, event: &StatusEvent) -> Result<(), Error> {
        if self.options.throws {
            self.validate(event)?;
        }

        match event.status() {
            Some(status) => {
                self.event_counters.increment(status.kind);
                self.apply(status, event.device_id.as_deref());
            }
            None => {
                self.unrecognized_events += 1;
                tracing::debug!(
                    owner = %event.owner_id,
                    code = event.status_code,
                    name = %event.status_name,
                    "ignoring unrecognized status"
                );
            }
        }

        if self.logged_in {
            if let Some(device) = event.device_id.as_deref() {
                if !self.devices.iter().any(|d| d == device) {
                    self.devices.push(device.to_string());
                }
            }
        }

        self.first_status_time.get_or_insert(event.timestamp);
        self.last_event_time = Some(event.timestamp);
        Ok(())
    }

    /// Owner, chronology and device checks, in that order.
    fn validate(&self, event: &StatusEvent) -> Result<(), Error> {
        if let Some(owner) = &self.owner_id {
            if event.owner_id != *owner {
                return Err(Error::OwnerMismatch {
                    expected: owner.clone(),
                    given: event.owner_id.clone(),
                });
            }
        }

        if let Some(last) = self.last_event_time {
            if event.timestamp < last {
                return Err(Error::ChronologyViolation {
                    last,
                    given: event.timestamp,
                });
            }
        }

        if self.options.check_device_id && self.logged_in && self.first_status_time.is_some() {
            if let Some(bound) = &self.device_id {
                if event.device_id.as_ref() != Some(bound) {
                    return Err(Error::DeviceMismatch {
                        expected: bound.clone(),
                        given: event.device_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn apply(&mut self, status: Status, device: Option<&str>) {
        match status.kind {
            kind if kind.is_idle() => self.on_idle(status),
            StatusKind::Logout => self.on_logout(status),
            StatusKind::Login => self.on_login(status, device),
            StatusKind::CallBegin => self.on_call_begin(status),
            StatusKind::CallEnd => self.on_call_end(status),
            _ => {}
        }
    }

    fn on_idle(&mut self, status: Status) {
        if !self.logged_in {
            self.pre_login = Some(status);
            return;
        }

        if self.current_kind() == Some(status.kind) {
            tracing::debug!(status = %status.kind, time = status.time, "duplicate status suppressed");
            return;
        }

        if self.on_call {
            tracing::trace!(status = %status.kind, "status deferred until call ends");
            self.pending = Some(status);
            return;
        }

        self.close_interval(status.time);
        self.available = status.kind == StatusKind::Available;
        self.last_status_time = Some(status.time);
        self.set_current(status);
    }

    fn on_logout(&mut self, status: Status) {
        if !self.logged_in {
            tracing::debug!(time = status.time, "logout while logged out ignored");
            return;
        }

        if self.on_call {
            tracing::trace!("logout deferred until call ends");
            self.pending = Some(status);
            return;
        }

        self.close_interval(status.time);
        self.logged_in = false;
        self.available = false;
        self.last_status_time = Some(status.time);
        self.device_id = None;
        self.set_current(status);
    }

    fn on_login(&mut self, status: Status, device: Option<&str>) {
        let time = status.time;

        if self.logged_in && self.last_login_time.is_some() && self.current.is_some() {
            tracing::debug!(time, "duplicate login suppressed");
            return;
        }

        // First login seen: the tracked window starts here.
        let mut carried_over = false;
        if self.logged_in && self.last_login_time.is_none() {
            self.timers.reset();
            if let Some(current) = self.current.take() {
                self.pre_login = Some(current);
                carried_over = true;
            }
        }

        if !self.logged_in {
            match &self.pre_login {
                // The agent was already on a call when the login arrived;
                // the call's own interval starts at its begin time.
                Some(stashed) if stashed.kind == StatusKind::CallBegin => {
                    let call_start = stashed.time;
                    self.close_interval(call_start);
                    self.on_call = true;
                }
                _ => self.close_interval(time),
            }
        }

        match self.pre_login.take() {
            None => {
                self.available = true;
                self.on_call = false;
                self.set_current(Status::available(time));
            }
            Some(stashed) => {
                let restored = if stashed.kind == StatusKind::CallBegin {
                    stashed
                } else {
                    stashed.advanced_to(time)
                };
                self.available = restored.kind == StatusKind::Available;
                self.on_call = restored.kind == StatusKind::CallBegin;
                if carried_over {
                    self.current = Some(restored);
                } else {
                    self.set_current(restored);
                }
            }
        }

        self.logged_in = true;
        self.last_login_time = Some(time);
        self.last_status_time = Some(time);
        self.device_id = device.map(str::to_string);
    }

    fn on_call_begin(&mut self, status: Status) {
        if !self.logged_in {
            self.pre_login = Some(status);
            return;
        }

        if self.current_kind() == Some(StatusKind::CallBegin) {
            tracing::debug!(time = status.time, "call already in progress");
            return;
        }

        let time = status.time;
        self.close_interval(time);
        let previous = self
            .current
            .take()
            .unwrap_or_else(|| Status::available(time));
        self.pending = Some(previous);
        self.on_call = true;
        self.available = false;
        self.last_status_time = Some(time);
        self.set_current(status);
    }

    fn on_call_end(&mut self, status: Status) {
        // With no status yet, the end still settles the agent into Available.
        if matches!(self.current_kind(), Some(kind) if kind != StatusKind::CallBegin) {
            tracing::debug!(time = status.time, "call end without call begin ignored");
            return;
        }

        if !self.logged_in {
            return;
        }

        let time = status.time;
        self.close_interval(time);

        let next = match self.pending.take() {
            Some(pending) => {
                self.status_counters.increment(StatusKind::CallEnd);
                pending.advanced_to(time)
            }
            None => Status::available(time),
        };
        if next.kind == StatusKind::Logout {
            self.logged_in = false;
            self.device_id = None;
        }
        self.on_call = false;
        self.available = next.kind == StatusKind::Available;
        self.last_status_time = Some(time);
        self.set_current(next);
    }

    fn current_kind(&self) -> Option<StatusKind> {
        self.current.as_ref().map(|s| s.kind)
    }

    /// Charges the time since the current status started, up to `time`.
    fn close_interval(&mut self, time: i64) {
        if let Some(current) = &self.current {
            self.timers.close_interval(current, time);
        }
    }

    fn set_current(&mut self, status: Status) {
        tracing::trace!(status = %status.kind, time = status.time, "status applied");
        self.status_counters.increment(status.kind);
        self.current = Some(status);
    }

    /// Builds an immutable view of everything accumulated so far.
    ///
    /// Fails with [`Error::EmptyResult`] until an event has been ingested.
    pub fn snapshot(&self) -> Result<WorkTimeSnapshot, Error> {
        if self.first_status_time.is_none() {
            return Err(Error::EmptyResult);
        }

        Ok(WorkTimeSnapshot {
            owner_id: self.owner_id.clone(),
            current_device_id: self.device_id.clone(),
            current_status: self.current.as_ref().map(CurrentStatus::from),
            is_logged_in: self.logged_in,
            is_on_call: self.on_call,
            is_available: self.available,
            event_counters: self.event_counters.clone(),
            status_counters: self.status_counters.clone(),
            unrecognized_events: self.unrecognized_events,
            logged_in_ms: self.timers.logged_in_total(),
            timers: self.timers.clone(),
            devices: self.devices.clone(),
            first_status_time: self.first_status_time,
            first_status_time_h: self.first_status_time.and_then(crate::snapshot::human_time),
            last_status_time: self.last_status_time,
            last_status_time_h: self.last_status_time.and_then(crate::snapshot::human_time),
            last_login_time: self.last_login_time,
            last_login_time_h: self.last_login_time.and_then(crate::snapshot::human_time),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Bucket;
    use serde_json::json;

    const OWNER: &str = "A7";
    const PHONE: &str = "SIP/101";

    fn event(kind: StatusKind, at: i64) -> StatusEvent {
        StatusEvent::new(OWNER, kind, at).on_device(PHONE)
    }

    fn strict() -> WorkTimeAccumulator {
        WorkTimeAccumulator::new(OWNER, AccumulatorOptions::default())
    }

    fn feed(acc: &mut WorkTimeAccumulator, events: &[(StatusKind, i64)]) {
        for (kind, at) in events {
            acc.ingest(&event(*kind, *at)).unwrap();
        }
    }

    #[test]
    fn shift_scenario() {
        let mut acc = strict();

        acc.ingest(&event(StatusKind::Login, 0)).unwrap();
        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Available, 0));

        acc.ingest(&event(StatusKind::Break, 1_000)).unwrap();
        assert_eq!(acc.timers().get(Bucket::Available), 1_000);

        acc.ingest(&event(StatusKind::CallBegin, 5_000)).unwrap();
        assert_eq!(acc.timers().get(Bucket::Break), 4_000);
        assert!(acc.is_on_call());

        acc.ingest(&event(StatusKind::CallEnd, 8_000)).unwrap();
        assert_eq!(acc.timers().get(Bucket::InCall), 3_000);
        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Break, 8_000));

        acc.ingest(&event(StatusKind::Logout, 9_000)).unwrap();
        assert_eq!(acc.timers().get(Bucket::Break), 5_000);
        assert!(!acc.is_logged_in());

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.logged_in_ms, 9_000);
        assert_eq!(snapshot.owner_id.as_deref(), Some(OWNER));
        assert_eq!(snapshot.current_device_id, None);
        assert_eq!(snapshot.devices, vec![PHONE.to_string()]);
    }

    #[test]
    fn duplicate_idle_status_is_suppressed() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Break, 1_000),
                (StatusKind::Break, 2_000),
                (StatusKind::Available, 3_000),
            ],
        );

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.event_counters.get(StatusKind::Break), 2);
        assert_eq!(snapshot.status_counters.get(StatusKind::Break), 1);
        assert_eq!(snapshot.timers.get(Bucket::Break), 2_000);
    }

    #[test]
    fn logged_in_total_matches_timers() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Meeting, 500),
                (StatusKind::Logout, 2_500),
                (StatusKind::Login, 10_000),
                (StatusKind::DoNotDisturb, 11_000),
                (StatusKind::OutToLunch, 12_000),
            ],
        );

        let snapshot = acc.snapshot().unwrap();
        let sum: i64 = snapshot.timers.iter().map(|(_, ms)| ms).sum();
        assert_eq!(
            sum - snapshot.timers.get(Bucket::Logout),
            snapshot.logged_in_ms
        );
        assert_eq!(snapshot.timers.get(Bucket::Logout), 7_500);
        assert_eq!(snapshot.logged_in_ms, 4_500);
    }

    #[test]
    fn call_bracket_restores_pre_call_status() {
        let mut acc = strict();
        acc.ingest(&event(StatusKind::Login, 0)).unwrap();
        acc.ingest(
            &StatusEvent {
                status_name: "Meeting".into(),
                ..event(StatusKind::Meeting, 100)
            },
        )
        .unwrap();
        feed(&mut acc, &[(StatusKind::CallBegin, 200), (StatusKind::CallEnd, 700)]);

        let current = acc.current_status().unwrap();
        assert_eq!(current.kind, StatusKind::Meeting);
        assert_eq!(current.name, "meeting");
        assert_eq!(current.time, 700);
        assert!(!acc.is_on_call());
        assert!(!acc.is_available());
        assert_eq!(acc.pending_status(), None);
    }

    #[test]
    fn call_from_available_restores_availability() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::CallBegin, 100),
                (StatusKind::CallEnd, 400),
            ],
        );

        assert!(acc.is_available());
        assert!(!acc.is_on_call());
        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.timers.get(Bucket::Available), 100);
        assert_eq!(snapshot.timers.get(Bucket::InCall), 300);
        assert_eq!(snapshot.status_counters.get(StatusKind::CallEnd), 1);
        assert_eq!(snapshot.status_counters.get(StatusKind::Available), 2);
    }

    #[test]
    fn unmatched_call_end_only_counts_the_event() {
        let mut acc = strict();
        feed(&mut acc, &[(StatusKind::Login, 0), (StatusKind::Break, 100)]);
        let before = acc.snapshot().unwrap();

        acc.ingest(&event(StatusKind::CallEnd, 200)).unwrap();
        let after = acc.snapshot().unwrap();

        assert_eq!(after.event_counters.get(StatusKind::CallEnd), 1);
        assert_eq!(after.timers, before.timers);
        assert_eq!(after.status_counters, before.status_counters);
        assert_eq!(after.current_status, before.current_status);
        assert_eq!(
            (after.is_logged_in, after.is_on_call, after.is_available),
            (before.is_logged_in, before.is_on_call, before.is_available)
        );
        assert_eq!(after.last_status_time, before.last_status_time);
    }

    #[test]
    fn status_during_call_is_deferred() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::CallBegin, 1_000),
                (StatusKind::Break, 2_000),
                (StatusKind::CallEnd, 4_000),
            ],
        );

        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Break, 4_000));
        assert_eq!(acc.timers().get(Bucket::InCall), 3_000);
        assert_eq!(acc.timers().get(Bucket::Break), 0);
    }

    #[test]
    fn logout_during_call_applies_when_call_ends() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::CallBegin, 1_000),
                (StatusKind::Logout, 2_000),
            ],
        );
        assert!(acc.is_logged_in());
        assert!(acc.is_on_call());

        acc.ingest(&event(StatusKind::CallEnd, 3_000)).unwrap();
        assert!(!acc.is_logged_in());
        assert!(!acc.is_on_call());
        assert!(!acc.is_available());

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.timers.get(Bucket::InCall), 2_000);
        assert_eq!(snapshot.current_device_id, None);
        let current = snapshot.current_status.unwrap();
        assert_eq!(current.category, StatusKind::Logout);
    }

    #[test]
    fn logout_while_logged_out_is_noop() {
        let mut acc = strict();
        feed(&mut acc, &[(StatusKind::Login, 0), (StatusKind::Logout, 1_000)]);
        let before = acc.snapshot().unwrap();

        acc.ingest(&event(StatusKind::Logout, 5_000)).unwrap();
        let after = acc.snapshot().unwrap();

        assert_eq!(after.event_counters.get(StatusKind::Logout), 2);
        assert_eq!(after.status_counters, before.status_counters);
        assert_eq!(after.timers, before.timers);
        assert_eq!(after.last_status_time, Some(1_000));
    }

    #[test]
    fn status_while_logged_out_is_restored_on_login() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Logout, 1_000),
                (StatusKind::Meeting, 2_000),
                (StatusKind::Login, 5_000),
            ],
        );

        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Meeting, 5_000));
        assert!(!acc.is_available());
        assert_eq!(acc.timers().get(Bucket::Logout), 4_000);
        assert_eq!(acc.timers().get(Bucket::Meeting), 0);
    }

    #[test]
    fn login_without_stashed_status_defaults_to_available() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Logout, 1_000),
                (StatusKind::Login, 3_000),
            ],
        );

        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Available, 3_000));
        assert!(acc.is_available());
    }

    #[test]
    fn duplicate_login_is_suppressed() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Break, 1_000),
                (StatusKind::Login, 2_000),
            ],
        );

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.event_counters.get(StatusKind::Login), 2);
        assert_eq!(snapshot.last_login_time, Some(0));
        assert_eq!(snapshot.current_status.unwrap().category, StatusKind::Break);
    }

    #[test]
    fn first_login_resets_window_and_keeps_status() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Available, 0),
                (StatusKind::Break, 10_000),
                (StatusKind::Login, 15_000),
            ],
        );

        let snapshot = acc.snapshot().unwrap();
        assert!(snapshot.timers.iter().all(|(_, ms)| ms == 0));
        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Break, 15_000));
        // The carried-over status was already counted when it became current.
        assert_eq!(snapshot.status_counters.get(StatusKind::Break), 1);
        assert_eq!(snapshot.first_status_time, Some(0));
        assert_eq!(snapshot.last_login_time, Some(15_000));
    }

    #[test]
    fn login_during_call_restores_call_without_pre_call_status() {
        // The status the agent had before the call is not known here, so the
        // call ends into Available rather than the pre-call status.
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Break, 500),
                (StatusKind::Logout, 1_000),
                (StatusKind::CallBegin, 3_000),
                (StatusKind::Login, 4_000),
            ],
        );

        assert!(acc.is_on_call());
        assert!(!acc.is_available());
        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::CallBegin, 3_000));
        assert_eq!(acc.timers().get(Bucket::Logout), 2_000);

        acc.ingest(&event(StatusKind::CallEnd, 6_000)).unwrap();
        assert_eq!(acc.timers().get(Bucket::InCall), 3_000);
        let current = acc.current_status().unwrap();
        assert_eq!((current.kind, current.time), (StatusKind::Available, 6_000));
        // Nothing was deferred, so no call end transition is counted.
        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.status_counters.get(StatusKind::CallEnd), 0);
    }

    #[test]
    fn call_end_as_first_event_defaults_to_available() {
        let mut acc = strict();
        acc.ingest(&event(StatusKind::CallEnd, 1_000)).unwrap();

        let snapshot = acc.snapshot().unwrap();
        let current = snapshot.current_status.unwrap();
        assert_eq!((current.category, current.code), (StatusKind::Available, 1));
        assert!(snapshot.is_available);
        assert!(!snapshot.is_on_call);
        assert_eq!(snapshot.last_status_time, Some(1_000));
        assert_eq!(snapshot.event_counters.get(StatusKind::CallEnd), 1);
        assert_eq!(snapshot.status_counters.get(StatusKind::CallEnd), 0);
        assert_eq!(snapshot.timers, Timers::default());
    }

    #[test]
    fn extreme_in_order_timestamps_do_not_overflow() {
        let mut acc = strict();
        feed(
            &mut acc,
            &[
                (StatusKind::Login, -5_000_000_000_000_000_000),
                (StatusKind::Break, 5_000_000_000_000_000_000),
            ],
        );

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.timers.get(Bucket::Available), i64::MAX);
        assert_eq!(snapshot.logged_in_ms, i64::MAX);
        assert_eq!(snapshot.last_status_time_h, None);
    }

    #[test]
    fn strict_mode_rejects_out_of_order_event() {
        let mut acc = strict();
        feed(&mut acc, &[(StatusKind::Login, 0), (StatusKind::Break, 5_000)]);
        let before = acc.snapshot().unwrap();

        let err = acc.ingest(&event(StatusKind::Available, 4_000)).unwrap_err();
        assert_eq!(
            err,
            Error::ChronologyViolation {
                last: 5_000,
                given: 4_000
            }
        );
        assert_eq!(acc.snapshot().unwrap(), before);
    }

    #[test]
    fn lenient_mode_accepts_out_of_order_event() {
        let mut acc = WorkTimeAccumulator::new(OWNER, AccumulatorOptions::lenient());
        feed(
            &mut acc,
            &[
                (StatusKind::Login, 0),
                (StatusKind::Break, 5_000),
                (StatusKind::Available, 4_000),
            ],
        );

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.current_status.unwrap().category, StatusKind::Available);
        assert!(snapshot.timers.iter().all(|(_, ms)| ms >= 0));
    }

    #[test]
    fn strict_mode_rejects_foreign_owner() {
        let mut acc = strict();
        let err = acc
            .ingest(&StatusEvent::new("B2", StatusKind::Login, 0))
            .unwrap_err();
        assert!(matches!(err, Error::OwnerMismatch { .. }));
        assert_eq!(acc.snapshot().unwrap_err(), Error::EmptyResult);

        let mut lenient = WorkTimeAccumulator::new(OWNER, AccumulatorOptions::lenient());
        lenient
            .ingest(&StatusEvent::new("B2", StatusKind::Login, 0))
            .unwrap();
        assert!(lenient.snapshot().is_ok());
    }

    #[test]
    fn unbound_accumulator_accepts_any_owner() {
        let mut acc = WorkTimeAccumulator::unbound(AccumulatorOptions::default());
        acc.ingest(&StatusEvent::new("B2", StatusKind::Login, 0)).unwrap();
        acc.ingest(&StatusEvent::new("C3", StatusKind::Break, 10)).unwrap();
        assert_eq!(acc.snapshot().unwrap().owner_id, None);
    }

    #[test]
    fn device_change_while_logged_in() {
        let mut acc = strict();
        acc.ingest(&event(StatusKind::Login, 0)).unwrap();

        let moved = StatusEvent::new(OWNER, StatusKind::Break, 100).on_device("SIP/202");
        let err = acc.ingest(&moved).unwrap_err();
        assert_eq!(
            err,
            Error::DeviceMismatch {
                expected: PHONE.into(),
                given: Some("SIP/202".into())
            }
        );

        let unchecked = AccumulatorOptions {
            check_device_id: false,
            ..AccumulatorOptions::default()
        };
        let mut acc = WorkTimeAccumulator::new(OWNER, unchecked);
        acc.ingest(&event(StatusKind::Login, 0)).unwrap();
        acc.ingest(&moved).unwrap();
        assert_eq!(
            acc.snapshot().unwrap().devices,
            vec![PHONE.to_string(), "SIP/202".to_string()]
        );
    }

    #[test]
    fn device_is_released_on_logout() {
        let mut acc = strict();
        feed(&mut acc, &[(StatusKind::Login, 0), (StatusKind::Logout, 100)]);

        let elsewhere = StatusEvent::new(OWNER, StatusKind::Login, 200).on_device("SIP/202");
        acc.ingest(&elsewhere).unwrap();

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.current_device_id.as_deref(), Some("SIP/202"));
        assert_eq!(snapshot.devices, vec![PHONE.to_string(), "SIP/202".to_string()]);
    }

    #[test]
    fn unrecognized_status_is_ignored() {
        let mut acc = strict();
        acc.ingest(&event(StatusKind::Login, 0)).unwrap();
        acc.ingest(&StatusEvent {
            status_code: 42,
            status_name: "training".into(),
            ..event(StatusKind::Login, 100)
        })
        .unwrap();

        let snapshot = acc.snapshot().unwrap();
        assert_eq!(snapshot.unrecognized_events, 1);
        assert_eq!(snapshot.event_counters.total(), 1);
        assert_eq!(snapshot.current_status.unwrap().category, StatusKind::Available);
    }

    #[test]
    fn snapshot_requires_an_event() {
        let acc = strict();
        assert_eq!(acc.snapshot().unwrap_err(), Error::EmptyResult);
    }

    #[test]
    fn ingest_record_uses_configured_fields() {
        let options = AccumulatorOptions {
            time_field_name: "ts".into(),
            ..AccumulatorOptions::default()
        };
        let mut acc = WorkTimeAccumulator::new(OWNER, options);
        acc.ingest_record(&json!({"userId": OWNER, "statusId": 7, "statusName": "login", "ts": 0}))
            .unwrap();
        acc.ingest_record(&json!({"userId": OWNER, "statusId": 4, "statusName": "Break", "ts": 60_000}))
            .unwrap();

        assert_eq!(acc.timers().get(Bucket::Available), 60_000);

        let err = acc
            .ingest_record(&json!({"userId": OWNER, "statusId": 1, "statusTime": 70_000}))
            .unwrap_err();
        assert!(matches!(err, Error::Extract(_)));
    }

    #[test]
    fn on_call_and_available_never_both_set() {
        let mut acc = strict();
        let script = [
            (StatusKind::Login, 0),
            (StatusKind::Available, 10),
            (StatusKind::CallBegin, 20),
            (StatusKind::Available, 30),
            (StatusKind::CallBegin, 40),
            (StatusKind::CallEnd, 50),
            (StatusKind::Logout, 60),
            (StatusKind::CallBegin, 70),
            (StatusKind::Login, 80),
            (StatusKind::CallEnd, 90),
        ];
        for (kind, at) in script {
            acc.ingest(&event(kind, at)).unwrap();
            assert!(!(acc.is_on_call() && acc.is_available()), "after {kind} at {at}");
        }
    }
}
