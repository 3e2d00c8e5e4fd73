// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciliation store.
//!
//! Owns every attendance record, the set of students currently checked in,
//! the recent-update log, pending optimistic edits, the connection status
//! and the error feed. Mutations never fail: problems are recorded as
//! state and reported through [`Reconciled`] or the error feed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::codec::{self, RawMessage};
use crate::event::{Event, EventKind};
use crate::feed::{
    Capped, ErrorKind, FeedError, RecentUpdate, ERROR_FEED_CAPACITY, RECENT_UPDATE_CAPACITY,
};
use crate::optimistic::{OptimisticId, PendingOptimisticUpdate};
use crate::record::{AttendanceRecord, AttendanceStatus, RecordKey, RecordPatch, ScheduleId, StudentId};
use crate::stats::ScheduleStats;
use crate::status::ConnectionStatus;

/// A student checked in with no check-out yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub schedule_id: ScheduleId,
    pub student_id: StudentId,
    pub checked_in_at: DateTime<Utc>,
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Branch that ran.
    pub kind: EventKind,
    /// Records created or changed.
    pub touched: Vec<RecordKey>,
    /// Bulk entries skipped, with reasons.
    pub rejected: Vec<String>,
}

impl Reconciled {
    /// True when nothing in the record maps changed.
    pub fn is_noop(&self) -> bool {
        self.touched.is_empty()
    }
}

pub struct AttendanceStore {
    clock: Arc<dyn Clock>,
    records: BTreeMap<ScheduleId, BTreeMap<StudentId, AttendanceRecord>>,
    active: BTreeMap<ScheduleId, BTreeMap<StudentId, ActiveSession>>,
    recent: Capped<RecentUpdate>,
    pending: Vec<PendingOptimisticUpdate>,
    status: ConnectionStatus,
    errors: Capped<FeedError>,
    applied: u64,
    next_id: u64,
}

impl fmt::Debug for AttendanceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttendanceStore")
            .field("schedules", &self.records.len())
            .field("recent", &self.recent.len())
            .field("pending", &self.pending.len())
            .field("status", &self.status)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

impl Default for AttendanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttendanceStore {
    /// Creates an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store that stamps times from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        AttendanceStore {
            clock,
            records: BTreeMap::new(),
            active: BTreeMap::new(),
            recent: Capped::new(RECENT_UPDATE_CAPACITY),
            pending: Vec::new(),
            status: ConnectionStatus::disconnected(),
            errors: Capped::new(ERROR_FEED_CAPACITY),
            applied: 0,
            next_id: 0,
        }
    }

    /// Drops all state. Optimistic ids keep increasing so stale handles
    /// never match a new edit.
    pub fn reset(&mut self) {
        self.records.clear();
        self.active.clear();
        self.recent.clear();
        self.pending.clear();
        self.status = ConnectionStatus::disconnected();
        self.errors.clear();
    }

    // -- queries --

    /// Returns every record of a schedule, ordered by student id.
    pub fn get_schedule_attendance(&self, schedule_id: &str) -> Vec<&AttendanceRecord> {
        self.records
            .get(schedule_id)
            .map(|students| students.values().collect())
            .unwrap_or_default()
    }

    pub fn get_student_attendance(
        &self,
        schedule_id: &str,
        student_id: &str,
    ) -> Option<&AttendanceRecord> {
        self.records.get(schedule_id)?.get(student_id)
    }

    pub fn get_schedule_stats(&self, schedule_id: &str) -> ScheduleStats {
        let active = self.active.get(schedule_id).map_or(0, BTreeMap::len);
        match self.records.get(schedule_id) {
            Some(students) => ScheduleStats::tally(students.values(), active),
            None => ScheduleStats::tally(std::iter::empty(), active),
        }
    }

    pub fn has_active_session(&self, schedule_id: &str, student_id: &str) -> bool {
        self.active
            .get(schedule_id)
            .is_some_and(|students| students.contains_key(student_id))
    }

    /// Returns the students of a schedule currently checked in.
    pub fn active_sessions(&self, schedule_id: &str) -> Vec<&ActiveSession> {
        self.active
            .get(schedule_id)
            .map(|students| students.values().collect())
            .unwrap_or_default()
    }

    /// Iterates the ids of every schedule holding at least one record.
    pub fn schedule_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of events applied since the store was created. Unlike the
    /// recent-update log this never wraps.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Iterates the recent-update log, newest first.
    pub fn recent_updates(&self) -> impl Iterator<Item = &RecentUpdate> {
        self.recent.iter()
    }

    /// Returns optimistic edits still awaiting confirm or revert, oldest first.
    pub fn pending_updates(&self) -> &[PendingOptimisticUpdate] {
        &self.pending
    }

    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Iterates the error feed, newest first.
    pub fn errors(&self) -> impl Iterator<Item = &FeedError> {
        self.errors.iter()
    }

    // -- mutations --

    /// Decodes and applies a wire message.
    ///
    /// A message that fails to decode is dropped and recorded in the error
    /// feed; the record maps are left untouched.
    pub fn handle_raw<'a>(&mut self, raw: impl Into<RawMessage<'a>>) -> Option<Reconciled> {
        match codec::decode(raw) {
            Ok(event) => Some(self.handle_event(event)),
            Err(e) => {
                self.add_error(ErrorKind::Decode, e.to_string());
                None
            }
        }
    }

    /// Applies an authoritative event. Clears the optimistic flag on every
    /// record it touches.
    pub fn handle_event(&mut self, event: Event) -> Reconciled {
        self.apply(event, false)
    }

    /// Replaces the connection status.
    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Applies a speculative edit and returns a handle to confirm or revert it.
    pub fn add_optimistic_update(&mut self, event: Event) -> OptimisticId {
        self.next_id += 1;
        let id = OptimisticId::new(self.next_id);
        self.pending.push(PendingOptimisticUpdate {
            id,
            kind: event.kind(),
            event: event.clone(),
            created_at: self.clock.now(),
        });
        self.apply(event, true);
        id
    }

    /// Forgets a pending edit. The record keeps its optimistic flag until an
    /// authoritative event for it arrives.
    pub fn confirm_optimistic_update(&mut self, id: OptimisticId) -> bool {
        self.take_pending(id).is_some()
    }

    /// Forgets a pending edit and deletes every record it touched that is
    /// still optimistic. Returns false for an unknown id.
    pub fn revert_optimistic_update(&mut self, id: OptimisticId) -> bool {
        let Some(pending) = self.take_pending(id) else {
            return false;
        };
        for key in pending.event.keys() {
            let still_optimistic = self
                .get_student_attendance(&key.schedule_id, &key.student_id)
                .is_some_and(|record| record.is_optimistic);
            if still_optimistic {
                self.remove_record(&key);
            }
        }
        true
    }

    pub fn add_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(FeedError {
            kind,
            message: message.into(),
            at: self.clock.now(),
        });
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Removes a schedule's records, active sessions and pending edits.
    /// Returns how many records were removed.
    pub fn clear_session(&mut self, schedule_id: &str) -> usize {
        let removed = self.records.remove(schedule_id).map_or(0, |s| s.len());
        self.active.remove(schedule_id);
        self.pending
            .retain(|p| p.event.schedule_id() != Some(schedule_id));
        removed
    }

    fn take_pending(&mut self, id: OptimisticId) -> Option<PendingOptimisticUpdate> {
        let index = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(index))
    }

    fn remove_record(&mut self, key: &RecordKey) {
        if let Some(students) = self.records.get_mut(&key.schedule_id) {
            students.remove(&key.student_id);
            if students.is_empty() {
                self.records.remove(&key.schedule_id);
            }
        }
        self.close_session(&key.schedule_id, &key.student_id);
    }

    fn close_session(&mut self, schedule_id: &str, student_id: &str) {
        if let Some(students) = self.active.get_mut(schedule_id) {
            students.remove(student_id);
            if students.is_empty() {
                self.active.remove(schedule_id);
            }
        }
    }

    fn apply(&mut self, event: Event, optimistic: bool) -> Reconciled {
        let now = self.clock.now();
        let mut touched = Vec::new();
        let mut rejected = Vec::new();

        match &event {
            Event::AttendanceUpdate(patch) => {
                upsert(&mut self.records, &patch.schedule_id, patch, optimistic);
                touched.push(patch.key());
            }
            Event::StudentCheckedIn(patch) => {
                let record = upsert(&mut self.records, &patch.schedule_id, patch, optimistic);
                let at = patch.check_in_time.unwrap_or(now);
                record.status = AttendanceStatus::Present;
                record.check_in_time = Some(at);
                self.active
                    .entry(patch.schedule_id.clone())
                    .or_default()
                    .insert(
                        patch.student_id.clone(),
                        ActiveSession {
                            schedule_id: patch.schedule_id.clone(),
                            student_id: patch.student_id.clone(),
                            checked_in_at: at,
                        },
                    );
                touched.push(patch.key());
            }
            Event::StudentCheckedOut(patch) => {
                let record = upsert(&mut self.records, &patch.schedule_id, patch, optimistic);
                record.check_out_time = Some(patch.check_out_time.unwrap_or(now));
                self.close_session(&patch.schedule_id, &patch.student_id);
                touched.push(patch.key());
            }
            Event::StatusChange(change) => {
                let mut patch = RecordPatch::new(change.schedule_id.clone(), change.student_id.clone())
                    .with_status(change.status);
                patch.student_name = change.student_name.clone();
                let record = upsert(&mut self.records, &change.schedule_id, &patch, optimistic);
                record.updated_at = Some(now);
                touched.push(patch.key());
            }
            Event::ManualOverride(patch) => {
                let record = upsert(&mut self.records, &patch.schedule_id, patch, optimistic);
                record.is_manual_override = true;
                touched.push(patch.key());
            }
            Event::BulkUpdate(bulk) => {
                for patch in &bulk.updates {
                    upsert(&mut self.records, &bulk.schedule_id, patch, optimistic);
                    touched.push(RecordKey::new(bulk.schedule_id.clone(), patch.student_id.clone()));
                }
                rejected.extend(bulk.rejected.iter().cloned());
            }
            Event::Unknown(_) => {}
        }

        let kind = event.kind();
        self.applied += 1;
        self.recent.push(RecentUpdate {
            tag: kind,
            event,
            received_at: now,
            optimistic,
        });

        Reconciled {
            kind,
            touched,
            rejected,
        }
    }
}

/// Merges a patch into the record under `schedule_id`, creating it if absent.
fn upsert<'a>(
    records: &'a mut BTreeMap<ScheduleId, BTreeMap<StudentId, AttendanceRecord>>,
    schedule_id: &str,
    patch: &RecordPatch,
    optimistic: bool,
) -> &'a mut AttendanceRecord {
    let record = records
        .entry(schedule_id.to_string())
        .or_default()
        .entry(patch.student_id.clone())
        .or_insert_with(|| AttendanceRecord::new(schedule_id, patch.student_id.clone()));
    record.merge(patch);
    record.is_optimistic = optimistic;
    record
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
