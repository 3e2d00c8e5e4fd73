// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The attendance event taxonomy.
//!
//! Six event types are recognised. Anything else decodes to
//! [`Event::Unknown`], which is logged but never changes state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::{id_from_wire, AttendanceStatus, RecordKey, RecordPatch, ScheduleId, StudentId};

/// Discriminator of an [`Event`], matching the wire `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AttendanceUpdate,
    StudentCheckedIn,
    StudentCheckedOut,
    StatusChange,
    ManualOverride,
    BulkUpdate,
    Unknown,
}

impl EventKind {
    /// The six recognised kinds, in wire order.
    pub const RECOGNIZED: [EventKind; 6] = [
        EventKind::AttendanceUpdate,
        EventKind::StudentCheckedIn,
        EventKind::StudentCheckedOut,
        EventKind::StatusChange,
        EventKind::ManualOverride,
        EventKind::BulkUpdate,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AttendanceUpdate => "attendance_update",
            EventKind::StudentCheckedIn => "student_checked_in",
            EventKind::StudentCheckedOut => "student_checked_out",
            EventKind::StatusChange => "status_change",
            EventKind::ManualOverride => "manual_override",
            EventKind::BulkUpdate => "bulk_update",
            EventKind::Unknown => "unknown",
        }
    }

    /// Looks up a recognised kind by wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        EventKind::RECOGNIZED
            .into_iter()
            .find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `status_change` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    #[serde(deserialize_with = "id_from_wire")]
    pub schedule_id: ScheduleId,
    #[serde(deserialize_with = "id_from_wire")]
    pub student_id: StudentId,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

/// Payload of a `bulk_update` event.
///
/// Entries that failed to decode are kept as reasons in `rejected` so that
/// one bad entry never blocks the rest of the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdate {
    pub schedule_id: ScheduleId,
    pub updates: Vec<RecordPatch>,
    #[serde(skip)]
    pub rejected: Vec<String>,
}

/// An event whose `type` is not one of the recognised kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEvent {
    pub kind: String,
    pub payload: serde_json::Value,
}

/// A decoded attendance event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Merge the payload into the record.
    AttendanceUpdate(RecordPatch),
    /// Student arrived: status becomes present and an active session opens.
    StudentCheckedIn(RecordPatch),
    /// Student left: check-out time is set and the active session closes.
    StudentCheckedOut(RecordPatch),
    /// Status set directly.
    StatusChange(StatusChange),
    /// Staff override; the record is flagged as manually overridden.
    ManualOverride(RecordPatch),
    /// Several students of one schedule at once.
    BulkUpdate(BulkUpdate),
    /// Forwarded for logging only.
    Unknown(UnknownEvent),
}

impl Event {
    /// Creates a check-in event for the given student.
    pub fn check_in(schedule_id: impl Into<ScheduleId>, student_id: impl Into<StudentId>) -> Self {
        Event::StudentCheckedIn(RecordPatch::new(schedule_id, student_id))
    }

    /// Creates a check-out event for the given student.
    pub fn check_out(schedule_id: impl Into<ScheduleId>, student_id: impl Into<StudentId>) -> Self {
        Event::StudentCheckedOut(RecordPatch::new(schedule_id, student_id))
    }

    /// Creates a status change event.
    pub fn status_change(
        schedule_id: impl Into<ScheduleId>,
        student_id: impl Into<StudentId>,
        status: AttendanceStatus,
    ) -> Self {
        Event::StatusChange(StatusChange {
            schedule_id: schedule_id.into(),
            student_id: student_id.into(),
            status,
            student_name: None,
        })
    }

    /// Creates a bulk update for one schedule.
    pub fn bulk(schedule_id: impl Into<ScheduleId>, updates: Vec<RecordPatch>) -> Self {
        Event::BulkUpdate(BulkUpdate {
            schedule_id: schedule_id.into(),
            updates,
            rejected: Vec::new(),
        })
    }

    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AttendanceUpdate(_) => EventKind::AttendanceUpdate,
            Event::StudentCheckedIn(_) => EventKind::StudentCheckedIn,
            Event::StudentCheckedOut(_) => EventKind::StudentCheckedOut,
            Event::StatusChange(_) => EventKind::StatusChange,
            Event::ManualOverride(_) => EventKind::ManualOverride,
            Event::BulkUpdate(_) => EventKind::BulkUpdate,
            Event::Unknown(_) => EventKind::Unknown,
        }
    }

    /// Returns the wire `type` string, which differs from [`Event::kind`]
    /// only for unknown events.
    pub fn type_name(&self) -> &str {
        match self {
            Event::Unknown(unknown) => &unknown.kind,
            other => other.kind().as_str(),
        }
    }

    /// Returns the schedule this event belongs to, if known.
    pub fn schedule_id(&self) -> Option<&str> {
        match self {
            Event::AttendanceUpdate(p)
            | Event::StudentCheckedIn(p)
            | Event::StudentCheckedOut(p)
            | Event::ManualOverride(p) => Some(&p.schedule_id),
            Event::StatusChange(c) => Some(&c.schedule_id),
            Event::BulkUpdate(b) => Some(&b.schedule_id),
            Event::Unknown(_) => None,
        }
    }

    /// Returns the keys of every record this event touches.
    pub fn keys(&self) -> Vec<RecordKey> {
        match self {
            Event::AttendanceUpdate(p)
            | Event::StudentCheckedIn(p)
            | Event::StudentCheckedOut(p)
            | Event::ManualOverride(p) => vec![p.key()],
            Event::StatusChange(c) => vec![RecordKey::new(c.schedule_id.clone(), c.student_id.clone())],
            Event::BulkUpdate(b) => b
                .updates
                .iter()
                .map(|p| RecordKey::new(b.schedule_id.clone(), p.student_id.clone()))
                .collect(),
            Event::Unknown(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
