// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Attendance records and the partial updates merged into them.
//!
//! A record is keyed by `(schedule_id, student_id)`. Every incoming event
//! carries a [`RecordPatch`]: fields that are present overwrite the record,
//! absent fields leave it untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Identifier of one scheduled class meeting.
pub type ScheduleId = String;

/// Identifier of one student.
pub type StudentId = String;

/// Attendance status of a student within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

impl AttendanceStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excused => "excused",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "absent" => Ok(AttendanceStatus::Absent),
            "excused" => Ok(AttendanceStatus::Excused),
            other => Err(DecodeError::InvalidStatus(other.to_string())),
        }
    }
}

/// Composite key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub schedule_id: ScheduleId,
    pub student_id: StudentId,
}

impl RecordKey {
    pub fn new(schedule_id: impl Into<ScheduleId>, student_id: impl Into<StudentId>) -> Self {
        RecordKey {
            schedule_id: schedule_id.into(),
            student_id: student_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.schedule_id, self.student_id)
    }
}

/// One student's attendance state for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub schedule_id: ScheduleId,
    pub student_id: StudentId,
    #[serde(default)]
    pub student_name: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_manual_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Set while the record reflects an unconfirmed local edit.
    #[serde(default)]
    pub is_optimistic: bool,
}

impl AttendanceRecord {
    /// Creates an empty record for the given key.
    ///
    /// A student with no recorded status counts as absent.
    pub fn new(schedule_id: impl Into<ScheduleId>, student_id: impl Into<StudentId>) -> Self {
        AttendanceRecord {
            schedule_id: schedule_id.into(),
            student_id: student_id.into(),
            student_name: String::new(),
            status: AttendanceStatus::Absent,
            check_in_time: None,
            check_out_time: None,
            is_manual_override: false,
            override_by: None,
            override_reason: None,
            updated_at: None,
            is_optimistic: false,
        }
    }

    /// Returns the key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.schedule_id.clone(), self.student_id.clone())
    }

    /// Overwrites every field the patch carries.
    pub fn merge(&mut self, patch: &RecordPatch) {
        if let Some(name) = &patch.student_name {
            self.student_name = name.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(at) = patch.check_in_time {
            self.check_in_time = Some(at);
        }
        if let Some(at) = patch.check_out_time {
            self.check_out_time = Some(at);
        }
        if let Some(flag) = patch.is_manual_override {
            self.is_manual_override = flag;
        }
        if let Some(by) = &patch.override_by {
            self.override_by = Some(by.clone());
        }
        if let Some(reason) = &patch.override_reason {
            self.override_reason = Some(reason.clone());
        }
        if let Some(at) = patch.updated_at {
            self.updated_at = Some(at);
        }
    }
}

/// Partial record carried by an event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(deserialize_with = "id_from_wire")]
    pub schedule_id: ScheduleId,
    #[serde(deserialize_with = "id_from_wire")]
    pub student_id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_manual_override: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecordPatch {
    /// Creates a patch that only names its record.
    pub fn new(schedule_id: impl Into<ScheduleId>, student_id: impl Into<StudentId>) -> Self {
        RecordPatch {
            schedule_id: schedule_id.into(),
            student_id: student_id.into(),
            student_name: None,
            status: None,
            check_in_time: None,
            check_out_time: None,
            is_manual_override: None,
            override_by: None,
            override_reason: None,
            updated_at: None,
        }
    }

    /// Returns the key of the record this patch targets.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.schedule_id.clone(), self.student_id.clone())
    }

    pub fn with_status(mut self, status: AttendanceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_student_name(mut self, name: impl Into<String>) -> Self {
        self.student_name = Some(name.into());
        self
    }

    pub fn with_check_in_time(mut self, at: DateTime<Utc>) -> Self {
        self.check_in_time = Some(at);
        self
    }

    pub fn with_check_out_time(mut self, at: DateTime<Utc>) -> Self {
        self.check_out_time = Some(at);
        self
    }

    pub fn with_override(mut self, by: impl Into<String>, reason: impl Into<String>) -> Self {
        self.override_by = Some(by.into());
        self.override_reason = Some(reason.into());
        self
    }
}

/// Accepts identifiers sent either as JSON strings or integers.
pub(crate) fn id_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    match WireId::deserialize(deserializer)? {
        WireId::Text(s) if s.is_empty() => Err(serde::de::Error::custom("identifier is empty")),
        WireId::Text(s) => Ok(s),
        WireId::Signed(n) => Ok(n.to_string()),
        WireId::Unsigned(n) => Ok(n.to_string()),
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
