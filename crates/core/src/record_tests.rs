// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use yare::parameterized;

#[parameterized(
    present = { "present", AttendanceStatus::Present },
    late = { "late", AttendanceStatus::Late },
    absent = { "absent", AttendanceStatus::Absent },
    excused = { "excused", AttendanceStatus::Excused },
)]
fn status_parses_wire_names(name: &str, expected: AttendanceStatus) {
    assert_eq!(name.parse::<AttendanceStatus>().unwrap(), expected);
    assert_eq!(expected.as_str(), name);
}

#[test]
fn status_rejects_unknown_names() {
    assert!("tardy".parse::<AttendanceStatus>().is_err());
}

#[test]
fn new_record_defaults_to_absent() {
    let record = AttendanceRecord::new("sched-1", "stu-1");
    assert_eq!(record.status, AttendanceStatus::Absent);
    assert!(!record.is_manual_override);
    assert!(!record.is_optimistic);
    assert!(record.check_in_time.is_none());
}

#[test]
fn merge_preserves_unset_fields() {
    let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    let mut record = AttendanceRecord::new("sched-1", "stu-1");
    record.merge(
        &RecordPatch::new("sched-1", "stu-1")
            .with_student_name("Ada")
            .with_status(AttendanceStatus::Present)
            .with_check_in_time(at),
    );

    // Second patch only touches the status
    record.merge(&RecordPatch::new("sched-1", "stu-1").with_status(AttendanceStatus::Late));

    assert_eq!(record.student_name, "Ada");
    assert_eq!(record.status, AttendanceStatus::Late);
    assert_eq!(record.check_in_time, Some(at));
}

#[test]
fn patch_accepts_numeric_ids() {
    let patch: RecordPatch =
        serde_json::from_str(r#"{"scheduleId": 42, "studentId": "s-7"}"#).unwrap();
    assert_eq!(patch.schedule_id, "42");
    assert_eq!(patch.student_id, "s-7");
}

#[test]
fn patch_requires_student_id() {
    let result: std::result::Result<RecordPatch, _> =
        serde_json::from_str(r#"{"scheduleId": 42}"#);
    let err = result.unwrap_err().to_string();
    assert!(err.contains("studentId"));
}

#[test]
fn patch_rejects_empty_ids() {
    let result: std::result::Result<RecordPatch, _> =
        serde_json::from_str(r#"{"scheduleId": "", "studentId": "s-7"}"#);
    assert!(result.is_err());
}

#[test]
fn record_serializes_camel_case() {
    let record = AttendanceRecord::new("sched-1", "stu-1");
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"scheduleId\":\"sched-1\""));
    assert!(json.contains("\"isOptimistic\":false"));
    assert!(!json.contains("checkInTime"));
}

#[test]
fn record_key_display() {
    assert_eq!(RecordKey::new("a", "b").to_string(), "a/b");
}
