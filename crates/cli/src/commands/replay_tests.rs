// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use rc_core::AttendanceStatus;

const CAPTURE: &str = r#"
{"type":"student_checked_in","payload":{"scheduleId":"s1","studentId":"u1","studentName":"Ada"}}
{"type":"status_change","payload":{"scheduleId":"s1","studentId":"u2","status":"late"}}
not json at all

{"type":"student_checked_in","payload":{"scheduleId":"s2","studentId":"u9"}}
{"type":"roster_sync","payload":{}}
"#;

fn replayed() -> (AttendanceStore, ReplaySummary) {
    let mut store = AttendanceStore::new();
    let summary = replay_into(&mut store, CAPTURE);
    (store, summary)
}

fn render(schedule: Option<&str>, output: OutputFormat) -> String {
    let (store, summary) = replayed();
    let mut out = Vec::new();
    run_impl(&store, &summary, schedule, output, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn counts_lines_and_failures() {
    let (store, summary) = replayed();
    assert_eq!(
        summary,
        ReplaySummary {
            lines: 5,
            applied: 4,
            undecodable: 1,
        }
    );
    assert_eq!(store.errors().count(), 1);
    assert_eq!(
        store.get_student_attendance("s1", "u2").unwrap().status,
        AttendanceStatus::Late
    );
}

#[test]
fn text_lists_every_schedule() {
    let text = render(None, OutputFormat::Text);
    assert!(text.contains("s1: 2 total, 1 present, 1 late, 0 absent, 0 excused, 1 checked in"));
    assert!(text.contains("s2: 1 total"));
    assert!(text.contains("Ada"));
    assert!(text.ends_with("replayed 5 messages: 4 applied, 1 undecodable\n"));
}

#[test]
fn text_filters_by_schedule() {
    let text = render(Some("s2"), OutputFormat::Text);
    assert!(text.contains("s2: 1 total"));
    assert!(!text.contains("s1:"));
}

#[test]
fn json_report() {
    let json: serde_json::Value = serde_json::from_str(&render(Some("s1"), OutputFormat::Json)).unwrap();

    assert_eq!(json["lines"], 5);
    assert_eq!(json["undecodable"], 1);
    assert_eq!(json["schedules"][0]["scheduleId"], "s1");
    assert_eq!(json["schedules"][0]["stats"]["present"], 1);
    assert_eq!(json["schedules"][0]["records"].as_array().unwrap().len(), 2);
    assert_eq!(json["schedules"][0]["activeSessions"][0]["studentId"], "u1");
    assert_eq!(json["errors"][0]["kind"], "decode");
}

#[test]
fn unseen_schedule_is_empty() {
    let text = render(Some("nope"), OutputFormat::Text);
    assert!(text.starts_with("nope: 0 total"));
}
