// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    attendance_update = { EventKind::AttendanceUpdate },
    checked_in = { EventKind::StudentCheckedIn },
    checked_out = { EventKind::StudentCheckedOut },
    status_change = { EventKind::StatusChange },
    manual_override = { EventKind::ManualOverride },
    bulk_update = { EventKind::BulkUpdate },
)]
fn recognized_kinds_resolve_from_wire_name(kind: EventKind) {
    assert_eq!(EventKind::from_wire(kind.as_str()), Some(kind));
}

#[test]
fn unknown_kind_is_not_recognized() {
    assert_eq!(EventKind::from_wire("unknown"), None);
    assert_eq!(EventKind::from_wire("session_started"), None);
}

#[test]
fn bulk_keys_cover_every_entry() {
    let event = Event::bulk(
        "s1",
        vec![RecordPatch::new("s1", "u1"), RecordPatch::new("s1", "u2")],
    );
    let keys = event.keys();
    assert_eq!(keys, vec![RecordKey::new("s1", "u1"), RecordKey::new("s1", "u2")]);
}

#[test]
fn status_change_keys_and_schedule() {
    let event = Event::status_change("s1", "u1", AttendanceStatus::Late);
    assert_eq!(event.kind(), EventKind::StatusChange);
    assert_eq!(event.schedule_id(), Some("s1"));
    assert_eq!(event.keys(), vec![RecordKey::new("s1", "u1")]);
}
