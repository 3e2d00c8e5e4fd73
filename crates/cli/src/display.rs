// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use rc_core::{AttendanceRecord, ConnectionStatus, Event, RecentUpdate, ScheduleStats};

const TIME_FORMAT: &str = "%H:%M:%S";

fn clock_time(at: &DateTime<Utc>) -> String {
    at.format(TIME_FORMAT).to_string()
}

/// Format one applied event for the live feed.
///
/// Format: `[HH:MM:SS] kind schedule/student detail`
pub fn format_update(update: &RecentUpdate) -> String {
    let mut line = format!(
        "[{}] {} {}",
        clock_time(&update.received_at),
        update.event.type_name(),
        event_subject(&update.event)
    );
    if let Some(detail) = event_detail(&update.event) {
        line.push(' ');
        line.push_str(&detail);
    }
    if update.optimistic {
        line.push_str(" (optimistic)");
    }
    line.trim_end().to_string()
}

fn event_subject(event: &Event) -> String {
    match event {
        Event::BulkUpdate(bulk) => bulk.schedule_id.clone(),
        Event::Unknown(_) => String::new(),
        other => other
            .keys()
            .first()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

fn event_detail(event: &Event) -> Option<String> {
    match event {
        Event::StatusChange(change) => Some(change.status.to_string()),
        Event::AttendanceUpdate(patch) | Event::ManualOverride(patch) => {
            patch.status.map(|status| status.to_string())
        }
        Event::BulkUpdate(bulk) => {
            let mut detail = format!("({} students", bulk.updates.len());
            if !bulk.rejected.is_empty() {
                detail.push_str(&format!(", {} skipped", bulk.rejected.len()));
            }
            detail.push(')');
            Some(detail)
        }
        _ => None,
    }
}

/// Format the counts of one schedule on a single line.
pub fn format_stats(schedule_id: &str, stats: &ScheduleStats) -> String {
    format!(
        "{}: {} total, {} present, {} late, {} absent, {} excused, {} checked in",
        schedule_id,
        stats.total,
        stats.present,
        stats.late,
        stats.absent,
        stats.excused,
        stats.active_sessions
    )
}

/// Format one record as an indented table row.
pub fn format_record(record: &AttendanceRecord) -> String {
    let mut line = format!("  {:<10} {:<8}", record.student_id, record.status.as_str());
    if !record.student_name.is_empty() {
        line.push_str(&format!(" {}", record.student_name));
    }
    if let Some(at) = &record.check_in_time {
        line.push_str(&format!(" in {}", clock_time(at)));
    }
    if let Some(at) = &record.check_out_time {
        line.push_str(&format!(" out {}", clock_time(at)));
    }
    if record.is_manual_override {
        line.push_str(" [override]");
    }
    line
}

/// Format the connection status for a log line.
pub fn format_status(status: &ConnectionStatus) -> String {
    match status.transport {
        Some(transport) if status.connected => format!("connected ({transport})"),
        _ => "disconnected".to_string(),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
