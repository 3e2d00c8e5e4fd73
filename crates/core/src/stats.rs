// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use crate::record::{AttendanceRecord, AttendanceStatus};

/// Per-schedule counts for a dashboard view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
    pub active_sessions: usize,
}

impl ScheduleStats {
    /// Tallies records in a single pass.
    pub fn tally<'a>(
        records: impl IntoIterator<Item = &'a AttendanceRecord>,
        active_sessions: usize,
    ) -> Self {
        let mut stats = ScheduleStats {
            active_sessions,
            ..ScheduleStats::default()
        };
        for record in records {
            stats.total += 1;
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::Excused => stats.excused += 1,
            }
        }
        stats
    }
}
