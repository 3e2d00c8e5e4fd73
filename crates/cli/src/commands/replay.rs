// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline replay of a captured message log.

use std::fs;
use std::io::Write;
use std::path::Path;

use rc_core::{ActiveSession, AttendanceRecord, AttendanceStore, FeedError, ScheduleStats};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::display::{format_record, format_stats};
use crate::error::Result;

/// Counts of one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Non-blank input lines.
    pub lines: usize,
    pub applied: usize,
    pub undecodable: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleReport<'a> {
    schedule_id: &'a str,
    stats: ScheduleStats,
    records: Vec<&'a AttendanceRecord>,
    active_sessions: Vec<&'a ActiveSession>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    #[serde(flatten)]
    summary: ReplaySummary,
    schedules: Vec<ScheduleReport<'a>>,
    errors: Vec<&'a FeedError>,
}

pub fn run(file: &Path, schedule: Option<&str>, output: OutputFormat) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let mut store = AttendanceStore::new();
    let summary = replay_into(&mut store, &content);
    run_impl(&store, &summary, schedule, output, &mut std::io::stdout())
}

/// Applies every non-blank line of `content` to `store`. Lines that do not
/// decode are counted and recorded in the store's error feed.
pub(crate) fn replay_into(store: &mut AttendanceStore, content: &str) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;
        match store.handle_raw(line) {
            Some(_) => summary.applied += 1,
            None => {
                summary.undecodable += 1;
                tracing::warn!(line = index + 1, "skipping undecodable message");
            }
        }
    }
    summary
}

/// Internal implementation that accepts a writer for testing.
pub(crate) fn run_impl(
    store: &AttendanceStore,
    summary: &ReplaySummary,
    schedule: Option<&str>,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let schedule_ids: Vec<&str> = match schedule {
        Some(id) => vec![id],
        None => store.schedule_ids().collect(),
    };

    let schedules: Vec<ScheduleReport<'_>> = schedule_ids
        .into_iter()
        .map(|id| ScheduleReport {
            schedule_id: id,
            stats: store.get_schedule_stats(id),
            records: store.get_schedule_attendance(id),
            active_sessions: store.active_sessions(id),
        })
        .collect();

    match output {
        OutputFormat::Json => {
            let report = Report {
                summary: *summary,
                schedules,
                errors: store.errors().collect(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            for report in &schedules {
                writeln!(out, "{}", format_stats(report.schedule_id, &report.stats))?;
                for record in &report.records {
                    writeln!(out, "{}", format_record(record))?;
                }
            }
            writeln!(
                out,
                "replayed {} messages: {} applied, {} undecodable",
                summary.lines, summary.applied, summary.undecodable
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
