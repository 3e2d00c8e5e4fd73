// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live view of one schedule.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rc_core::{codec, AttendanceStore, Envelope, ScheduleStats};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::connection::{ConnectionManager, Phase};
use crate::display::{format_stats, format_status, format_update};
use crate::env;
use crate::error::{Error, Result};
use crate::store::SharedStore;
use crate::target::{ConnectionTarget, Endpoints};
use crate::transport::NetworkConnector;

/// Options of the `watch` command.
pub struct WatchArgs {
    pub schedule: Option<String>,
    pub token: Option<String>,
    pub config: Option<PathBuf>,
    pub no_fallback: bool,
    pub output: OutputFormat,
}

pub async fn run(args: WatchArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let target = ConnectionTarget::new(
        args.schedule.or_else(env::schedule),
        args.token.or_else(env::token),
    )?;
    let endpoints = Endpoints::from_config(&config.server)?;

    let mut options = config.connection_options();
    if args.no_fallback {
        options.fallback = false;
    }

    let store = SharedStore::default();
    let connector = Arc::new(NetworkConnector::new(config.stream.channels.clone()));
    let manager = ConnectionManager::new(endpoints, options, connector, Arc::new(store.clone()));

    let schedule_id = target.schedule_id.clone();
    manager.connect(target)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    follow(&manager, &store, &schedule_id, args.output, shutdown, &mut std::io::stdout()).await
}

/// Prints store changes until `shutdown` resolves or the manager gives up.
pub(crate) async fn follow(
    manager: &ConnectionManager,
    store: &SharedStore,
    schedule_id: &str,
    output: OutputFormat,
    shutdown: impl Future<Output = ()>,
    out: &mut impl Write,
) -> Result<()> {
    let mut revisions = store.subscribe();
    let mut status = manager.status();
    let mut printer = Printer::new(schedule_id, output);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                manager.shutdown().await;
                return Ok(());
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let lines = store.read(|s| printer.take_new(s))?;
                for line in lines {
                    writeln!(out, "{line}")?;
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let current = status.borrow_and_update().clone();
                tracing::info!(status = %format_status(&current), "connection status");
            }
        }

        if manager.phase() == Phase::Failed {
            let lines = store.read(|s| printer.take_new(s))?;
            for line in lines {
                writeln!(out, "{line}")?;
            }
            return Err(Error::TerminalConnection {
                attempts: manager.attempt(),
            });
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLine {
    received_at: DateTime<Utc>,
    optimistic: bool,
    #[serde(flatten)]
    envelope: Envelope,
    stats: ScheduleStats,
}

/// Turns newly applied events into output lines.
struct Printer {
    schedule_id: String,
    output: OutputFormat,
    printed: u64,
}

impl Printer {
    fn new(schedule_id: &str, output: OutputFormat) -> Self {
        Printer {
            schedule_id: schedule_id.to_string(),
            output,
            printed: 0,
        }
    }

    /// Returns lines for events applied since the last call, oldest first.
    /// Events that already left the recent log are skipped.
    fn take_new(&mut self, store: &AttendanceStore) -> Result<Vec<String>> {
        let applied = store.applied_count();
        let fresh = usize::try_from(applied.saturating_sub(self.printed)).unwrap_or(usize::MAX);
        self.printed = applied;
        if fresh == 0 {
            return Ok(Vec::new());
        }

        let stats = store.get_schedule_stats(&self.schedule_id);
        let mut updates: Vec<_> = store.recent_updates().take(fresh).collect();
        updates.reverse();

        let mut lines = Vec::with_capacity(updates.len() + 1);
        match self.output {
            OutputFormat::Text => {
                lines.extend(updates.into_iter().map(format_update));
                lines.push(format_stats(&self.schedule_id, &stats));
            }
            OutputFormat::Json => {
                for update in updates {
                    let line = UpdateLine {
                        received_at: update.received_at,
                        optimistic: update.optimistic,
                        envelope: codec::envelope(&update.event)?,
                        stats,
                    };
                    lines.push(serde_json::to_string(&line)?);
                }
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
