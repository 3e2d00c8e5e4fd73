// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection management for the live attendance channel.
//!
//! The manager runs one background task per `connect()` call. The task
//! walks the cascade primary, then fallback at most once per cycle, then a
//! timed retry, and finally gives up once the reconnect policy says so.
//! Callers keep a lock-free view of the current phase and a subscribable
//! [`ConnectionStatus`].
//!
//! Every `connect()` and `disconnect()` bumps a generation number. A task
//! only publishes phases, statuses and events while its generation is
//! current, so a superseded task can never resurrect torn-down state.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rc_core::{decode_frame, encode, ConnectionStatus, ErrorKind, Event, ReconnectPolicy, TransportKind};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Error, Result};
use crate::store::EventSink;
use crate::target::{ConnectionTarget, Endpoints};
use crate::transport::{Adapter, Connector, Inbound};

/// Phase values for the atomic state field.
const STATE_IDLE: u8 = 0;
const STATE_CONNECTING: u8 = 1;
const STATE_CONNECTED: u8 = 2;
const STATE_RECONNECTING: u8 = 3;
const STATE_FAILED: u8 = 4;

const TRANSPORT_PRIMARY: u8 = 0;
const TRANSPORT_FALLBACK: u8 = 1;

/// Outbound messages that may queue while the socket is busy.
const OUTBOUND_CAPACITY: usize = 64;

/// Where the connection state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Connecting(TransportKind),
    Connected(TransportKind),
    /// Waiting out the retry delay after `attempt` failed cycles.
    Reconnecting { attempt: u32 },
    /// Retries exhausted; only `reconnect()` leaves this phase.
    Failed,
}

/// Connection state visible to both the background task and callers.
///
/// Uses atomic fields for lock-free reads. Writes from the background task
/// go through [`SharedConnectionState::if_current`] so they can be fenced
/// off by a newer generation.
pub struct SharedConnectionState {
    state: AtomicU8,
    transport: AtomicU8,
    /// Failed cycles since the last successful open.
    attempt: AtomicU32,
    generation: AtomicU64,
    write: Mutex<()>,
}

impl SharedConnectionState {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_IDLE),
            transport: AtomicU8::new(TRANSPORT_PRIMARY),
            attempt: AtomicU32::new(0),
            generation: AtomicU64::new(0),
            write: Mutex::new(()),
        }
    }

    /// Get the current phase.
    pub fn phase(&self) -> Phase {
        let transport = match self.transport.load(Ordering::Acquire) {
            TRANSPORT_FALLBACK => TransportKind::Fallback,
            _ => TransportKind::Primary,
        };
        match self.state.load(Ordering::Acquire) {
            STATE_CONNECTING => Phase::Connecting(transport),
            STATE_CONNECTED => Phase::Connected(transport),
            STATE_RECONNECTING => Phase::Reconnecting {
                attempt: self.attempt(),
            },
            STATE_FAILED => Phase::Failed,
            _ => Phase::Idle,
        }
    }

    /// Get the failed-cycle count.
    pub fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn store(&self, phase: Phase) {
        let (state, transport) = match phase {
            Phase::Idle => (STATE_IDLE, None),
            Phase::Connecting(kind) => (STATE_CONNECTING, Some(kind)),
            Phase::Connected(kind) => (STATE_CONNECTED, Some(kind)),
            Phase::Reconnecting { attempt } => {
                self.attempt.store(attempt, Ordering::Release);
                (STATE_RECONNECTING, None)
            }
            Phase::Failed => (STATE_FAILED, None),
        };
        if let Some(kind) = transport {
            let code = match kind {
                TransportKind::Primary => TRANSPORT_PRIMARY,
                TransportKind::Fallback => TRANSPORT_FALLBACK,
            };
            self.transport.store(code, Ordering::Release);
        }
        self.state.store(state, Ordering::Release);
    }

    fn set_attempt(&self, attempt: u32) {
        self.attempt.store(attempt, Ordering::Release);
    }

    /// Starts a new generation with the given phase and returns its number.
    fn advance(&self, phase: Phase) -> u64 {
        let _guard = self.write.lock().unwrap_or_else(|e| e.into_inner());
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.set_attempt(0);
        self.store(phase);
        generation
    }

    /// Runs `f` only while `generation` is current. Holds the write lock so
    /// a concurrent `advance` waits for `f` to finish.
    fn if_current<R>(&self, generation: u64, f: impl FnOnce() -> R) -> Option<R> {
        let _guard = self.write.lock().unwrap_or_else(|e| e.into_inner());
        if self.generation() == generation {
            Some(f())
        } else {
            None
        }
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing and cascade options for the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub policy: ReconnectPolicy,
    /// Try the push stream once per cycle after the socket fails.
    pub fallback: bool,
    /// Idle time before a liveness ping. Zero disables heartbeats.
    pub heartbeat_interval: Duration,
    /// Time allowed for any inbound traffic after a ping.
    pub heartbeat_timeout: Duration,
    /// Time allowed for a transport to open.
    pub connect_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::default(),
            fallback: true,
            heartbeat_interval: Duration::from_secs(30),
            heartbeat_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Resources of the running background task.
#[derive(Default)]
struct Running {
    target: Option<ConnectionTarget>,
    cancel: Option<CancellationToken>,
    outbound: Option<mpsc::Sender<String>>,
    task: Option<JoinHandle<()>>,
}

/// Owns the live channel and feeds everything it receives into a sink.
pub struct ConnectionManager {
    endpoints: Endpoints,
    options: ConnectionOptions,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn EventSink>,
    shared_state: Arc<SharedConnectionState>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    running: Mutex<Running>,
}

impl ConnectionManager {
    pub fn new(
        endpoints: Endpoints,
        options: ConnectionOptions,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::disconnected());
        Self {
            endpoints,
            options,
            connector,
            sink,
            shared_state: Arc::new(SharedConnectionState::new()),
            status_tx: Arc::new(status_tx),
            running: Mutex::new(Running::default()),
        }
    }

    /// Starts following `target`, replacing any running connection.
    ///
    /// Fails without any state change if the schedule id or credential is
    /// missing. Must be called from within a tokio runtime.
    pub fn connect(&self, target: ConnectionTarget) -> Result<()> {
        target.validate()?;

        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cancel) = running.cancel.take() {
            cancel.cancel();
        }

        let generation = self
            .shared_state
            .advance(Phase::Connecting(TransportKind::Primary));
        let cancel = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);

        let task = CycleTask {
            previous: running.task.take(),
            primary: self.endpoints.url_for(TransportKind::Primary, &target),
            fallback: self.endpoints.url_for(TransportKind::Fallback, &target),
            options: self.options.clone(),
            connector: Arc::clone(&self.connector),
            sink: Arc::clone(&self.sink),
            state: Arc::clone(&self.shared_state),
            status_tx: Arc::clone(&self.status_tx),
            generation,
            cancel: cancel.clone(),
            outbound: outbound_rx,
        };

        tracing::info!(schedule = %target.schedule_id, "connecting");
        running.target = Some(target);
        running.cancel = Some(cancel);
        running.outbound = Some(outbound_tx);
        running.task = Some(tokio::spawn(task.run()));
        Ok(())
    }

    /// Stops the connection, cancelling timers and closing the adapter.
    /// Idempotent.
    pub fn disconnect(&self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        let Some(cancel) = running.cancel.take() else {
            return;
        };
        running.outbound = None;

        self.shared_state.advance(Phase::Idle);
        cancel.cancel();

        let status = ConnectionStatus::disconnected();
        self.sink.set_connection_status(status.clone());
        self.status_tx.send_replace(status);
        tracing::info!("disconnected");
    }

    /// Disconnects and waits for the background task to close its adapter.
    pub async fn shutdown(&self) {
        self.disconnect();
        let task = {
            let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
            running.task.take()
        };
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Restarts the cascade from the primary transport with a fresh attempt
    /// counter, using the last target passed to [`ConnectionManager::connect`].
    pub fn reconnect(&self) -> Result<()> {
        let target = {
            let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
            running.target.clone()
        };
        let target = target.ok_or(Error::NoTarget)?;
        self.connect(target)
    }

    /// Sends an event over the socket.
    ///
    /// Returns false unless connected over the primary transport; callers
    /// should then use another request path.
    pub fn send(&self, event: &Event) -> bool {
        match encode(event) {
            Ok(text) => self.send_text(text),
            Err(e) => {
                tracing::warn!(error = %e, "cannot encode outbound event");
                false
            }
        }
    }

    /// Sends raw text over the socket. Same contract as [`ConnectionManager::send`].
    pub fn send_text(&self, text: String) -> bool {
        if self.phase() != Phase::Connected(TransportKind::Primary) {
            return false;
        }
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running
            .outbound
            .as_ref()
            .is_some_and(|tx| tx.try_send(text).is_ok())
    }

    /// Returns a receiver for connection status updates.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.shared_state.phase()
    }

    /// Failed cycles since the last successful open.
    pub fn attempt(&self) -> u32 {
        self.shared_state.attempt()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let running = self.running.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(cancel) = running.cancel.take() {
            cancel.cancel();
        }
    }
}

/// How one open attempt ended.
enum Open {
    Ready(Box<dyn Adapter>),
    Failed(String),
    Cancelled,
}

/// How one live session ended.
enum SessionEnd {
    Lost(String),
    Cancelled,
}

/// The background task behind one `connect()` call.
struct CycleTask {
    /// Task of the superseded connection, awaited so its adapter is closed
    /// before this one opens.
    previous: Option<JoinHandle<()>>,
    primary: Url,
    fallback: Url,
    options: ConnectionOptions,
    connector: Arc<dyn Connector>,
    sink: Arc<dyn EventSink>,
    state: Arc<SharedConnectionState>,
    status_tx: Arc<watch::Sender<ConnectionStatus>>,
    generation: u64,
    cancel: CancellationToken,
    outbound: mpsc::Receiver<String>,
}

impl CycleTask {
    async fn run(mut self) {
        if let Some(previous) = self.previous.take() {
            let _ = previous.await;
        }
        let mut attempts = 0u32;

        loop {
            let reason = match self.cycle(&mut attempts).await {
                Some(reason) => reason,
                None => return,
            };

            attempts = attempts.saturating_add(1);
            match self.options.policy.next_delay(attempts) {
                None => {
                    self.give_up(attempts, &reason);
                    return;
                }
                Some(delay) => {
                    let current = self.publish(|task| {
                        task.state.store(Phase::Reconnecting { attempt: attempts });
                    });
                    if current.is_none() {
                        return;
                    }
                    tracing::info!(attempt = attempts, ?delay, %reason, "reconnecting");
                    tokio::select! {
                        _ = self.cancel.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Runs one cycle: primary, then fallback at most once. Returns the last
    /// failure reason, or `None` when cancelled.
    async fn cycle(&mut self, attempts: &mut u32) -> Option<String> {
        // Phase shown while a lost session shuts down. Attempts restart at
        // zero after any successful open, so the next retry is the first.
        let retry = Phase::Reconnecting { attempt: 1 };
        let after_primary = if self.options.fallback {
            Phase::Connecting(TransportKind::Fallback)
        } else {
            retry
        };

        let mut reason = match self.open(TransportKind::Primary).await {
            Open::Ready(adapter) => {
                *attempts = 0;
                match self.session(adapter, after_primary).await {
                    SessionEnd::Lost(reason) => reason,
                    SessionEnd::Cancelled => return None,
                }
            }
            Open::Failed(reason) => reason,
            Open::Cancelled => return None,
        };

        if self.options.fallback {
            reason = match self.open(TransportKind::Fallback).await {
                Open::Ready(adapter) => {
                    *attempts = 0;
                    match self.session(adapter, retry).await {
                        SessionEnd::Lost(reason) => reason,
                        SessionEnd::Cancelled => return None,
                    }
                }
                Open::Failed(fallback_reason) => {
                    format!("{reason}; fallback: {fallback_reason}")
                }
                Open::Cancelled => return None,
            };
        }

        Some(reason)
    }

    async fn open(&mut self, kind: TransportKind) -> Open {
        if self
            .publish(|task| task.state.store(Phase::Connecting(kind)))
            .is_none()
        {
            return Open::Cancelled;
        }

        let mut adapter = self.connector.adapter(kind);
        let url = match kind {
            TransportKind::Primary => &self.primary,
            TransportKind::Fallback => &self.fallback,
        };
        tracing::debug!(transport = %kind, "opening");

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return Open::Cancelled,
            result = tokio::time::timeout(self.options.connect_timeout, adapter.open(url)) => result,
        };

        match result {
            Ok(Ok(())) => {
                let current = self.publish(|task| {
                    task.state.set_attempt(0);
                    task.state.store(Phase::Connected(kind));
                    task.emit_status(ConnectionStatus::connected(kind));
                });
                if current.is_none() {
                    let _ = adapter.close().await;
                    return Open::Cancelled;
                }
                tracing::info!(transport = %kind, "connected");
                Open::Ready(adapter)
            }
            Ok(Err(e)) => {
                tracing::warn!(transport = %kind, error = %e, "open failed");
                Open::Failed(format!("{kind}: {e}"))
            }
            Err(_) => {
                tracing::warn!(transport = %kind, timeout = ?self.options.connect_timeout, "open timed out");
                Open::Failed(format!("{kind}: timed out"))
            }
        }
    }

    /// Pumps one open adapter until it fails or the task is cancelled. The
    /// adapter is closed before returning.
    ///
    /// A lost session leaves `Connected` for `lost` before the adapter is
    /// closed, so no send is accepted while it shuts down.
    async fn session(&mut self, mut adapter: Box<dyn Adapter>, lost: Phase) -> SessionEnd {
        let kind = adapter.kind();
        let can_send = adapter.can_send();
        let heartbeat_interval = self.options.heartbeat_interval;
        let heartbeat_timeout = self.options.heartbeat_timeout;
        let heartbeat_enabled = !heartbeat_interval.is_zero();
        let mut ping_sent: Option<Instant> = None;

        let end = loop {
            let has_pending_ping = ping_sent.is_some();
            let ping_remaining = ping_sent
                .map(|sent| heartbeat_timeout.saturating_sub(sent.elapsed()))
                .unwrap_or(Duration::MAX);

            tokio::select! {
                _ = self.cancel.cancelled() => break SessionEnd::Cancelled,

                Some(text) = self.outbound.recv(), if can_send => {
                    if let Err(e) = adapter.send(text).await {
                        break SessionEnd::Lost(e.to_string());
                    }
                }

                inbound = adapter.recv() => match inbound {
                    Ok(Inbound::Frame(frame)) => {
                        ping_sent = None;
                        match decode_frame(frame.channel.as_deref(), &frame.data) {
                            Ok(event) => {
                                self.publish(|task| task.sink.handle_event(event));
                            }
                            Err(e) => {
                                tracing::warn!(transport = %kind, error = %e, "dropping undecodable message");
                            }
                        }
                    }
                    Ok(Inbound::Heartbeat) => {
                        ping_sent = None;
                        self.publish(|task| {
                            task.emit_status(ConnectionStatus::connected(kind).with_heartbeat(Utc::now()));
                        });
                    }
                    Ok(Inbound::Closed(reason)) => {
                        break SessionEnd::Lost(format!("{kind} closed: {reason}"));
                    }
                    Err(e) => break SessionEnd::Lost(format!("{kind}: {e}")),
                },

                // Ping after an idle interval
                _ = tokio::time::sleep(heartbeat_interval), if heartbeat_enabled && !has_pending_ping => {
                    if let Err(e) = adapter.heartbeat().await {
                        break SessionEnd::Lost(format!("{kind}: {e}"));
                    }
                    ping_sent = Some(Instant::now());
                }

                // No traffic since the ping
                _ = tokio::time::sleep(ping_remaining), if heartbeat_enabled && has_pending_ping => {
                    break SessionEnd::Lost(format!("{kind}: heartbeat timed out"));
                }
            }
        };

        if let SessionEnd::Lost(reason) = &end {
            tracing::warn!(transport = %kind, %reason, "connection lost");
            self.publish(|task| {
                task.state.store(lost);
                task.emit_status(ConnectionStatus::disconnected());
            });
        }

        if tokio::time::timeout(self.options.connect_timeout, adapter.close())
            .await
            .is_err()
        {
            tracing::warn!(transport = %kind, "close timed out");
        }

        let mut dropped = 0usize;
        while self.outbound.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::warn!(dropped, "discarded unsent messages");
        }
        end
    }

    fn give_up(&self, attempts: u32, reason: &str) {
        self.publish(|task| {
            task.state.set_attempt(attempts);
            task.state.store(Phase::Failed);
            task.emit_status(ConnectionStatus::disconnected());
            task.sink.add_error(
                ErrorKind::TerminalConnection,
                format!("gave up after {attempts} failed attempts: {reason}"),
            );
        });
        tracing::error!(attempts, %reason, "connection failed");
    }

    /// Runs `f` only while this task's generation is current.
    fn publish<R>(&self, f: impl FnOnce(&Self) -> R) -> Option<R> {
        self.state.if_current(self.generation, || f(self))
    }

    fn emit_status(&self, status: ConnectionStatus) {
        self.sink.set_connection_status(status.clone());
        self.status_tx.send_replace(status);
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
