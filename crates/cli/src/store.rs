// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide handle to the reconciliation store.
//!
//! Many readers, few writers: the connection manager feeds events in, user
//! actions add optimistic edits, and views read snapshots. Every mutation
//! bumps a revision number that readers can wait on.

use std::sync::{Arc, Mutex};

use rc_core::{AttendanceStore, ConnectionStatus, ErrorKind, Event, OptimisticId, Reconciled};
use tokio::sync::watch;

/// Receiver side of the connection manager's output.
pub trait EventSink: Send + Sync {
    fn handle_event(&self, event: Event);
    fn set_connection_status(&self, status: ConnectionStatus);
    fn add_error(&self, kind: ErrorKind, message: String);
}

/// Cloneable, thread-safe handle to one [`AttendanceStore`].
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<AttendanceStore>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SharedStore {
    pub fn new(store: AttendanceStore) -> Self {
        let (revision, _) = watch::channel(0);
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
            revision: Arc::new(revision),
        }
    }

    /// Runs a read-only query against the store.
    pub fn read<R>(&self, f: impl FnOnce(&AttendanceStore) -> R) -> R {
        let store = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&store)
    }

    /// Runs a mutation and notifies subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut AttendanceStore) -> R) -> R {
        let result = {
            let mut store = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut store)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    /// Returns a receiver that changes on every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision number.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Applies an event and logs what it did.
    pub fn apply(&self, event: Event) -> Reconciled {
        let outcome = self.update(|store| store.handle_event(event));
        tracing::debug!(
            kind = %outcome.kind,
            touched = outcome.touched.len(),
            "applied event"
        );
        for reason in &outcome.rejected {
            tracing::warn!(kind = %outcome.kind, %reason, "skipped bulk entry");
        }
        outcome
    }

    pub fn add_optimistic_update(&self, event: Event) -> OptimisticId {
        self.update(|store| store.add_optimistic_update(event))
    }

    pub fn confirm_optimistic_update(&self, id: OptimisticId) -> bool {
        self.update(|store| store.confirm_optimistic_update(id))
    }

    pub fn revert_optimistic_update(&self, id: OptimisticId) -> bool {
        let reverted = self.update(|store| store.revert_optimistic_update(id));
        if reverted {
            tracing::info!(%id, "reverted optimistic update");
        }
        reverted
    }

    /// Drops all state held by the store.
    pub fn dispose(&self) {
        self.update(AttendanceStore::reset);
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new(AttendanceStore::new())
    }
}

impl EventSink for SharedStore {
    fn handle_event(&self, event: Event) {
        self.apply(event);
    }

    fn set_connection_status(&self, status: ConnectionStatus) {
        self.update(|store| store.set_connection_status(status));
    }

    fn add_error(&self, kind: ErrorKind, message: String) {
        self.update(|store| store.add_error(kind, message));
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
