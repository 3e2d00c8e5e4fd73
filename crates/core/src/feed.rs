// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capped newest-first logs: the recent-update feed and the error feed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::event::{Event, EventKind};

/// Entries kept in the recent-update log.
pub const RECENT_UPDATE_CAPACITY: usize = 50;

/// Entries kept in the error feed.
pub const ERROR_FEED_CAPACITY: usize = 20;

/// Newest-first buffer that drops its oldest entry once full.
#[derive(Debug, Clone)]
pub struct Capped<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Capped<T> {
    pub fn new(capacity: usize) -> Self {
        Capped {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends an entry, truncating from the old end.
    pub fn push(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// One applied event, as shown in the notification feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentUpdate {
    /// Reconciliation branch that ran.
    pub tag: EventKind,
    pub event: Event,
    pub received_at: DateTime<Utc>,
    /// Applied as a speculative local edit.
    pub optimistic: bool,
}

/// Category of a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    Transport,
    TerminalConnection,
    OptimisticMutation,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Decode => "decode",
            ErrorKind::Transport => "transport",
            ErrorKind::TerminalConnection => "terminal_connection",
            ErrorKind::OptimisticMutation => "optimistic_mutation",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// An error surfaced to consumers through the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedError {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
