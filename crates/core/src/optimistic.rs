// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping for speculative local edits awaiting server confirmation.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::event::{Event, EventKind};

/// Handle returned by the store when an optimistic update is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptimisticId(u64);

impl OptimisticId {
    pub(crate) fn new(n: u64) -> Self {
        OptimisticId(n)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptimisticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opt-{}", self.0)
    }
}

/// An applied but unconfirmed edit.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOptimisticUpdate {
    pub id: OptimisticId,
    pub kind: EventKind,
    pub event: Event,
    pub created_at: DateTime<Utc>,
}
