// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection status as seen by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transport carries the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Bidirectional socket.
    Primary,
    /// Receive-only push stream.
    Fallback,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Primary => "primary",
            TransportKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the live channel. Always replaced whole, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub transport: Option<TransportKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_at: Option<DateTime<Utc>>,
}

impl ConnectionStatus {
    /// Status of a manager with no live channel.
    pub fn disconnected() -> Self {
        ConnectionStatus::default()
    }

    /// Status of a freshly opened channel on the given transport.
    pub fn connected(transport: TransportKind) -> Self {
        ConnectionStatus {
            connected: true,
            transport: Some(transport),
            last_heartbeat_at: None,
        }
    }

    /// Returns a copy stamped with a heartbeat time.
    pub fn with_heartbeat(mut self, at: DateTime<Utc>) -> Self {
        self.last_heartbeat_at = Some(at);
        self
    }

    /// True only when the bidirectional transport is live.
    pub fn can_send(&self) -> bool {
        self.connected && self.transport == Some(TransportKind::Primary)
    }
}
