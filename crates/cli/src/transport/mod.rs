// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction over the two live channels.
//!
//! Provides a trait-based adapter layer that enables:
//! - A bidirectional WebSocket adapter (primary)
//! - A receive-only server-sent events adapter (fallback)
//! - Mock adapters for unit testing
//!
//! Adapters never reconnect on their own. A closed or failed adapter is
//! reported upward and the connection manager decides what happens next.

mod event_stream;
mod sse;
mod websocket;

pub use event_stream::EventStreamAdapter;
pub use sse::{SseItem, SseParser};
pub use websocket::WebSocketAdapter;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use rc_core::TransportKind;
use url::Url;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The transport cannot do this.
    #[error("{0} is not supported by this transport")]
    Unsupported(&'static str),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by adapter methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A message frame received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Named push-stream channel, or `None` for the default channel.
    pub channel: Option<String>,
    pub data: String,
}

impl Frame {
    /// A frame on the default channel.
    pub fn text(data: impl Into<String>) -> Self {
        Frame {
            channel: None,
            data: data.into(),
        }
    }
}

/// Why the server ended the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseReason {
    pub code: Option<u16>,
    pub reason: String,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.reason.is_empty()) {
            (Some(code), false) => write!(f, "{code} {}", self.reason),
            (Some(code), true) => write!(f, "{code}"),
            (None, false) => f.write_str(&self.reason),
            (None, true) => f.write_str("no reason given"),
        }
    }
}

/// Something read off an open adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Frame(Frame),
    /// Liveness signal with no payload (pong, keep-alive comment).
    Heartbeat,
    /// The server closed the channel.
    Closed(CloseReason),
}

/// A live channel to the attendance server.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Adapter: Send {
    /// Which transport this is.
    fn kind(&self) -> TransportKind;

    /// Whether [`Adapter::send`] can succeed on this transport.
    fn can_send(&self) -> bool;

    /// Opens the channel.
    fn open<'a>(&'a mut self, url: &'a Url) -> TransportFuture<'a, ()>;

    /// Sends one text message.
    fn send(&mut self, data: String) -> TransportFuture<'_, ()>;

    /// Sends a liveness ping. A reply arrives as [`Inbound::Heartbeat`].
    fn heartbeat(&mut self) -> TransportFuture<'_, ()>;

    /// Waits for the next inbound item.
    ///
    /// Must be cancel safe: dropping the future between items loses nothing.
    fn recv(&mut self) -> TransportFuture<'_, Inbound>;

    /// Closes the channel. Closing a closed adapter is a no-op.
    fn close(&mut self) -> TransportFuture<'_, ()>;

    /// Check if open.
    fn is_open(&self) -> bool;
}

/// Creates fresh adapters. Every connection attempt gets a new one.
pub trait Connector: Send + Sync {
    fn adapter(&self, kind: TransportKind) -> Box<dyn Adapter>;
}

/// Connector for the real network transports.
#[derive(Debug, Clone)]
pub struct NetworkConnector {
    channels: Vec<String>,
}

impl NetworkConnector {
    /// `channels` are the named push-stream channels to accept.
    pub fn new(channels: Vec<String>) -> Self {
        NetworkConnector { channels }
    }
}

impl Connector for NetworkConnector {
    fn adapter(&self, kind: TransportKind) -> Box<dyn Adapter> {
        match kind {
            TransportKind::Primary => Box::new(WebSocketAdapter::new()),
            TransportKind::Fallback => Box::new(EventStreamAdapter::new(self.channels.clone())),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
