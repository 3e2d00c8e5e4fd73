// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server-sent events adapter using reqwest.
//!
//! Receive-only. Events arrive on the default (unnamed) channel or on a
//! named channel per event type; only names registered when the adapter is
//! created are accepted.

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use rc_core::TransportKind;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use url::Url;

use super::sse::{SseItem, SseParser};
use super::{Adapter, CloseReason, Frame, Inbound, TransportError, TransportFuture};

type ByteStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

/// Receive-only fallback transport.
pub struct EventStreamAdapter {
    client: reqwest::Client,
    channels: Vec<String>,
    stream: Option<ByteStream>,
    parser: SseParser,
}

impl EventStreamAdapter {
    /// `channels` are the named event channels to accept besides the
    /// default one.
    pub fn new(channels: Vec<String>) -> Self {
        EventStreamAdapter {
            client: reqwest::Client::new(),
            channels,
            stream: None,
            parser: SseParser::new(),
        }
    }

    /// Maps a parsed event name to its channel, or `None` to drop the event.
    fn channel_for(&self, name: Option<String>) -> Option<Option<String>> {
        match name {
            None => Some(None),
            Some(name) if self.channels.contains(&name) => Some(Some(name)),
            Some(name) => {
                tracing::debug!(channel = %name, "ignoring event on unregistered channel");
                None
            }
        }
    }
}

impl Adapter for EventStreamAdapter {
    fn kind(&self) -> TransportKind {
        TransportKind::Fallback
    }

    fn can_send(&self) -> bool {
        false
    }

    fn open<'a>(&'a mut self, url: &'a Url) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let response = self
                .client
                .get(url.clone())
                .header(ACCEPT, "text/event-stream")
                .header(CACHE_CONTROL, "no-cache")
                .send()
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.without_url().to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::ConnectionFailed(format!(
                    "server answered {status}"
                )));
            }

            self.parser = SseParser::new();
            self.stream = Some(
                response
                    .bytes_stream()
                    .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                    .boxed(),
            );
            Ok(())
        })
    }

    fn send(&mut self, _data: String) -> TransportFuture<'_, ()> {
        Box::pin(async { Err(TransportError::Unsupported("send")) })
    }

    fn heartbeat(&mut self) -> TransportFuture<'_, ()> {
        // The stream has no upstream; liveness comes from server keep-alives.
        Box::pin(async { Ok(()) })
    }

    fn recv(&mut self) -> TransportFuture<'_, Inbound> {
        Box::pin(async move {
            loop {
                while let Some(item) = self.parser.next_item() {
                    match item {
                        SseItem::Comment => return Ok(Inbound::Heartbeat),
                        SseItem::Event { name, data } => {
                            if let Some(channel) = self.channel_for(name) {
                                return Ok(Inbound::Frame(Frame { channel, data }));
                            }
                        }
                    }
                }

                let stream = self.stream.as_mut().ok_or(TransportError::ConnectionClosed)?;
                match stream.next().await {
                    Some(Ok(chunk)) => self.parser.feed(&chunk),
                    Some(Err(e)) => {
                        self.stream = None;
                        return Err(TransportError::ReceiveFailed(e.without_url().to_string()));
                    }
                    None => {
                        self.stream = None;
                        return Ok(Inbound::Closed(CloseReason {
                            code: None,
                            reason: "stream ended".to_string(),
                        }));
                    }
                }
            }
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.stream = None;
            Ok(())
        })
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
#[path = "event_stream_tests.rs"]
mod tests;
