// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket adapter using tokio-tungstenite.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rc_core::TransportKind;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::{Adapter, CloseReason, Frame, Inbound, TransportError, TransportFuture};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Bidirectional primary transport.
pub struct WebSocketAdapter {
    /// The WebSocket connection, if open.
    ws: Option<WebSocketConnection>,
}

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: SplitSink<Socket, Message>,
    stream: SplitStream<Socket>,
}

impl WebSocketAdapter {
    pub fn new() -> Self {
        WebSocketAdapter { ws: None }
    }

    async fn write(&mut self, message: Message) -> Result<(), TransportError> {
        let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

        if let Err(e) = ws.sink.send(message).await {
            // Connection is broken, clear it
            self.ws = None;
            return Err(TransportError::SendFailed(e.to_string()));
        }
        Ok(())
    }
}

impl Default for WebSocketAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for WebSocketAdapter {
    fn kind(&self) -> TransportKind {
        TransportKind::Primary
    }

    fn can_send(&self) -> bool {
        true
    }

    fn open<'a>(&'a mut self, url: &'a Url) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn send(&mut self, data: String) -> TransportFuture<'_, ()> {
        Box::pin(async move { self.write(Message::Text(data.into())).await })
    }

    fn heartbeat(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move { self.write(Message::Ping(Vec::<u8>::new().into())).await })
    }

    fn recv(&mut self) -> TransportFuture<'_, Inbound> {
        Box::pin(async move {
            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return Ok(Inbound::Frame(Frame::text(text.as_str())));
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => return Ok(Inbound::Frame(Frame::text(text))),
                        Err(_) => {
                            tracing::debug!("ignoring non-UTF-8 binary frame");
                            continue;
                        }
                    },
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Ping(_))) => {
                        // tungstenite answers pings itself; both prove liveness
                        return Ok(Inbound::Heartbeat);
                    }
                    Some(Ok(Message::Close(frame))) => {
                        self.ws = None;
                        let reason = frame
                            .map(|f| CloseReason {
                                code: Some(u16::from(f.code)),
                                reason: f.reason.to_string(),
                            })
                            .unwrap_or_default();
                        return Ok(Inbound::Closed(reason));
                    }
                    Some(Ok(Message::Frame(_))) => continue,
                    Some(Err(e)) => {
                        // Connection is broken, clear it
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        self.ws = None;
                        return Ok(Inbound::Closed(CloseReason {
                            code: None,
                            reason: "socket ended".to_string(),
                        }));
                    }
                }
            }
        })
    }

    fn close(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                let _ = ws.sink.close().await;
            }
            Ok(())
        })
    }

    fn is_open(&self) -> bool {
        self.ws.is_some()
    }
}
