// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn rollcall() -> Command {
    cargo_bin_cmd!("rollcall")
}

/// Polls `cond` until it holds or five seconds pass.
pub async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Returns an address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A WebSocket server that accepts one client at a time.
///
/// Messages passed to [`WsServer::push`] go to the connected client;
/// text the client sends is collected in `received`.
pub struct WsServer {
    pub addr: SocketAddr,
    pub received: Arc<Mutex<Vec<String>>>,
    pub paths: Arc<Mutex<Vec<String>>>,
    push_tx: mpsc::UnboundedSender<Option<String>>,
}

impl WsServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let paths = Arc::new(Mutex::new(Vec::new()));
        let (push_tx, mut push_rx) = mpsc::unbounded_channel::<Option<String>>();

        let received_clone = Arc::clone(&received);
        let paths_clone = Arc::clone(&paths);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let paths = Arc::clone(&paths_clone);
                let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    paths.lock().unwrap().push(req.uri().to_string());
                    Ok(resp)
                };
                let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                    continue;
                };
                let (mut sink, mut source) = ws.split();
                loop {
                    tokio::select! {
                        pushed = push_rx.recv() => match pushed {
                            Some(Some(text)) => {
                                if sink.send(Message::Text(text.into())).await.is_err() {
                                    break;
                                }
                            }
                            // None closes the current client
                            Some(None) => {
                                let _ = sink.close().await;
                                break;
                            }
                            None => return,
                        },
                        incoming = source.next() => match incoming {
                            Some(Ok(Message::Text(text))) => {
                                received_clone.lock().unwrap().push(text.to_string());
                            }
                            Some(Ok(_)) => {}
                            _ => break,
                        },
                    }
                }
            }
        });

        WsServer {
            addr,
            received,
            paths,
            push_tx,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws/attendance", self.addr)
    }

    pub fn push(&self, text: &str) {
        self.push_tx.send(Some(text.to_string())).unwrap();
    }

    /// Closes the connection of the current client.
    pub fn drop_client(&self) {
        self.push_tx.send(None).unwrap();
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

/// A minimal server-sent events endpoint over raw TCP.
///
/// Every client receives `body` and the connection then stays open.
pub struct SseServer {
    pub addr: SocketAddr,
    pub paths: Arc<Mutex<Vec<String>>>,
}

impl SseServer {
    pub async fn start(body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let paths = Arc::new(Mutex::new(Vec::new()));
        let body = body.to_string();

        let paths_clone = Arc::clone(&paths);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let body = body.clone();
                let paths = Arc::clone(&paths_clone);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&request);
                    if let Some(path) = head.lines().next().and_then(|l| l.split(' ').nth(1)) {
                        paths.lock().unwrap().push(path.to_string());
                    }

                    let response = format!(
                        "HTTP/1.1 200 OK\r\n\
                         Content-Type: text/event-stream\r\n\
                         Cache-Control: no-cache\r\n\
                         Connection: close\r\n\r\n{body}"
                    );
                    if stream.write_all(response.as_bytes()).await.is_err() {
                        return;
                    }
                    let _ = stream.flush().await;
                    // Hold the stream open until the client goes away.
                    let _ = stream.read(&mut buf).await;
                });
            }
        });

        SseServer { addr, paths }
    }

    pub fn url(&self) -> String {
        format!("http://{}/api/attendance/stream", self.addr)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}
