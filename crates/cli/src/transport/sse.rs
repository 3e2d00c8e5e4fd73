// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental parser for the `text/event-stream` format.
//!
//! Bytes are fed in arbitrary chunks and complete items are pulled out one
//! at a time. All partial state lives in the parser, so a reader may stop
//! between items without losing data.

use std::collections::VecDeque;

/// Longest line kept while waiting for its end. Longer lines are dropped
/// together with the event they belong to.
pub const MAX_LINE_BYTES: usize = 1 << 20;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One dispatched item from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseItem {
    /// A data event. `name` is `None` for the default channel.
    Event { name: Option<String>, data: String },
    /// A `:` comment line, used by servers as keep-alive.
    Comment,
}

#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    name: Option<String>,
    data: Vec<String>,
    ready: VecDeque<SseItem>,
    /// The last line ended in `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
    /// Dropping the rest of an overlong line.
    discarding: bool,
    /// The current event lost a line and is not dispatched.
    drop_event: bool,
    seen_line: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes and parses every complete line. Lines may end in
    /// `\n`, `\r\n` or a bare `\r`.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
        loop {
            if self.skip_lf {
                match self.buffer.first() {
                    None => break,
                    Some(b'\n') => {
                        self.buffer.remove(0);
                    }
                    Some(_) => {}
                }
                self.skip_lf = false;
            }

            let Some(end) = self.buffer.iter().position(|b| *b == b'\n' || *b == b'\r') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.skip_lf = line[end] == b'\r';
            let mut text = &line[..end];
            if !self.seen_line {
                self.seen_line = true;
                text = text.strip_prefix(BOM).unwrap_or(text);
            }
            if self.discarding {
                self.discarding = false;
                continue;
            }
            let text = String::from_utf8_lossy(text);
            self.line(&text);
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            self.buffer.clear();
            self.discarding = true;
            self.drop_event = true;
        }
    }

    /// Takes the next complete item, if any.
    pub fn next_item(&mut self) -> Option<SseItem> {
        self.ready.pop_front()
    }

    fn line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            self.ready.push_back(SseItem::Comment);
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.name = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry only matter to self-reconnecting clients
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let name = self.name.take().filter(|n| !n.is_empty() && n != "message");
        if std::mem::take(&mut self.drop_event) {
            self.data.clear();
            return;
        }
        if self.data.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        self.ready.push_back(SseItem::Event { name, data });
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
