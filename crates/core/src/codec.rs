// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire codec for attendance events.
//!
//! Every wire message is a JSON object of the form
//! `{"type": "<event-type>", "payload": {...}}`. Decoding is pure and total:
//! a malformed message yields a [`DecodeError`] and nothing else.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, Result};
use crate::event::{BulkUpdate, Event, EventKind, UnknownEvent};
use crate::record::{id_from_wire, RecordPatch, ScheduleId};

/// Raw message handed to the codec: either text off the wire or an already
/// parsed JSON value.
#[derive(Debug, Clone)]
pub enum RawMessage<'a> {
    Text(&'a str),
    Value(Value),
}

impl<'a> From<&'a str> for RawMessage<'a> {
    fn from(text: &'a str) -> Self {
        RawMessage::Text(text)
    }
}

impl<'a> From<&'a String> for RawMessage<'a> {
    fn from(text: &'a String) -> Self {
        RawMessage::Text(text)
    }
}

impl From<Value> for RawMessage<'_> {
    fn from(value: Value) -> Self {
        RawMessage::Value(value)
    }
}

/// The `{type, payload}` envelope shared by both transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkHeader {
    #[serde(deserialize_with = "id_from_wire")]
    schedule_id: ScheduleId,
    updates: Vec<Value>,
}

/// Decodes a raw wire message into an [`Event`].
pub fn decode<'a>(raw: impl Into<RawMessage<'a>>) -> Result<Event> {
    let value = match raw.into() {
        RawMessage::Text(text) => {
            serde_json::from_str(text).map_err(|e| DecodeError::Syntax(e.to_string()))?
        }
        RawMessage::Value(value) => value,
    };
    decode_value(value)
}

/// Decodes a frame received on a push-stream channel.
///
/// Servers may send the full envelope on any channel, or only the payload on
/// a channel named after the event type. The default (unnamed) channel must
/// carry a full envelope.
pub fn decode_frame(channel: Option<&str>, data: &str) -> Result<Event> {
    let value: Value =
        serde_json::from_str(data).map_err(|e| DecodeError::Syntax(e.to_string()))?;

    let has_type = value.as_object().is_some_and(|obj| obj.contains_key("type"));
    match channel {
        Some(name) if !has_type => decode_value(serde_json::json!({
            "type": name,
            "payload": value,
        })),
        _ => decode_value(value),
    }
}

/// Encodes an event as its wire envelope.
pub fn envelope(event: &Event) -> std::result::Result<Envelope, serde_json::Error> {
    let payload = match event {
        Event::AttendanceUpdate(p)
        | Event::StudentCheckedIn(p)
        | Event::StudentCheckedOut(p)
        | Event::ManualOverride(p) => serde_json::to_value(p)?,
        Event::StatusChange(c) => serde_json::to_value(c)?,
        Event::BulkUpdate(b) => serde_json::to_value(b)?,
        Event::Unknown(u) => u.payload.clone(),
    };
    Ok(Envelope {
        kind: event.type_name().to_string(),
        payload,
    })
}

/// Encodes an event as a JSON wire message.
pub fn encode(event: &Event) -> std::result::Result<String, serde_json::Error> {
    envelope(event)?.to_json()
}

fn decode_value(value: Value) -> Result<Event> {
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    let envelope: Envelope =
        serde_json::from_value(value).map_err(|_| DecodeError::MissingType)?;

    let Some(kind) = EventKind::from_wire(&envelope.kind) else {
        return Ok(Event::Unknown(UnknownEvent {
            kind: envelope.kind,
            payload: envelope.payload,
        }));
    };

    let payload = envelope.payload;
    match kind {
        EventKind::AttendanceUpdate => payload_as(kind, payload).map(Event::AttendanceUpdate),
        EventKind::StudentCheckedIn => payload_as(kind, payload).map(Event::StudentCheckedIn),
        EventKind::StudentCheckedOut => payload_as(kind, payload).map(Event::StudentCheckedOut),
        EventKind::StatusChange => payload_as(kind, payload).map(Event::StatusChange),
        EventKind::ManualOverride => payload_as(kind, payload).map(Event::ManualOverride),
        EventKind::BulkUpdate => decode_bulk(payload).map(Event::BulkUpdate),
        EventKind::Unknown => Err(DecodeError::MissingType),
    }
}

fn payload_as<T: DeserializeOwned>(kind: EventKind, payload: Value) -> Result<T> {
    if !payload.is_object() {
        return Err(DecodeError::InvalidPayload {
            event: kind.as_str(),
            reason: "payload must be an object".to_string(),
        });
    }
    serde_json::from_value(payload).map_err(|e| DecodeError::InvalidPayload {
        event: kind.as_str(),
        reason: e.to_string(),
    })
}

/// Decodes a bulk payload entry by entry.
///
/// Each entry inherits the batch's schedule id. Entries that fail to decode
/// are recorded in `rejected` instead of failing the batch.
fn decode_bulk(payload: Value) -> Result<BulkUpdate> {
    let header: BulkHeader = payload_as(EventKind::BulkUpdate, payload)?;

    let mut updates = Vec::with_capacity(header.updates.len());
    let mut rejected = Vec::new();
    for (index, mut entry) in header.updates.into_iter().enumerate() {
        let Some(obj) = entry.as_object_mut() else {
            rejected.push(format!("entry {index}: not an object"));
            continue;
        };
        obj.insert(
            "scheduleId".to_string(),
            Value::String(header.schedule_id.clone()),
        );
        match serde_json::from_value::<RecordPatch>(entry) {
            Ok(patch) => updates.push(patch),
            Err(e) => rejected.push(format!("entry {index}: {e}")),
        }
    }

    Ok(BulkUpdate {
        schedule_id: header.schedule_id,
        updates,
        rejected,
    })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
