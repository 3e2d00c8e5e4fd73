// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rc-core operations.

use thiserror::Error;

/// A wire message that could not be turned into an [`Event`](crate::Event).
///
/// Decode failures never escape the reconciliation path: the message is
/// dropped and the store is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Syntax(String),

    #[error("message must be a JSON object")]
    NotAnObject,

    #[error("message has no string `type` field")]
    MissingType,

    #[error("invalid {event} payload: {reason}")]
    InvalidPayload { event: &'static str, reason: String },

    #[error("invalid attendance status: '{0}'\n  hint: valid statuses are: present, late, absent, excused")]
    InvalidStatus(String),
}

/// A specialized Result type for decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
