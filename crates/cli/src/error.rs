// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::transport::TransportError;

/// All possible errors surfaced by the rollcall library and CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no schedule id given\n  hint: pass --schedule <id> or set ROLLCALL_SCHEDULE")]
    MissingSchedule,

    #[error("no credential given\n  hint: pass --token <token> or set ROLLCALL_TOKEN")]
    MissingCredential,

    #[error("nothing to reconnect: connect() has not been called")]
    NoTarget,

    #[error("invalid {field} '{url}': {reason}")]
    InvalidUrl {
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("gave up after {attempts} failed reconnection attempts\n  hint: check the server and credential, then run the command again")]
    TerminalConnection { attempts: u32 },
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
