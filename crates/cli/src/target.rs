// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection target and endpoint URLs.
//!
//! The push stream cannot carry custom headers, so both transports pass the
//! schedule id and bearer credential as query parameters.

use rc_core::TransportKind;
use url::Url;

use crate::config::ServerConfig;
use crate::error::{Error, Result};

const SCHEDULE_PARAM: &str = "scheduleId";
const TOKEN_PARAM: &str = "token";

/// Which session to follow and the credential to follow it with.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub schedule_id: String,
    pub token: String,
}

impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("schedule_id", &self.schedule_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ConnectionTarget {
    /// Builds a target, rejecting a missing or blank schedule id or token.
    pub fn new(schedule_id: Option<String>, token: Option<String>) -> Result<Self> {
        let schedule_id = schedule_id
            .filter(|s| !s.trim().is_empty())
            .ok_or(Error::MissingSchedule)?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::MissingCredential)?;
        Ok(ConnectionTarget { schedule_id, token })
    }

    /// Checks a target assembled by hand.
    pub fn validate(&self) -> Result<()> {
        if self.schedule_id.trim().is_empty() {
            return Err(Error::MissingSchedule);
        }
        if self.token.trim().is_empty() {
            return Err(Error::MissingCredential);
        }
        Ok(())
    }
}

/// Base URLs of both transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub primary: Url,
    pub fallback: Url,
}

impl Endpoints {
    /// Parses and checks both endpoints.
    pub fn parse(primary: &str, fallback: &str) -> Result<Self> {
        Ok(Endpoints {
            primary: parse_endpoint("ws_url", primary, &["ws", "wss"])?,
            fallback: parse_endpoint("stream_url", fallback, &["http", "https"])?,
        })
    }

    pub fn from_config(server: &ServerConfig) -> Result<Self> {
        Self::parse(&server.ws_url, &server.stream_url)
    }

    /// Returns the URL for one transport with the target's query parameters.
    pub fn url_for(&self, kind: TransportKind, target: &ConnectionTarget) -> Url {
        let base = match kind {
            TransportKind::Primary => &self.primary,
            TransportKind::Fallback => &self.fallback,
        };
        with_target(base, target)
    }
}

fn parse_endpoint(field: &'static str, raw: &str, schemes: &[&str]) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidUrl {
        field,
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(Error::InvalidUrl {
            field,
            url: raw.to_string(),
            reason: format!("scheme must be one of: {}", schemes.join(", ")),
        });
    }
    Ok(url)
}

/// Appends the target to a base URL, replacing any existing values of the
/// same parameters.
fn with_target(base: &Url, target: &ConnectionTarget) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != SCHEDULE_PARAM && k != TOKEN_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(SCHEDULE_PARAM, &target.schedule_id)
        .append_pair(TOKEN_PARAM, &target.token);
    url
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
