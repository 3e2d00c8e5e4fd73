// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from a TOML file, looked up in this order:
//! - the `--config` flag
//! - `ROLLCALL_CONFIG`
//! - `<config dir>/rollcall/config.toml` (only if it exists)
//!
//! When no file is found every setting takes its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rc_core::reconnect::{ReconnectPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use rc_core::EventKind;

use crate::connection::ConnectionOptions;
use crate::env;
use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "rollcall";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Endpoints of the two transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Server-sent events endpoint (`http://` or `https://`).
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            ws_url: default_ws_url(),
            stream_url: default_stream_url(),
        }
    }
}

fn default_ws_url() -> String {
    "ws://localhost:8080/ws/attendance".to_string()
}

fn default_stream_url() -> String {
    "http://localhost:8080/api/attendance/stream".to_string()
}

/// Reconnection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay between reconnection cycles in milliseconds (default: 3000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Failed cycles before giving up (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Try the push stream when the socket fails (default: true).
    #[serde(default = "default_fallback")]
    pub fallback: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            base_delay_ms: default_base_delay_ms(),
            max_attempts: default_max_attempts(),
            fallback: default_fallback(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_fallback() -> bool {
    true
}

/// Liveness checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Heartbeat interval in milliseconds (default: 30000). 0 = disabled.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub interval_ms: u64,
    /// Max time to wait for a reply after a heartbeat in milliseconds (default: 10000).
    #[serde(default = "default_heartbeat_timeout_ms")]
    pub timeout_ms: u64,
    /// Max time to wait for a transport to open in milliseconds (default: 5000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        HeartbeatConfig {
            interval_ms: default_heartbeat_interval_ms(),
            timeout_ms: default_heartbeat_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_heartbeat_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Push-stream options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Named event channels to listen on besides the default one.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            channels: default_channels(),
        }
    }
}

fn default_channels() -> Vec<String> {
    EventKind::RECOGNIZED
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect()
}

impl Config {
    /// Loads configuration using the lookup order described above.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_dir = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        match resolve_path(explicit, env::config_path(), user_dir) {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Loads configuration from a specific file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.stream.channels.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::Config("stream.channels entries cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Builds connection manager options from this configuration.
    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            policy: ReconnectPolicy::new(
                Duration::from_millis(self.reconnect.base_delay_ms),
                self.reconnect.max_attempts,
            ),
            fallback: self.reconnect.fallback,
            heartbeat_interval: Duration::from_millis(self.heartbeat.interval_ms),
            heartbeat_timeout: Duration::from_millis(self.heartbeat.timeout_ms),
            connect_timeout: Duration::from_millis(self.heartbeat.connect_timeout_ms),
        }
    }
}

/// Picks the config file to read. The per-user file is only used when it
/// exists, whereas explicit paths are returned as given.
fn resolve_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    user_file: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = from_env {
        return Some(path);
    }
    user_file.filter(|path| path.exists())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
