// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.server.ws_url, "ws://localhost:8080/ws/attendance");
    assert_eq!(config.reconnect.base_delay_ms, 3000);
    assert_eq!(config.reconnect.max_attempts, 5);
    assert!(config.reconnect.fallback);
    assert_eq!(config.heartbeat.interval_ms, 30_000);
    assert_eq!(config.stream.channels.len(), 6);
    assert!(config
        .stream
        .channels
        .contains(&"student_checked_in".to_string()));
}

#[test]
fn test_empty_file_uses_defaults() {
    assert_eq!(Config::parse("").unwrap(), Config::default());
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = Config::parse(
        r#"
[server]
ws_url = "wss://school.example/ws"

[reconnect]
max_attempts = 2
"#,
    )
    .unwrap();
    assert_eq!(config.server.ws_url, "wss://school.example/ws");
    assert_eq!(
        config.server.stream_url,
        "http://localhost:8080/api/attendance/stream"
    );
    assert_eq!(config.reconnect.max_attempts, 2);
    assert_eq!(config.reconnect.base_delay_ms, 3000);
}

#[test]
fn test_connection_options() {
    let config = Config::parse(
        r#"
[reconnect]
base_delay_ms = 250
max_attempts = 3
fallback = false

[heartbeat]
interval_ms = 0
"#,
    )
    .unwrap();
    let options = config.connection_options();
    assert_eq!(options.policy.base_delay, Duration::from_millis(250));
    assert_eq!(options.policy.max_attempts, 3);
    assert!(!options.fallback);
    assert!(options.heartbeat_interval.is_zero());
    assert_eq!(options.connect_timeout, Duration::from_millis(5000));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = Config::parse("[reconnect\nmax_attempts = 1").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_wrong_type_is_config_error() {
    let err = Config::parse("[reconnect]\nmax_attempts = \"many\"").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_empty_channel_rejected() {
    let err = Config::parse("[stream]\nchannels = [\"bulk_update\", \" \"]").unwrap_err();
    assert!(err.to_string().contains("channels"));
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[reconnect]\nfallback = false\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert!(!config.reconnect.fallback);
}

#[test]
fn test_load_from_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound(_)));
}

#[test]
fn test_resolve_prefers_explicit_path() {
    let explicit = PathBuf::from("/a.toml");
    let resolved = resolve_path(
        Some(&explicit),
        Some(PathBuf::from("/b.toml")),
        Some(PathBuf::from("/c.toml")),
    );
    assert_eq!(resolved, Some(explicit));
}

#[test]
fn test_resolve_env_before_user_file() {
    let resolved = resolve_path(None, Some(PathBuf::from("/b.toml")), None);
    assert_eq!(resolved, Some(PathBuf::from("/b.toml")));
}

#[test]
fn test_resolve_skips_missing_user_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("rollcall").join("config.toml");
    assert_eq!(resolve_path(None, None, Some(missing)), None);

    let present = dir.path().join("config.toml");
    fs::write(&present, "").unwrap();
    assert_eq!(resolve_path(None, None, Some(present.clone())), Some(present));
}
