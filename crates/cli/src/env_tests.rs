// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::ROLLCALL_CONFIG, "ROLLCALL_CONFIG");
    assert_eq!(vars::ROLLCALL_TOKEN, "ROLLCALL_TOKEN");
    assert_eq!(vars::ROLLCALL_SCHEDULE, "ROLLCALL_SCHEDULE");
}

#[test]
fn test_token() {
    std::env::remove_var("ROLLCALL_TOKEN");
    assert_eq!(token(), None);

    std::env::set_var("ROLLCALL_TOKEN", "");
    assert_eq!(token(), None);

    std::env::set_var("ROLLCALL_TOKEN", "abc123");
    assert_eq!(token().as_deref(), Some("abc123"));
    std::env::remove_var("ROLLCALL_TOKEN");
}

#[test]
fn test_config_path() {
    std::env::set_var("ROLLCALL_CONFIG", "/tmp/rollcall.toml");
    assert_eq!(config_path(), Some(PathBuf::from("/tmp/rollcall.toml")));
    std::env::remove_var("ROLLCALL_CONFIG");
    assert_eq!(config_path(), None);
}
