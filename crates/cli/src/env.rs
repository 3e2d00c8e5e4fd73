// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `ROLLCALL_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::ROLLCALL_CONFIG).map(PathBuf::from)
}

/// Returns the bearer credential from `ROLLCALL_TOKEN` if set.
pub fn token() -> Option<String> {
    non_empty(vars::ROLLCALL_TOKEN)
}

/// Returns the schedule id from `ROLLCALL_SCHEDULE` if set.
pub fn schedule() -> Option<String> {
    non_empty(vars::ROLLCALL_SCHEDULE)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
