// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};

pub fn show(path: Option<&Path>) -> Result<()> {
    let config = Config::load(path)?;
    show_impl(&config, &mut std::io::stdout())
}

/// Internal implementation that accepts a writer for testing.
pub(crate) fn show_impl(config: &Config, out: &mut impl Write) -> Result<()> {
    let text = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    write!(out, "{text}")?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
