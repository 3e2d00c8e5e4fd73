// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Split test files for CLI parsing tests.

use super::*;

mod flags_tests;
mod parse_tests;
