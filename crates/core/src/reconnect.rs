// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect policy: whether and when to retry after a failed cycle.
//!
//! The delay is constant rather than exponential. Once the failed-attempt
//! count reaches `max_attempts` the policy returns `None` and the caller
//! surfaces a terminal error.

use std::time::Duration;

/// Default delay between reconnection cycles.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(3);

/// Default number of failed cycles before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Configured reconnection limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before every retry.
    pub base_delay: Duration,
    /// Failed cycles allowed before the connection is declared failed.
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub const fn new(base_delay: Duration, max_attempts: u32) -> Self {
        ReconnectPolicy {
            base_delay,
            max_attempts,
        }
    }

    /// Returns the delay before the next attempt, or `None` to stop retrying.
    ///
    /// `attempt` is the number of consecutive failed cycles so far.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        next_delay(attempt, self)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS)
    }
}

/// Free-function form of [`ReconnectPolicy::next_delay`].
pub fn next_delay(attempt: u32, policy: &ReconnectPolicy) -> Option<Duration> {
    if attempt >= policy.max_attempts {
        None
    } else {
        Some(policy.base_delay)
    }
}

#[cfg(test)]
#[path = "reconnect_tests.rs"]
mod tests;
