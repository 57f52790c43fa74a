//! # Retry Logic and Backoff
//!
//! Exponential backoff with jitter for the HTTP document collaborator.
//! The realtime transport never retries; only request/response calls
//! against the document store go through this policy.
//!
//! ## Schedule
//!
//! Retry `n` (1-based) waits `min(base * 2^n + U(0, jitter), max)`.
//! With the defaults that is roughly 2s, 4s and 8s before giving up.
//!
//! ## Usage
//!
//! ```rust
//! use lexdraft::offline::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//! assert!(policy.should_retry(0));
//! assert!(!policy.should_retry(3));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff configuration for retried requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Base interval in milliseconds
    pub base_delay_ms: u64,
    /// Upper bound for any single delay in milliseconds
    pub max_delay_ms: u64,
    /// Upper bound of the random jitter added to each delay
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
            jitter_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether another retry is allowed after `retries_so_far` retries
    pub fn should_retry(&self, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries
    }

    /// Delay before retry `retry` (1-based), with random jitter
    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        self.delay_with_jitter(retry, jitter)
    }

    /// Delay before retry `retry` (1-based) for a given jitter amount
    pub fn delay_with_jitter(&self, retry: u32, jitter_ms: u64) -> Duration {
        let exponential = self.base_delay_ms.saturating_mul(2u64.saturating_pow(retry));
        let delay = exponential
            .saturating_add(jitter_ms)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}
