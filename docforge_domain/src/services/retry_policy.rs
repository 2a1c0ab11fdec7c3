// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Retry policy
//!
//! The pure decision logic behind the retry orchestrator (§4.C): given an
//! error's classification, the current attempt count, and configured
//! bounds, should this execution be retried, and after how long. Kept free
//! of lease/lock/queue concerns so §8 property 5 (backoff correctness) can
//! be checked directly against this module.

use rand::Rng;

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay, in milliseconds.
    Retry { delay_ms: u64 },
    /// No retry; the error record moves to `exhausted`.
    Exhausted,
    /// Cancellation short-circuits retry entirely (§7).
    NotRetryable,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_delay_ms: u64,
    pub max_attempts: u32,
    pub cap_ms: u64,
    pub rate_limit_floor_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_attempts: 3,
            cap_ms: 30_000,
            rate_limit_floor_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Step 2 + 3 of §4.C's algorithm in one call: classify-driven decide,
    /// then compute the delay for the decided retry.
    pub fn decide(&self, kind: ErrorKind, attempt: u32) -> RetryDecision {
        match kind {
            ErrorKind::Permanent => RetryDecision::Exhausted,
            ErrorKind::Cancelled => RetryDecision::NotRetryable,
            ErrorKind::RateLimited => RetryDecision::Retry {
                delay_ms: self.rate_limit_floor_delay_ms.max(compute_backoff(self.base_delay_ms, attempt, self.cap_ms)),
            },
            ErrorKind::Transient | ErrorKind::LeaseLost | ErrorKind::Unknown => {
                if attempt < self.max_attempts {
                    RetryDecision::Retry { delay_ms: compute_backoff(self.base_delay_ms, attempt, self.cap_ms) }
                } else {
                    RetryDecision::Exhausted
                }
            }
        }
    }
}

/// `delay = base * 2^(attempt-1) * jitter`, jitter uniform in `[0.8, 1.2]`,
/// capped at `cap_ms` (§4.C step 3, §8 property 5). `attempt` is 1-indexed
/// (the attempt that just failed).
pub fn compute_backoff(base_ms: u64, attempt: u32, cap_ms: u64) -> u64 {
    let exponent = attempt.saturating_sub(1).min(32);
    let unjittered = (base_ms as f64) * 2f64.powi(exponent as i32);
    let jitter = rand::rng().random_range(0.8..=1.2);
    let delayed = (unjittered * jitter).round() as u64;
    delayed.min(cap_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors_are_exhausted_immediately() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(ErrorKind::Permanent, 1), RetryDecision::Exhausted);
    }

    #[test]
    fn cancelled_is_never_retried() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(ErrorKind::Cancelled, 1), RetryDecision::NotRetryable);
    }

    #[test]
    fn transient_retries_until_max_attempts_then_exhausts() {
        let policy = RetryPolicy::default();
        assert!(matches!(policy.decide(ErrorKind::Transient, 1), RetryDecision::Retry { .. }));
        assert!(matches!(policy.decide(ErrorKind::Transient, 2), RetryDecision::Retry { .. }));
        assert_eq!(policy.decide(ErrorKind::Transient, 3), RetryDecision::Exhausted);
    }

    #[test]
    fn rate_limited_never_goes_below_the_floor_delay() {
        let policy = RetryPolicy::default();
        match policy.decide(ErrorKind::RateLimited, 1) {
            RetryDecision::Retry { delay_ms } => assert!(delay_ms >= policy.rate_limit_floor_delay_ms),
            other => panic!("expected a retry, got {other:?}"),
        }
    }

    #[test]
    fn backoff_stays_within_the_property_5_bounds() {
        let base = 1_000u64;
        let cap = 30_000u64;
        for attempt in 1..=8u32 {
            let lower = (0.8 * base as f64 * 2f64.powi((attempt - 1) as i32)).floor() as u64;
            let upper = (1.2 * base as f64 * 2f64.powi((attempt - 1) as i32)).ceil().min(cap as f64) as u64;
            for _ in 0..50 {
                let delay = compute_backoff(base, attempt, cap);
                assert!(delay >= lower.min(cap) && delay <= upper, "attempt {attempt}: {delay} not in [{lower}, {upper}]");
            }
        }
    }

    #[test]
    fn backoff_never_exceeds_the_cap() {
        for _ in 0..20 {
            assert!(compute_backoff(1_000, 10, 30_000) <= 30_000);
        }
    }
}
