//! Exponential backoff plans.
//!
//! A [`BackoffPlan`] is a pure value: `delay(attempt)` is
//! `base_delay * multiplier^attempt` with the attempt index 0-based, so the
//! first retry waits exactly `base_delay`. The schedule is strictly
//! increasing for any `multiplier > 1` and saturates at [`MAX_DELAY`] to
//! avoid overflow.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use throttlecheck::BackoffPlan;
//!
//! let plan = BackoffPlan::new(5, Duration::from_secs(1), 2.0).unwrap();
//! assert_eq!(plan.delay(0), Duration::from_secs(1));
//! assert_eq!(plan.delay(1), Duration::from_secs(2));
//! assert_eq!(plan.delay(3), Duration::from_secs(8));
//! ```

use crate::error::PlanError;
use std::time::Duration;

/// Delays saturate here (1 hour) when the exponential would overflow.
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// Configuration for a bounded exponential retry sequence.
///
/// `max_attempts` counts total probe invocations, not just retries;
/// `max_attempts == 1` degenerates to a single unconditional probe.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPlan {
    max_attempts: usize,
    base_delay: Duration,
    multiplier: f64,
}

impl BackoffPlan {
    /// Build a validated plan. `max_attempts` must be positive, `base_delay`
    /// non-zero, and `multiplier` strictly greater than 1.
    pub fn new(
        max_attempts: usize,
        base_delay: Duration,
        multiplier: f64,
    ) -> Result<Self, PlanError> {
        if max_attempts == 0 {
            return Err(PlanError::ZeroAttempts);
        }
        if base_delay.is_zero() {
            return Err(PlanError::ZeroBaseDelay);
        }
        if multiplier.is_nan() || multiplier <= 1.0 {
            return Err(PlanError::MultiplierNotIncreasing(multiplier));
        }
        Ok(Self { max_attempts, base_delay, multiplier })
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Delay before the retry following `attempt` (0-indexed).
    ///
    /// `delay(0) == base_delay`; each subsequent attempt multiplies the
    /// previous delay. Saturates at [`MAX_DELAY`] rather than overflowing.
    pub fn delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.min(i32::MAX as usize) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= MAX_DELAY.as_secs_f64() {
            return MAX_DELAY;
        }
        Duration::from_secs_f64(secs)
    }
}

impl Default for BackoffPlan {
    /// 5 attempts, 1 second base, doubling: the schedule the backoff
    /// demonstration phase runs with.
    fn default() -> Self {
        Self { max_attempts: 5, base_delay: Duration::from_secs(1), multiplier: 2.0 }
    }
}
