//! Backoff scheduler: the retry loop over a probe closure.
//!
//! Semantics:
//! - Up to `plan.max_attempts` total invocations (initial try included).
//! - Returns immediately on the first `Success`, consuming no further
//!   attempts.
//! - `Throttled` and `Failed` are both retryable here; when attempts remain,
//!   the scheduler sleeps `plan.delay(attempt)` (0-indexed, optionally
//!   jittered) and tries again.
//! - After exhausting all attempts it returns the last observed outcome
//!   verbatim; it never synthesizes a different one.
//! - `max_attempts == 1` degenerates to a single unconditional probe with no
//!   sleep.
//!
//! This is deliberately a separate policy from the burst runner: the
//! scheduler treats a 429 as something to wait out, the burst runner treats
//! it as an expected terminal outcome to count. The suite uses each where
//! the corresponding phase needs it.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use throttlecheck::{BackoffPlan, BackoffScheduler, ProbeOutcome};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let scheduler = BackoffScheduler::new(BackoffPlan::default());
//! let outcome = scheduler
//!     .run(|| async {
//!         ProbeOutcome::Success {
//!             status: 200,
//!             body: serde_json::json!({}),
//!             elapsed: Duration::ZERO,
//!         }
//!     })
//!     .await;
//! assert!(outcome.is_success());
//! # });
//! ```

use crate::backoff::BackoffPlan;
use crate::jitter::Jitter;
use crate::outcome::ProbeOutcome;
use crate::sleeper::{Sleeper, TokioSleeper};
use std::future::Future;
use std::sync::Arc;

/// Drives a probe closure through a bounded exponential retry sequence.
#[derive(Clone)]
pub struct BackoffScheduler {
    plan: BackoffPlan,
    jitter: Jitter,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for BackoffScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackoffScheduler")
            .field("plan", &self.plan)
            .field("jitter", &self.jitter)
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl BackoffScheduler {
    /// Scheduler with the given plan, no jitter, and the tokio sleeper.
    pub fn new(plan: BackoffPlan) -> Self {
        Self { plan, jitter: Jitter::None, sleeper: Arc::new(TokioSleeper) }
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn plan(&self) -> &BackoffPlan {
        &self.plan
    }

    /// Run `probe_fn` until success or the plan is exhausted, returning the
    /// last observed outcome.
    pub async fn run<F, Fut>(&self, mut probe_fn: F) -> ProbeOutcome
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = ProbeOutcome> + Send,
    {
        let mut attempt = 0;
        loop {
            let outcome = probe_fn().await;
            if outcome.is_success() {
                tracing::debug!(attempt = attempt + 1, "backoff succeeded");
                return outcome;
            }
            attempt += 1;
            if attempt >= self.plan.max_attempts() {
                tracing::warn!(
                    attempts = attempt,
                    outcome = %outcome,
                    "backoff exhausted"
                );
                return outcome;
            }
            let delay = self.jitter.apply(self.plan.delay(attempt - 1));
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, outcome = %outcome, "backing off");
            self.sleeper.sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::sleeper::{InstantSleeper, RecordingSleeper};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn ok() -> ProbeOutcome {
        ProbeOutcome::Success { status: 200, body: json!({}), elapsed: Duration::ZERO }
    }

    fn throttled() -> ProbeOutcome {
        ProbeOutcome::Throttled {
            reason: Some("rate limit exceeded".into()),
            retry_after: None,
            elapsed: Duration::ZERO,
        }
    }

    fn plan(attempts: usize) -> BackoffPlan {
        BackoffPlan::new(attempts, Duration::from_secs(1), 2.0).unwrap()
    }

    #[tokio::test]
    async fn returns_on_first_success_without_sleeping() {
        let sleeper = RecordingSleeper::new();
        let scheduler = BackoffScheduler::new(plan(5)).with_sleeper(sleeper.clone());
        let calls = AtomicUsize::new(0);

        let outcome = scheduler
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { ok() }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.requested().is_empty());
    }

    #[tokio::test]
    async fn retries_throttle_until_success() {
        let scheduler = BackoffScheduler::new(plan(5)).with_sleeper(InstantSleeper);
        let calls = AtomicUsize::new(0);

        let outcome = scheduler
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        throttled()
                    } else {
                        ok()
                    }
                }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3, "success on the third attempt");
    }

    #[tokio::test]
    async fn never_exceeds_max_attempts() {
        let scheduler = BackoffScheduler::new(plan(3)).with_sleeper(InstantSleeper);
        let calls = AtomicUsize::new(0);

        let outcome = scheduler
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { throttled() }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(outcome.is_throttled(), "last observed outcome comes back verbatim");
    }

    #[tokio::test]
    async fn exhaustion_returns_last_outcome_not_a_synthesized_one() {
        let scheduler = BackoffScheduler::new(plan(2)).with_sleeper(InstantSleeper);
        let calls = AtomicUsize::new(0);

        let outcome = scheduler
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        throttled()
                    } else {
                        ProbeOutcome::Failed {
                            error: ProbeError::UnexpectedStatus { status: 503 },
                            elapsed: Duration::ZERO,
                        }
                    }
                }
            })
            .await;

        assert_eq!(outcome.status(), Some(503));
    }

    #[tokio::test]
    async fn single_attempt_is_one_unconditional_probe() {
        let sleeper = RecordingSleeper::new();
        let scheduler = BackoffScheduler::new(plan(1)).with_sleeper(sleeper.clone());
        let calls = AtomicUsize::new(0);

        let outcome = scheduler
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { throttled() }
            })
            .await;

        assert!(outcome.is_throttled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.requested().is_empty(), "no sleep when there is no retry");
    }

    #[tokio::test]
    async fn sleeps_follow_the_exponential_schedule() {
        let sleeper = RecordingSleeper::new();
        let scheduler = BackoffScheduler::new(plan(4)).with_sleeper(sleeper.clone());

        scheduler.run(|| async { throttled() }).await;

        // 4 attempts, 3 sleeps: 1s, 2s, 4s
        assert_eq!(
            sleeper.requested(),
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn failed_outcomes_are_retried_too() {
        let scheduler = BackoffScheduler::new(plan(4)).with_sleeper(InstantSleeper);
        let calls = AtomicUsize::new(0);

        let outcome = scheduler
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        ProbeOutcome::Failed {
                            error: ProbeError::Transport("connection refused".into()),
                            elapsed: Duration::ZERO,
                        }
                    } else {
                        ok()
                    }
                }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
