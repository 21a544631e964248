//! Rate-window probe runner.
//!
//! Fires a fixed-size burst of sequential probes against one endpoint,
//! pacing them client-side, to deliberately cross the soft-tier threshold
//! and measure the throttling it triggers within the same pass. The runner
//! never aborts early: throttles and failures are tallied, not raised, so a
//! single burst both trips the limiter and counts its responses.
//!
//! The exact throttle count is non-deterministic (the remote window and the
//! runner's own pacing both consume wall-clock time), so callers assert
//! `throttled > 0`, never an exact figure.

use crate::outcome::ProbeOutcome;
use crate::probe::Probe;
use crate::sleeper::Sleeper;
use std::sync::Arc;
use std::time::Duration;

/// Tally of one burst, in fire order.
///
/// Invariant: `successful + throttled + failed == outcomes.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BurstResult {
    pub successful: usize,
    pub throttled: usize,
    pub failed: usize,
    pub outcomes: Vec<ProbeOutcome>,
}

impl BurstResult {
    pub fn record(&mut self, outcome: ProbeOutcome) {
        match &outcome {
            ProbeOutcome::Success { .. } => self.successful += 1,
            ProbeOutcome::Throttled { .. } => self.throttled += 1,
            ProbeOutcome::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Number of probes fired.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Counter invariant check; holds after every `record`.
    pub fn is_consistent(&self) -> bool {
        self.successful + self.throttled + self.failed == self.outcomes.len()
    }
}

/// Sequential burst driver over a [`Probe`].
#[derive(Clone)]
pub struct BurstRunner {
    probe: Arc<dyn Probe>,
    sleeper: Arc<dyn Sleeper>,
}

impl BurstRunner {
    pub fn new(probe: Arc<dyn Probe>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { probe, sleeper }
    }

    /// Fire `count` probes at `endpoint`, sleeping `pacing` between
    /// consecutive probes (not after the last). Always completes the full
    /// count; choosing `count` above the soft limit is the caller's job.
    pub async fn run(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        count: usize,
        pacing: Duration,
    ) -> BurstResult {
        let mut result = BurstResult::default();
        for fired in 0..count {
            let outcome = self.probe.probe(endpoint, params).await;
            tracing::debug!(endpoint, request = fired + 1, outcome = %outcome, "burst probe");
            result.record(outcome);
            if fired + 1 < count && !pacing.is_zero() {
                self.sleeper.sleep(pacing).await;
            }
        }
        tracing::info!(
            endpoint,
            successful = result.successful,
            throttled = result.throttled,
            failed = result.failed,
            "burst complete"
        );
        debug_assert!(result.is_consistent());
        result
    }
}
