//! Recovery verifier.
//!
//! Confirms that the soft tier actually resets: deliberately exhaust the
//! window with a paced burst, sit out the declared window length, then issue
//! exactly one probe and require it to succeed. The walk through the states
//! is strictly linear:
//!
//! `Saturating → Throttled → Waiting → Verifying → Recovered`
//!
//! with three non-passing terminals: `NotSaturated` (the burst never drew a
//! 429, so there is nothing to recover from), `StillThrottled` (the window
//! did not reset: reported, never retried), and `VerificationFailed` (the
//! single probe failed outright).

use crate::burst::{BurstResult, BurstRunner};
use crate::outcome::ProbeOutcome;
use crate::policy::TierPolicy;
use crate::probe::Probe;
use crate::sleeper::Sleeper;
use std::sync::Arc;
use std::time::Duration;

/// Client-side pacing used while saturating the window.
pub const SATURATION_PACING: Duration = Duration::from_millis(100);

/// Margin added to the declared window before the verification probe; the
/// remote window boundary is not wall-clock precise.
pub const WINDOW_GRACE: Duration = Duration::from_secs(5);

/// Where the recovery walk ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Saturating,
    Throttled,
    Waiting,
    Verifying,
    /// The window reset and a fresh probe succeeded.
    Recovered,
    /// The verification probe was throttled again.
    StillThrottled,
    /// The saturation burst drew no throttle at all.
    NotSaturated,
    /// The verification probe failed outside the throttle vocabulary.
    VerificationFailed,
}

impl RecoveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Recovered | Self::StillThrottled | Self::NotSaturated | Self::VerificationFailed
        )
    }
}

/// Full record of one recovery cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryReport {
    pub state: RecoveryState,
    pub saturation: BurstResult,
    /// Outcome of the single post-wait probe; `None` when saturation failed.
    pub verification: Option<ProbeOutcome>,
}

impl RecoveryReport {
    pub fn passed(&self) -> bool {
        self.state == RecoveryState::Recovered
    }
}

/// Saturate, wait out the window, verify a single probe succeeds.
#[derive(Clone)]
pub struct RecoveryVerifier {
    probe: Arc<dyn Probe>,
    sleeper: Arc<dyn Sleeper>,
    policy: TierPolicy,
    pacing: Duration,
}

impl RecoveryVerifier {
    pub fn new(probe: Arc<dyn Probe>, sleeper: Arc<dyn Sleeper>, policy: TierPolicy) -> Self {
        Self { probe, sleeper, policy, pacing: SATURATION_PACING }
    }

    /// Override the saturation pacing (tests mostly).
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub async fn run(&self, endpoint: &str, params: &[(String, String)]) -> RecoveryReport {
        let mut state = RecoveryState::Saturating;
        tracing::info!(endpoint, state = ?state, "saturating soft-tier window");

        let runner = BurstRunner::new(self.probe.clone(), self.sleeper.clone());
        let saturation = runner
            .run(endpoint, params, self.policy.saturating_count(), self.pacing)
            .await;

        if saturation.throttled == 0 {
            state = RecoveryState::NotSaturated;
            tracing::warn!(endpoint, state = ?state, "burst did not saturate as expected");
            return RecoveryReport { state, saturation, verification: None };
        }

        state = RecoveryState::Throttled;
        tracing::info!(endpoint, state = ?state, throttled = saturation.throttled, "window saturated");

        state = RecoveryState::Waiting;
        let wait = self.policy.soft_window + WINDOW_GRACE;
        tracing::info!(endpoint, state = ?state, wait_secs = wait.as_secs(), "waiting out the window");
        self.sleeper.sleep(wait).await;

        state = RecoveryState::Verifying;
        tracing::info!(endpoint, state = ?state, "single verification probe");
        let verification = self.probe.probe(endpoint, params).await;

        state = match &verification {
            ProbeOutcome::Success { .. } => RecoveryState::Recovered,
            ProbeOutcome::Throttled { .. } => RecoveryState::StillThrottled,
            ProbeOutcome::Failed { .. } => RecoveryState::VerificationFailed,
        };
        tracing::info!(endpoint, state = ?state, outcome = %verification, "recovery verdict");

        RecoveryReport { state, saturation, verification: Some(verification) }
    }
}
