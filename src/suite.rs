//! End-to-end compliance suite.
//!
//! Drives the individual verifiers in a fixed order against one target and
//! folds their verdicts into a single [`ComplianceReport`]:
//!
//! 1. **saturation**: paced burst past the soft limit; requires at least
//!    one throttle.
//! 2. **exemption**: unpaced bursts against every exempt endpoint; requires
//!    zero throttles and zero failures.
//! 3. **backoff**: exponential-backoff retries against the target; requires
//!    an eventual success.
//! 4. **recovery** (opt-in): saturate, wait out the window, verify a single
//!    probe succeeds. Off by default because it spends more than a minute of
//!    wall-clock time on the window wait.
//!
//! Execution is strictly sequential; every wait is a full suspension of the
//! run, so the remote window accounting stays attributable to one phase at a
//! time. All remote effects flow through the [`Probe`] seam and all waits
//! through the [`Sleeper`] seam, which is what makes the suite testable
//! without a service or a real clock.

use crate::backoff::BackoffPlan;
use crate::burst::BurstRunner;
use crate::exempt::{ExemptionVerifier, DEFAULT_EXEMPT_BURST};
use crate::policy::{ExemptEndpoints, TierPolicy};
use crate::probe::Probe;
use crate::recovery::RecoveryVerifier;
use crate::report::ComplianceReport;
use crate::scheduler::BackoffScheduler;
use crate::sleeper::{Sleeper, TokioSleeper};
use std::sync::Arc;
use std::time::Duration;

/// Pacing between probes in the saturation phase.
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Default rate-limited target.
pub const DEFAULT_TARGET: &str = "/api/users";

/// Sequential driver for the whole verification run.
#[derive(Clone)]
pub struct ComplianceSuite {
    probe: Arc<dyn Probe>,
    sleeper: Arc<dyn Sleeper>,
    policy: TierPolicy,
    exempt: ExemptEndpoints,
    plan: BackoffPlan,
    target: String,
    target_params: Vec<(String, String)>,
    pacing: Duration,
    exempt_burst: usize,
    run_recovery: bool,
}

impl ComplianceSuite {
    /// Suite with the documented defaults: `/api/users?count=1` target,
    /// 30/60s soft tier, the standard exempt set, a 5×2x backoff plan, and
    /// recovery disabled.
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self {
            probe,
            sleeper: Arc::new(TokioSleeper),
            policy: TierPolicy::default(),
            exempt: ExemptEndpoints::default(),
            plan: BackoffPlan::default(),
            target: DEFAULT_TARGET.to_string(),
            target_params: vec![("count".to_string(), "1".to_string())],
            pacing: DEFAULT_PACING,
            exempt_burst: DEFAULT_EXEMPT_BURST,
            run_recovery: false,
        }
    }

    pub fn with_policy(mut self, policy: TierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_exempt(mut self, exempt: ExemptEndpoints) -> Self {
        self.exempt = exempt;
        self
    }

    pub fn with_plan(mut self, plan: BackoffPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_target(
        mut self,
        endpoint: impl Into<String>,
        params: Vec<(String, String)>,
    ) -> Self {
        self.target = endpoint.into();
        self.target_params = params;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_exempt_burst(mut self, count: usize) -> Self {
        self.exempt_burst = count;
        self
    }

    /// Enable the recovery phase (a full window wait of wall-clock time when
    /// run against a real service).
    pub fn with_recovery(mut self, enabled: bool) -> Self {
        self.run_recovery = enabled;
        self
    }

    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Run every enabled phase in order and aggregate the verdicts.
    pub async fn run(&self) -> ComplianceReport {
        let mut report = ComplianceReport::default();
        let runner = BurstRunner::new(self.probe.clone(), self.sleeper.clone());

        // Phase 1: cross the soft limit and demand at least one 429. The
        // exact throttle count is window-dependent, so only > 0 is asserted.
        let count = self.policy.saturating_count();
        tracing::info!(endpoint = %self.target, count, "saturation phase");
        let saturation = runner.run(&self.target, &self.target_params, count, self.pacing).await;
        report.absorb(&saturation);
        report.record_phase(
            "saturation",
            saturation.throttled > 0,
            format!(
                "{} of {} probes throttled ({} successful, {} failed)",
                saturation.throttled, count, saturation.successful, saturation.failed
            ),
        );

        // Phase 2: exempt endpoints must never throttle, even unpaced.
        tracing::info!(endpoints = self.exempt.len(), "exemption phase");
        let exemption = ExemptionVerifier::new(runner.clone())
            .verify(&self.exempt, self.exempt_burst)
            .await;
        for check in &exemption.checks {
            report.absorb(&check.result);
        }
        let exemption_detail = if exemption.passed() {
            format!(
                "no throttles across {} probes on {} endpoints",
                self.exempt_burst * self.exempt.len(),
                self.exempt.len()
            )
        } else {
            let offenders: Vec<String> = exemption
                .checks
                .iter()
                .filter(|c| !c.passed())
                .map(|c| {
                    format!(
                        "{} ({} throttled, {} failed)",
                        c.endpoint, c.result.throttled, c.result.failed
                    )
                })
                .collect();
            format!("exempt endpoints misbehaved: {}", offenders.join(", "))
        };
        report.record_phase("exemption", exemption.passed(), exemption_detail);

        // Phase 3: the retry-with-backoff treatment of the same target.
        tracing::info!(endpoint = %self.target, attempts = self.plan.max_attempts(), "backoff phase");
        let scheduler =
            BackoffScheduler::new(self.plan.clone()).with_sleeper(self.sleeper.clone());
        let probe = self.probe.clone();
        let target = self.target.clone();
        let params = self.target_params.clone();
        let outcome = scheduler
            .run(move || {
                let probe = probe.clone();
                let target = target.clone();
                let params = params.clone();
                async move { probe.probe(&target, &params).await }
            })
            .await;
        report.record_phase(
            "backoff",
            outcome.is_success(),
            format!("final outcome after at most {} attempts: {}", self.plan.max_attempts(), outcome),
        );

        // Phase 4 (opt-in): the window actually resets.
        if self.run_recovery {
            tracing::info!(endpoint = %self.target, "recovery phase");
            let recovery =
                RecoveryVerifier::new(self.probe.clone(), self.sleeper.clone(), self.policy.clone())
                    .with_pacing(self.pacing)
                    .run(&self.target, &self.target_params)
                    .await;
            report.absorb(&recovery.saturation);
            report.record_phase(
                "recovery",
                recovery.passed(),
                format!("terminal state: {:?}", recovery.state),
            );
        }

        tracing::info!(passed = report.passed(), "compliance run complete");
        report
    }
}
