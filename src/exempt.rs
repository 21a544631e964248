//! Exemption verifier.
//!
//! Certain endpoints (health check, log listing, blocklist query) are
//! declared exempt from both rate tiers. This verifier bursts each of them
//! with no pacing, as fast as the transport allows, to maximize throttling
//! pressure if any existed, and requires zero throttles. A throttled exempt
//! endpoint is a verification failure, never a retryable condition; so is
//! any unexpected failure during what should be a clean check.

use crate::burst::{BurstResult, BurstRunner};
use crate::policy::ExemptEndpoints;
use std::time::Duration;

/// Default burst size per exempt endpoint.
pub const DEFAULT_EXEMPT_BURST: usize = 50;

/// One exempt endpoint's burst and verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCheck {
    pub endpoint: String,
    pub result: BurstResult,
}

impl EndpointCheck {
    /// Exemption holds iff nothing was throttled and nothing failed.
    pub fn passed(&self) -> bool {
        self.result.throttled == 0 && self.result.failed == 0
    }
}

/// Results for the whole exempt set, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExemptionReport {
    pub checks: Vec<EndpointCheck>,
}

impl ExemptionReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(EndpointCheck::passed)
    }

    pub fn result_for(&self, endpoint: &str) -> Option<&BurstResult> {
        self.checks.iter().find(|c| c.endpoint == endpoint).map(|c| &c.result)
    }
}

/// Bursts every declared-exempt endpoint and checks none were throttled.
#[derive(Clone)]
pub struct ExemptionVerifier {
    runner: BurstRunner,
}

impl ExemptionVerifier {
    pub fn new(runner: BurstRunner) -> Self {
        Self { runner }
    }

    /// Run an unpaced burst of `burst_count` probes against each endpoint.
    pub async fn verify(
        &self,
        endpoints: &ExemptEndpoints,
        burst_count: usize,
    ) -> ExemptionReport {
        let mut report = ExemptionReport::default();
        for endpoint in endpoints.iter() {
            tracing::info!(endpoint, burst_count, "checking exempt endpoint");
            let result = self.runner.run(endpoint, &[], burst_count, Duration::ZERO).await;
            let check = EndpointCheck { endpoint: endpoint.to_string(), result };
            if !check.passed() {
                tracing::warn!(
                    endpoint,
                    throttled = check.result.throttled,
                    failed = check.result.failed,
                    "exempt endpoint was not exempt"
                );
            }
            report.checks.push(check);
        }
        report
    }
}
