//! Report aggregation.
//!
//! Pure summation and boolean-AND over phase results; no network or timing
//! side effects. The textual rendering is one `Display` impl so the report
//! can go to any sink (stdout, a CI log, a tracing event) while automation
//! reads [`ComplianceReport::passed`] directly.

use crate::burst::BurstResult;
use std::fmt;

/// Summed counters across any number of bursts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub successful: usize,
    pub throttled: usize,
    pub failed: usize,
}

impl Totals {
    /// Pure summation over burst tallies.
    pub fn summarize(results: &[BurstResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            acc.successful += r.successful;
            acc.throttled += r.throttled;
            acc.failed += r.failed;
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.successful + self.throttled + self.failed
    }
}

/// One verification phase's verdict.
///
/// `detail` distinguishes assertion failures ("exempt endpoint /logs was
/// throttled") from transport-level trouble; both flip `passed` to false,
/// neither is silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub phase: String,
    pub passed: bool,
    pub detail: String,
}

/// Aggregate verdict over an entire verification run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceReport {
    pub phases: Vec<PhaseOutcome>,
    pub totals: Totals,
}

impl ComplianceReport {
    pub fn record_phase(
        &mut self,
        phase: impl Into<String>,
        passed: bool,
        detail: impl Into<String>,
    ) {
        self.phases.push(PhaseOutcome {
            phase: phase.into(),
            passed,
            detail: detail.into(),
        });
    }

    pub fn absorb(&mut self, result: &BurstResult) {
        self.totals.successful += result.successful;
        self.totals.throttled += result.throttled;
        self.totals.failed += result.failed;
    }

    /// True iff every recorded phase held.
    pub fn passed(&self) -> bool {
        self.phases.iter().all(|p| p.passed)
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseOutcome> {
        self.phases.iter().find(|p| p.phase == name)
    }
}

impl fmt::Display for ComplianceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rate-limit compliance report")?;
        for phase in &self.phases {
            let verdict = if phase.passed { "PASS" } else { "FAIL" };
            writeln!(f, "  [{verdict}] {}: {}", phase.phase, phase.detail)?;
        }
        writeln!(
            f,
            "  totals: {} successful, {} throttled, {} failed ({} probes)",
            self.totals.successful,
            self.totals.throttled,
            self.totals.failed,
            self.totals.total()
        )?;
        write!(f, "overall: {}", if self.passed() { "PASS" } else { "FAIL" })
    }
}
