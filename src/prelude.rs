//! Convenient re-exports for common throttlecheck types.
pub use crate::{
    backoff::{BackoffPlan, MAX_DELAY},
    burst::{BurstResult, BurstRunner},
    error::{PlanError, PolicyError, ProbeError},
    exempt::{ExemptionReport, ExemptionVerifier},
    outcome::ProbeOutcome,
    policy::{ExemptEndpoints, TierPolicy},
    probe::{Probe, ProbeClient, ScriptedProbe},
    recovery::{RecoveryReport, RecoveryState, RecoveryVerifier},
    report::{ComplianceReport, Totals},
    scheduler::BackoffScheduler,
    sleeper::{InstantSleeper, RecordingSleeper, Sleeper, TokioSleeper},
    suite::ComplianceSuite,
    Jitter,
};
