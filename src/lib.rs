#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # throttlecheck
//!
//! Verifies the externally observable rate-limit behavior of an HTTP
//! service: probe classification, exponential-backoff retries, burst
//! saturation of the soft tier, exemption checks, and post-window recovery,
//! aggregated into a pass/fail report a CI job can act on.
//!
//! The remote limiter is treated as a black box: nothing here assumes a
//! sliding window, fixed window, or token bucket, only that exceeding the
//! declared budget inside the declared window yields 429s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use throttlecheck::{ComplianceSuite, ProbeClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ProbeClient::new("http://localhost:5000")?;
//!     let report = ComplianceSuite::new(Arc::new(client)).run().await;
//!     println!("{report}");
//!     std::process::exit(if report.passed() { 0 } else { 1 });
//! }
//! ```
//!
//! Every network call goes through the [`Probe`] trait and every wait
//! through the [`Sleeper`] trait, so the whole suite runs in tests against
//! a [`ScriptedProbe`] with no server and no real clock.

pub mod backoff;
pub mod burst;
pub mod error;
pub mod exempt;
pub mod jitter;
pub mod outcome;
pub mod policy;
pub mod prelude;
pub mod probe;
pub mod recovery;
pub mod report;
pub mod scheduler;
pub mod sleeper;
pub mod suite;

// Re-exports
pub use backoff::{BackoffPlan, MAX_DELAY};
pub use burst::{BurstResult, BurstRunner};
pub use error::{PlanError, PolicyError, ProbeError};
pub use exempt::{EndpointCheck, ExemptionReport, ExemptionVerifier};
pub use jitter::Jitter;
pub use outcome::ProbeOutcome;
pub use policy::{ExemptEndpoints, TierPolicy};
pub use probe::{Probe, ProbeClient, ScriptedProbe};
pub use recovery::{RecoveryReport, RecoveryState, RecoveryVerifier};
pub use report::{ComplianceReport, PhaseOutcome, Totals};
pub use scheduler::BackoffScheduler;
pub use sleeper::{InstantSleeper, RecordingSleeper, Sleeper, TokioSleeper};
pub use suite::ComplianceSuite;
