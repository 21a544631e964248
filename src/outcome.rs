//! Probe outcome classification.
//!
//! Every probe produces exactly one [`ProbeOutcome`]; expected failure
//! categories are values, never propagated errors. Semantics:
//! - `Success`: any 2xx with a parseable JSON body.
//! - `Throttled`: exactly 429. The `reason` is the service's `error` string
//!   when the body carries one; `retry_after` is the `Retry-After` header as
//!   a hint, when present.
//! - `Failed`: everything else; see [`ProbeError`] for the taxonomy.
//!
//! Outcomes are immutable once produced and consumed by exactly one caller
//! (a burst tally, the backoff scheduler, or the recovery verifier).

use crate::error::ProbeError;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Classified result of a single probe against the service under test.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// 2xx response with a JSON body.
    Success { status: u16, body: Value, elapsed: Duration },
    /// 429 response; the soft tier rejected the request.
    Throttled { reason: Option<String>, retry_after: Option<Duration>, elapsed: Duration },
    /// Transport failure, unexpected status, or malformed body.
    Failed { error: ProbeError, elapsed: Duration },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Wall-clock time spent on the network call.
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed, .. }
            | Self::Throttled { elapsed, .. }
            | Self::Failed { elapsed, .. } => *elapsed,
        }
    }

    /// Status code, where one was observed (`Throttled` is always 429).
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } => Some(*status),
            Self::Throttled { .. } => Some(429),
            Self::Failed { error: ProbeError::UnexpectedStatus { status }, .. } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    /// Borrow the response body for successful probes.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Borrow the classification error for failed probes.
    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The service-reported throttle reason, if any.
    pub fn throttle_reason(&self) -> Option<&str> {
        match self {
            Self::Throttled { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { status, .. } => write!(f, "success ({status})"),
            Self::Throttled { reason: Some(reason), .. } => {
                write!(f, "throttled (429): {reason}")
            }
            Self::Throttled { reason: None, .. } => write!(f, "throttled (429)"),
            Self::Failed { error, .. } => write!(f, "failed: {error}"),
        }
    }
}
