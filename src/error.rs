//! Error types for probe classification and configuration.

use std::time::Duration;
use thiserror::Error;

/// Failure categories for a single probe.
///
/// These cover everything that is *not* a success and *not* a throttle:
/// network-level trouble, a status code outside the expected vocabulary,
/// or a 2xx response whose body could not be parsed. A 429 is never a
/// `ProbeError`; it is an expected outcome ([`crate::ProbeOutcome::Throttled`]).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// Connection refused, request timeout, or any other network-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a status code outside 2xx/429.
    #[error("unexpected status code {status}")]
    UnexpectedStatus { status: u16 },

    /// A 2xx response whose body was not valid JSON.
    #[error("malformed body: {0}")]
    MalformedBody(String),
}

impl ProbeError {
    /// True for network-level failures (no classified response at all).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { .. })
    }

    pub fn is_malformed_body(&self) -> bool {
        matches!(self, Self::MalformedBody(_))
    }
}

/// Errors returned while constructing a [`crate::BackoffPlan`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("max_attempts must be > 0")]
    ZeroAttempts,
    #[error("base_delay must be greater than zero")]
    ZeroBaseDelay,
    #[error("multiplier must be > 1 (got {0})")]
    MultiplierNotIncreasing(f64),
}

/// Errors returned while constructing a [`crate::TierPolicy`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("tier limits must be > 0")]
    ZeroLimit,
    #[error("tier windows must be greater than zero")]
    ZeroWindow,
    #[error("hard tier ({hard}) must admit at least as many requests as the soft tier ({soft})")]
    HardBelowSoft { soft: u32, hard: u32 },
    #[error("hard window ({hard:?}) must be at least as long as the soft window ({soft:?})")]
    HardWindowBelowSoft { soft: Duration, hard: Duration },
}
