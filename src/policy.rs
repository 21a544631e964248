//! Declared rate policy under test.
//!
//! [`TierPolicy`] describes the remote service's externally observed limits
//! and is used only to size bursts and decide when recovery is expected. The
//! limiter's internal algorithm (sliding window, fixed window, token bucket)
//! is deliberately not modeled; the verifiers assert on status codes and
//! timing alone.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Two-tier request budget the service advertises.
///
/// Only the soft tier is actively verified; the hard tier is carried for
/// sizing and documentation (its blocking behavior is out of scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Requests admitted per soft window before 429s begin.
    pub soft_limit: u32,
    /// Length of the soft rolling window.
    #[serde(with = "duration_secs")]
    pub soft_window: Duration,
    /// Requests admitted per hard window before stronger blocking.
    pub hard_limit: u32,
    /// Length of the hard rolling window.
    #[serde(with = "duration_secs")]
    pub hard_window: Duration,
}

impl TierPolicy {
    /// Build a validated policy.
    pub fn new(
        soft_limit: u32,
        soft_window: Duration,
        hard_limit: u32,
        hard_window: Duration,
    ) -> Result<Self, PolicyError> {
        if soft_limit == 0 || hard_limit == 0 {
            return Err(PolicyError::ZeroLimit);
        }
        if soft_window.is_zero() || hard_window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        if hard_limit < soft_limit {
            return Err(PolicyError::HardBelowSoft { soft: soft_limit, hard: hard_limit });
        }
        if hard_window < soft_window {
            return Err(PolicyError::HardWindowBelowSoft {
                soft: soft_window,
                hard: hard_window,
            });
        }
        Ok(Self { soft_limit, soft_window, hard_limit, hard_window })
    }

    /// Burst size guaranteed to cross the soft limit (limit + 5, the margin
    /// the original compliance scripts use).
    pub fn saturating_count(&self) -> usize {
        self.soft_limit as usize + 5
    }
}

impl Default for TierPolicy {
    /// StatusService's documented tiers: 30 requests / 60s, 200 / 600s.
    fn default() -> Self {
        Self {
            soft_limit: 30,
            soft_window: Duration::from_secs(60),
            hard_limit: 200,
            hard_window: Duration::from_secs(600),
        }
    }
}

/// Endpoints declared exempt from both tiers. Static input, never derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExemptEndpoints(Vec<String>);

impl ExemptEndpoints {
    pub fn new(endpoints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(endpoints.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.0.iter().any(|e| e == endpoint)
    }
}

impl Default for ExemptEndpoints {
    /// Health check, log listing, and IP-blocklist query.
    fn default() -> Self {
        Self::new(["/health", "/logs", "/blocklist"])
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
