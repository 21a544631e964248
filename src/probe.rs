//! Probe client: one classified request per call.
//!
//! [`ProbeClient`] issues exactly one GET and maps the response onto a
//! [`ProbeOutcome`] purely by status code. It never retries internally;
//! retries belong to the backoff scheduler, and keeping them out of the
//! probe lets burst runs observe raw throttle behavior. It also never
//! returns `Err` for expected failure categories; transport errors,
//! unexpected statuses, and malformed bodies all come back as
//! `ProbeOutcome::Failed`.
//!
//! [`ScriptedProbe`] is the test double: it replays a queued sequence of
//! outcomes and records which endpoints were hit, so verifiers can be
//! exercised without a server or real clock.

use crate::error::ProbeError;
use crate::outcome::ProbeOutcome;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Seam between the verifiers and the network.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Issue a single classified request against `endpoint`.
    async fn probe(&self, endpoint: &str, params: &[(String, String)]) -> ProbeOutcome;
}

/// Default per-request timeout, matching the service's documented client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP probe client over reqwest.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProbeClient {
    /// Build a client for `base_url` with the default 10s request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Build a client with an explicit per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.into() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn describe_transport(err: &reqwest::Error) -> String {
        if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        }
    }

    async fn classify(response: reqwest::Response, start: Instant) -> ProbeOutcome {
        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            // The service puts the throttle reason in an `error` field;
            // tolerate bodies that omit it or are not JSON at all.
            let reason = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_owned));
            return ProbeOutcome::Throttled { reason, retry_after, elapsed: start.elapsed() };
        }
        if status.is_success() {
            return match response.json::<Value>().await {
                Ok(body) => ProbeOutcome::Success {
                    status: status.as_u16(),
                    body,
                    elapsed: start.elapsed(),
                },
                Err(err) if err.is_decode() => ProbeOutcome::Failed {
                    error: ProbeError::MalformedBody(err.to_string()),
                    elapsed: start.elapsed(),
                },
                Err(err) => ProbeOutcome::Failed {
                    error: ProbeError::Transport(Self::describe_transport(&err)),
                    elapsed: start.elapsed(),
                },
            };
        }
        ProbeOutcome::Failed {
            error: ProbeError::UnexpectedStatus { status: status.as_u16() },
            elapsed: start.elapsed(),
        }
    }
}

#[async_trait]
impl Probe for ProbeClient {
    async fn probe(&self, endpoint: &str, params: &[(String, String)]) -> ProbeOutcome {
        let url = format!("{}{}", self.base_url, endpoint);
        let start = Instant::now();
        let outcome = match self.http.get(&url).query(params).send().await {
            Ok(response) => Self::classify(response, start).await,
            Err(err) => ProbeOutcome::Failed {
                error: ProbeError::Transport(Self::describe_transport(&err)),
                elapsed: start.elapsed(),
            },
        };
        tracing::debug!(endpoint, outcome = %outcome, elapsed_ms = outcome.elapsed().as_millis() as u64, "probe");
        outcome
    }
}

/// Test double that replays canned outcomes in order.
///
/// Once the script runs dry, further probes fail with a transport error, so
/// an under-provisioned script shows up as a failure count instead of a hang.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    script: Mutex<VecDeque<ProbeOutcome>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new(outcomes: impl IntoIterator<Item = ProbeOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append another outcome to the script.
    pub fn push(&self, outcome: ProbeOutcome) {
        self.script.lock().expect("script lock").push_back(outcome);
    }

    /// Endpoints probed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().expect("script lock").len()
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, endpoint: &str, _params: &[(String, String)]) -> ProbeOutcome {
        self.calls.lock().expect("calls lock").push(endpoint.to_string());
        self.script.lock().expect("script lock").pop_front().unwrap_or(ProbeOutcome::Failed {
            error: ProbeError::Transport("scripted probe exhausted".into()),
            elapsed: Duration::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok() -> ProbeOutcome {
        ProbeOutcome::Success { status: 200, body: json!({}), elapsed: Duration::ZERO }
    }

    fn throttled() -> ProbeOutcome {
        ProbeOutcome::Throttled { reason: None, retry_after: None, elapsed: Duration::ZERO }
    }

    #[tokio::test]
    async fn scripted_probe_replays_in_order() {
        let probe = ScriptedProbe::new([throttled(), ok()]);
        assert!(probe.probe("/api/users", &[]).await.is_throttled());
        assert!(probe.probe("/api/users", &[]).await.is_success());
        assert_eq!(probe.calls(), vec!["/api/users", "/api/users"]);
    }

    #[tokio::test]
    async fn exhausted_script_fails_as_transport() {
        let probe = ScriptedProbe::new([ok()]);
        probe.probe("/health", &[]).await;
        let outcome = probe.probe("/health", &[]).await;
        assert!(outcome.error().is_some_and(ProbeError::is_transport));
        assert_eq!(probe.call_count(), 2);
    }

    #[tokio::test]
    async fn push_extends_the_script() {
        let probe = ScriptedProbe::new([]);
        probe.push(ok());
        assert_eq!(probe.remaining(), 1);
        assert!(probe.probe("/health", &[]).await.is_success());
        assert_eq!(probe.remaining(), 0);
    }
}
