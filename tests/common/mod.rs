#![allow(dead_code)] // not every integration suite uses every helper

use std::time::Duration;
use throttlecheck::{ProbeError, ProbeOutcome};

pub fn success() -> ProbeOutcome {
    ProbeOutcome::Success {
        status: 200,
        body: serde_json::json!({"count": 1}),
        elapsed: Duration::from_millis(5),
    }
}

pub fn throttled() -> ProbeOutcome {
    ProbeOutcome::Throttled {
        reason: Some("rate limit exceeded".into()),
        retry_after: Some(Duration::from_secs(30)),
        elapsed: Duration::from_millis(2),
    }
}

pub fn server_error() -> ProbeOutcome {
    ProbeOutcome::Failed {
        error: ProbeError::UnexpectedStatus { status: 500 },
        elapsed: Duration::from_millis(3),
    }
}

/// The shape a fixed 30/60s soft window answers a 35-probe burst with.
pub fn saturating_burst() -> Vec<ProbeOutcome> {
    let mut script = vec![success(); 30];
    script.extend(vec![throttled(); 5]);
    script
}
