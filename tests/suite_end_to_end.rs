//! Full compliance runs against scripted services.

mod common;

use std::sync::Arc;
use std::time::Duration;
use throttlecheck::{
    BackoffPlan, ComplianceSuite, RecordingSleeper, ScriptedProbe, TierPolicy,
};

/// Script a service that behaves exactly as documented: a fixed 30/60s soft
/// window, exempt endpoints that never throttle, and a limiter that admits
/// the backoff phase's retry.
fn compliant_service(exempt_burst: usize) -> Vec<throttlecheck::ProbeOutcome> {
    let mut script = common::saturating_burst();
    script.extend(vec![common::success(); exempt_burst * 3]);
    script.push(common::throttled()); // backoff: first attempt still throttled
    script.push(common::success()); // second attempt goes through
    script
}

#[tokio::test]
async fn compliant_service_passes_and_renders_pass() {
    let probe = Arc::new(ScriptedProbe::new(compliant_service(10)));
    let sleeper = RecordingSleeper::new();
    let suite = ComplianceSuite::new(probe)
        .with_sleeper(sleeper.clone())
        .with_exempt_burst(10);

    let report = suite.run().await;

    assert!(report.passed());
    let text = report.to_string();
    assert!(text.contains("[PASS] saturation"));
    assert!(text.contains("[PASS] exemption"));
    assert!(text.contains("[PASS] backoff"));
    assert!(text.ends_with("overall: PASS"));
}

#[tokio::test]
async fn saturation_burst_paces_at_100ms_and_throttles() {
    let probe = Arc::new(ScriptedProbe::new(compliant_service(5)));
    let sleeper = RecordingSleeper::new();
    let suite = ComplianceSuite::new(probe)
        .with_sleeper(sleeper.clone())
        .with_exempt_burst(5);

    let report = suite.run().await;

    assert!(report.phase("saturation").unwrap().passed);
    assert!(report.totals.throttled > 0);
    // 35-probe saturation burst: 34 pacing sleeps of 100ms, then one
    // backoff sleep of 1s before the successful retry.
    let pacing: Vec<_> = sleeper
        .requested()
        .into_iter()
        .filter(|d| *d == Duration::from_millis(100))
        .collect();
    assert_eq!(pacing.len(), 34);
    assert!(sleeper.requested().contains(&Duration::from_secs(1)));
}

#[tokio::test]
async fn backoff_phase_respects_the_attempt_budget() {
    // Backoff never succeeds: the script answers every retry with a 429.
    let mut script = common::saturating_burst();
    script.extend(vec![common::success(); 15]);
    script.extend(vec![common::throttled(); 3]);
    let probe = Arc::new(ScriptedProbe::new(script));
    let plan = BackoffPlan::new(3, Duration::from_secs(1), 2.0).unwrap();
    let suite = ComplianceSuite::new(probe.clone())
        .with_sleeper(RecordingSleeper::new())
        .with_exempt_burst(5)
        .with_plan(plan);

    let report = suite.run().await;

    assert!(!report.phase("backoff").unwrap().passed);
    // 35 saturation + 15 exemption + exactly 3 backoff attempts
    assert_eq!(probe.call_count(), 53);
}

#[tokio::test]
async fn recovery_waits_the_window_and_passes_on_reset() {
    let mut script = compliant_service(5);
    script.extend(common::saturating_burst()); // recovery saturation
    script.push(common::success()); // post-wait verification probe
    let probe = Arc::new(ScriptedProbe::new(script));
    let sleeper = RecordingSleeper::new();
    let suite = ComplianceSuite::new(probe)
        .with_sleeper(sleeper.clone())
        .with_exempt_burst(5)
        .with_recovery(true);

    let report = suite.run().await;

    assert!(report.passed(), "report:\n{report}");
    assert!(report.phase("recovery").unwrap().passed);
    // The 60s window plus the 5s grace shows up as a single wait.
    assert!(sleeper.requested().contains(&Duration::from_secs(65)));
}

#[tokio::test]
async fn custom_policy_sizes_the_saturation_burst() {
    let policy =
        TierPolicy::new(10, Duration::from_secs(30), 50, Duration::from_secs(300)).unwrap();
    // 15-probe burst (10 + 5 margin): 10 ok then 5 throttled
    let mut script = vec![common::success(); 10];
    script.extend(vec![common::throttled(); 5]);
    script.extend(vec![common::success(); 9]); // 3 exempt endpoints x 3
    script.push(common::success()); // backoff
    let probe = Arc::new(ScriptedProbe::new(script));
    let suite = ComplianceSuite::new(probe.clone())
        .with_sleeper(RecordingSleeper::new())
        .with_policy(policy)
        .with_exempt_burst(3);

    let report = suite.run().await;

    assert!(report.passed(), "report:\n{report}");
    assert_eq!(probe.call_count(), 25);
}

#[tokio::test]
async fn server_errors_during_exemption_fail_the_run() {
    let mut script = common::saturating_burst();
    script.extend(vec![common::success(); 4]);
    script.push(common::server_error()); // /health burst ends on a 500
    script.extend(vec![common::success(); 10]); // /logs, /blocklist
    script.push(common::success()); // backoff
    let probe = Arc::new(ScriptedProbe::new(script));
    let suite = ComplianceSuite::new(probe)
        .with_sleeper(RecordingSleeper::new())
        .with_exempt_burst(5);

    let report = suite.run().await;

    assert!(!report.passed());
    let phase = report.phase("exemption").unwrap();
    assert!(!phase.passed);
    assert!(phase.detail.contains("/health"));
    assert_eq!(report.totals.failed, 1);
}
