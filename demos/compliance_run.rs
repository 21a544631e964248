//! Run the full compliance suite against a live StatusService instance.
//!
//! ```text
//! cargo run --example compliance_run -- http://localhost:5000
//! ```
//!
//! Pass `--recovery` to include the recovery phase; it waits out a full
//! soft window (over a minute of wall-clock time).

use std::sync::Arc;
use throttlecheck::{ComplianceSuite, ProbeClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let recovery = args.iter().any(|a| a == "--recovery");
    let base_url = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    let client = ProbeClient::new(&base_url)?;
    let report = ComplianceSuite::new(Arc::new(client))
        .with_recovery(recovery)
        .run()
        .await;

    println!("{report}");
    std::process::exit(if report.passed() { 0 } else { 1 });
}
