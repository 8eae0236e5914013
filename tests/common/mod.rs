//! Test utilities for the integration suite.

use std::time::Duration;

use pulsework::config::{ConsumerConfig, ReporterConfig};

/// Reporter configuration pointing at the test project.
#[allow(dead_code)]
pub fn reporter_config(interval_secs: u64) -> ReporterConfig {
    ReporterConfig {
        project_id: "test-project".into(),
        interval_secs,
        ..Default::default()
    }
}

/// Consumer configuration pointing at the test subscription.
#[allow(dead_code)]
pub fn consumer_config(max_messages: usize) -> ConsumerConfig {
    ConsumerConfig {
        subscription: "test-subscription".into(),
        max_messages,
        ..Default::default()
    }
}

/// Wait for a condition to become true with timeout.
///
/// Returns `true` if the condition was met, `false` if the timeout
/// expired.
#[allow(dead_code)]
pub async fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
