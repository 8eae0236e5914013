//! Pulse reporter: registers a gauge metric descriptor and emits one
//! synthetic sample per interval.
//!
//! # Usage
//!
//! ```bash
//! pulse-reporter --interval-secs 60 --project-id demo-project
//! ```
//!
//! Environment variables can also be used:
//! - `PULSE_PROJECT_ID`: Project the metric belongs to
//! - `PULSE_INTERVAL_SECS`: Seconds between samples
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::sync::Arc;

use pulsework::backend::memory::InMemoryMonitoring;
use pulsework::config::ReporterConfig;
use pulsework::metric::{LabelDescriptor, MetricDescriptor, Reporter};
use pulsework::observability::metrics::init_metrics_with_endpoint;
use pulsework::observability::tracing::init_tracing;
use tokio::sync::watch;

/// The metric this demo declares and feeds.
const METRIC_TYPE: &str = "custom.test/my_metric";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = ReporterConfig::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Initialize self-metrics (with optional OTLP export)
    init_metrics_with_endpoint(config.otel_endpoint.as_deref());

    // Fail fast on configuration the loop cannot run with
    config.validate()?;

    let descriptor = MetricDescriptor::gauge(METRIC_TYPE, "A simple example of a custom metric")
        .with_label(LabelDescriptor::string("TestLabel", "This is a test label"));

    // The vendor service is out of scope; the demo records into the
    // in-memory backend so it runs self-contained.
    let backend = Arc::new(InMemoryMonitoring::new());

    let reporter = Reporter::new(Arc::clone(&backend), descriptor, || 3.14, config)
        .with_metric_label("TestLabel", "My Label Data");

    // Create shutdown signal channel and spawn the signal handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    pulsework::spawn_signal_handler(shutdown_tx);

    reporter.run(shutdown_rx).await?;

    tracing::info!(
        points = backend.point_count(),
        "pulse-reporter shutdown complete"
    );
    Ok(())
}
