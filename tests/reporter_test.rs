//! Integration tests for the metric reporter.
//!
//! Covers descriptor registration, sample submission, and the cadence
//! and failure policy of the reporting loop.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use pulsework::backend::memory::InMemoryMonitoring;
use pulsework::backend::MonitoringBackend;
use pulsework::error::BackendError;
use pulsework::metric::{
    LabelDescriptor, MetricDescriptor, Reporter, Sample, Timestamp, ValueType,
};

/// The gauge every test registers.
fn test_descriptor() -> MetricDescriptor {
    MetricDescriptor::gauge("custom.test/my_metric", "A simple example of a custom metric")
        .with_label(LabelDescriptor::string("TestLabel", "This is a test label"))
}

fn test_reporter(
    backend: Arc<InMemoryMonitoring>,
    interval_secs: u64,
) -> Reporter<InMemoryMonitoring, impl Fn() -> f64 + Send + Sync> {
    Reporter::new(
        backend,
        test_descriptor(),
        || 3.14,
        common::reporter_config(interval_secs),
    )
    .with_metric_label("TestLabel", "My Label Data")
}

/// End-to-end: register, submit 3.14, and find exactly that point.
#[tokio::test]
async fn test_register_then_report_records_single_point() {
    let backend = Arc::new(InMemoryMonitoring::new());
    let reporter = test_reporter(Arc::clone(&backend), 60);

    let name = reporter.register_descriptor().await.expect("registration failed");
    assert_eq!(
        name,
        "projects/test-project/metricDescriptors/custom.test/my_metric"
    );

    let before = Timestamp::now();
    reporter.report_sample(3.14).await.expect("submission failed");

    let points = backend.points_for("custom.test/my_metric");
    assert_eq!(points.len(), 1, "exactly one point should be recorded");

    let point = &points[0];
    assert!((point.value - 3.14).abs() < f64::EPSILON);
    assert!(
        (point.end_time.as_secs_f64() - before.as_secs_f64()).abs() < 1.0,
        "timestamp should be within 1s of submission time"
    );
    assert_eq!(point.metric_labels["TestLabel"], "My Label Data");
    assert_eq!(point.resource.cluster, "demo-cluster");
}

/// Any finite value is accepted and recorded verbatim.
#[tokio::test]
async fn test_any_finite_value_accepted() {
    let backend = Arc::new(InMemoryMonitoring::new());
    let reporter = test_reporter(Arc::clone(&backend), 60);
    reporter.register_descriptor().await.unwrap();

    let values = [0.0, -273.15, 1e300, f64::MIN_POSITIVE];
    for value in values {
        reporter.report_sample(value).await.unwrap();
    }

    let points = backend.points_for("custom.test/my_metric");
    assert_eq!(points.len(), values.len());
    for (point, expected) in points.iter().zip(values) {
        assert_eq!(point.value, expected);
    }
}

/// Non-finite values are rejected and nothing is recorded.
#[tokio::test]
async fn test_non_finite_value_rejected() {
    let backend = Arc::new(InMemoryMonitoring::new());
    let reporter = test_reporter(Arc::clone(&backend), 60);
    reporter.register_descriptor().await.unwrap();

    assert!(reporter.report_sample(f64::NAN).await.is_err());
    assert!(reporter.report_sample(f64::INFINITY).await.is_err());
    assert_eq!(backend.point_count(), 0);
}

/// Submission without a registered descriptor fails.
#[tokio::test]
async fn test_report_without_registration_fails() {
    let backend = Arc::new(InMemoryMonitoring::new());
    let reporter = test_reporter(Arc::clone(&backend), 60);

    assert!(reporter.report_sample(3.14).await.is_err());
    assert_eq!(backend.point_count(), 0);
}

/// A malformed descriptor aborts the loop before the first tick.
#[tokio::test]
async fn test_registration_failure_is_fatal() {
    let backend = Arc::new(InMemoryMonitoring::new());
    let descriptor = MetricDescriptor::gauge("no-separator", "missing the slash");
    let reporter = Reporter::new(
        Arc::clone(&backend),
        descriptor,
        || 3.14,
        common::reporter_config(1),
    );

    let (_tx, rx) = watch::channel(false);
    assert!(reporter.run(rx).await.is_err());
    assert_eq!(backend.point_count(), 0);
}

/// Redefining an existing descriptor with a different value type is a
/// startup failure, not something the loop limps past.
#[tokio::test]
async fn test_conflicting_redefinition_is_fatal() {
    let backend = Arc::new(InMemoryMonitoring::new());
    backend
        .create_descriptor("test-project", &test_descriptor())
        .await
        .unwrap();

    let mut conflicting = test_descriptor();
    conflicting.value_type = ValueType::Int64;
    let reporter = Reporter::new(
        Arc::clone(&backend),
        conflicting,
        || 3.14,
        common::reporter_config(1),
    );

    assert!(reporter.register_descriptor().await.is_err());
}

/// A 5-second run at a 1-second interval yields 4 to 6 samples.
#[tokio::test(start_paused = true)]
async fn test_reporting_loop_cadence() {
    let backend = Arc::new(InMemoryMonitoring::new());
    let reporter = test_reporter(Arc::clone(&backend), 1);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { reporter.run(shutdown_rx).await });

    // Let registration and the first sleep get set up.
    tokio::task::yield_now().await;

    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
    }

    let count = backend.point_count();
    assert!(
        (4..=6).contains(&count),
        "expected 4..=6 samples over 5 seconds, got {count}"
    );

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

/// Monitoring backend that accepts the schema but fails every submission.
struct RejectingMonitoring;

#[async_trait]
impl MonitoringBackend for RejectingMonitoring {
    async fn create_descriptor(
        &self,
        project: &str,
        descriptor: &MetricDescriptor,
    ) -> Result<String, BackendError> {
        Ok(format!(
            "projects/{}/metricDescriptors/{}",
            project, descriptor.metric_type
        ))
    }

    async fn create_time_series(
        &self,
        _project: &str,
        _metric_type: &str,
        _sample: Sample,
    ) -> Result<(), BackendError> {
        Err(BackendError::Transient("backend unavailable".into()))
    }
}

/// Per-tick submission failures never kill the loop.
#[tokio::test(start_paused = true)]
async fn test_submission_failure_keeps_loop_alive() {
    let reporter = Reporter::new(
        Arc::new(RejectingMonitoring),
        test_descriptor(),
        || 3.14,
        common::reporter_config(1),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { reporter.run(shutdown_rx).await });

    tokio::task::yield_now().await;
    for _ in 0..3 {
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
    }

    assert!(!handle.is_finished(), "loop must survive failed ticks");

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}
