//! Periodic gauge reporting loop.
//!
//! Registers the metric descriptor once at startup (fatal on rejection),
//! then submits one sample per interval. A failed submission is logged
//! and the loop keeps its cadence; availability of the loop wins over
//! precision of any single sample.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::MonitoringBackend;
use crate::config::ReporterConfig;
use crate::error::{RegistrationError, SubmissionError};
use crate::metric::descriptor::MetricDescriptor;
use crate::metric::sample::{Sample, Timestamp};
use crate::observability::metrics as obs;

/// Produces the value for each reporting tick.
///
/// Implemented for any `Fn() -> f64`, so a closure works.
pub trait GaugeSource: Send + Sync {
    fn observe(&self) -> f64;
}

impl<F> GaugeSource for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn observe(&self) -> f64 {
        self()
    }
}

/// Registers a gauge descriptor once, then submits one sample per interval.
pub struct Reporter<B, S> {
    backend: Arc<B>,
    descriptor: MetricDescriptor,
    source: S,
    config: ReporterConfig,
    metric_labels: HashMap<String, String>,
}

impl<B, S> Reporter<B, S>
where
    B: MonitoringBackend,
    S: GaugeSource,
{
    pub fn new(
        backend: Arc<B>,
        descriptor: MetricDescriptor,
        source: S,
        config: ReporterConfig,
    ) -> Self {
        Self {
            backend,
            descriptor,
            source,
            config,
            metric_labels: HashMap::new(),
        }
    }

    /// Attach a metric-specific label value submitted with every sample.
    pub fn with_metric_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metric_labels.insert(key.into(), value.into());
        self
    }

    /// Declare the descriptor with the backend.
    ///
    /// Idempotent on the backend side. Fatal on failure: the loop never
    /// starts without a valid schema.
    pub async fn register_descriptor(&self) -> Result<String, RegistrationError> {
        self.descriptor.validate()?;
        let name = self
            .backend
            .create_descriptor(&self.config.project_id, &self.descriptor)
            .await?;
        info!(descriptor = %name, "metric descriptor registered");
        Ok(name)
    }

    /// Submit one sample stamped with the current wall clock.
    pub async fn report_sample(&self, value: f64) -> Result<(), SubmissionError> {
        let sample = Sample {
            value,
            end_time: Timestamp::now(),
            resource: self.config.resource_labels(),
            metric_labels: self.metric_labels.clone(),
        };
        self.backend
            .create_time_series(&self.config.project_id, &self.descriptor.metric_type, sample)
            .await?;
        obs::record_sample_submitted(&self.descriptor.metric_type);
        Ok(())
    }

    /// Run the reporting loop until shutdown is signaled.
    ///
    /// Registration failure aborts before the first tick. Submission
    /// failures are logged and the next tick proceeds on schedule.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), RegistrationError> {
        self.register_descriptor().await?;

        let interval = self.config.interval();
        info!(
            metric_type = %self.descriptor.metric_type,
            interval_secs = interval.as_secs(),
            "reporter started"
        );

        loop {
            if crate::sleep_or_shutdown(interval, &mut shutdown).await {
                break;
            }

            let value = self.source.observe();
            match self.report_sample(value).await {
                Ok(()) => debug!(value, "sample submitted"),
                Err(e) => {
                    obs::record_submission_failure(&self.descriptor.metric_type);
                    warn!(error = %e, "sample submission failed, continuing");
                }
            }
        }

        info!("reporter stopped");
        Ok(())
    }
}
