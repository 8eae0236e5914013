//! Configuration for the reporter and consumer daemons.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start
//!
//! The scripts this replaces hardcoded the project and subscription
//! names; everything is externalized here and validated before any loop
//! starts.

use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::metric::sample::ResourceLabels;

/// Periodic gauge reporter: registers a metric descriptor and submits one
/// sample per interval.
#[derive(Parser, Debug, Clone)]
#[command(name = "pulse-reporter")]
#[command(author, version, about, long_about = None)]
pub struct ReporterConfig {
    /// Project the metric belongs to
    #[arg(long, env = "PULSE_PROJECT_ID", default_value = "demo-project")]
    pub project_id: String,

    /// Seconds between samples
    #[arg(long, env = "PULSE_INTERVAL_SECS", default_value_t = 60)]
    pub interval_secs: u64,

    /// Cluster name reported as resource identity
    #[arg(long, env = "PULSE_CLUSTER", default_value = "demo-cluster")]
    pub cluster: String,

    /// Container name reported as resource identity
    #[arg(long, env = "PULSE_CONTAINER", default_value = "demo-container")]
    pub container: String,

    /// Pod name reported as resource identity
    #[arg(long, env = "PULSE_POD", default_value = "demo-pod")]
    pub pod: String,

    /// Namespace reported as resource identity
    #[arg(long, env = "PULSE_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Location reported as resource identity
    #[arg(long, env = "PULSE_LOCATION", default_value = "us-central1-f")]
    pub location: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// OpenTelemetry collector endpoint for self-metrics export (optional)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,
}

impl ReporterConfig {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject configurations no loop can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.is_empty() {
            return Err(ConfigError("project id cannot be empty".into()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError(
                "reporting interval must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    /// Reporting interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Resource identity attached to every submitted sample.
    pub fn resource_labels(&self) -> ResourceLabels {
        ResourceLabels {
            cluster: self.cluster.clone(),
            container: self.container.clone(),
            pod: self.pod.clone(),
            namespace: self.namespace.clone(),
            location: self.location.clone(),
        }
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            project_id: "demo-project".into(),
            interval_secs: 60,
            cluster: "demo-cluster".into(),
            container: "demo-container".into(),
            pod: "demo-pod".into(),
            namespace: "default".into(),
            location: "us-central1-f".into(),
            log_level: "info".into(),
            otel_endpoint: None,
        }
    }
}

/// Queue consumer: pulls bounded batches and acknowledges per message.
#[derive(Parser, Debug, Clone)]
#[command(name = "pulse-consumer")]
#[command(author, version, about, long_about = None)]
pub struct ConsumerConfig {
    /// Subscription to pull from
    #[arg(long, env = "PULSE_SUBSCRIPTION", default_value = "demo-subscription")]
    pub subscription: String,

    /// Maximum messages per pull
    #[arg(long, env = "PULSE_MAX_MESSAGES", default_value_t = 10)]
    pub max_messages: usize,

    /// Maximum messages processed concurrently within a batch
    #[arg(long, env = "PULSE_MAX_CONCURRENCY", default_value_t = 4)]
    pub max_concurrency: usize,

    /// Per-message processing timeout in seconds
    #[arg(long, env = "PULSE_PROCESSING_TIMEOUT_SECS", default_value_t = 30)]
    pub processing_timeout_secs: u64,

    /// Initial idle delay in milliseconds when the queue is empty
    #[arg(long, env = "PULSE_IDLE_BACKOFF_BASE_MS", default_value_t = 100)]
    pub idle_backoff_base_ms: u64,

    /// Ceiling for the idle delay in milliseconds
    #[arg(long, env = "PULSE_IDLE_BACKOFF_CAP_MS", default_value_t = 5_000)]
    pub idle_backoff_cap_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// OpenTelemetry collector endpoint for self-metrics export (optional)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,
}

impl ConsumerConfig {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject configurations no loop can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscription.is_empty() {
            return Err(ConfigError("subscription cannot be empty".into()));
        }
        if self.max_messages == 0 {
            return Err(ConfigError("max messages per pull must be at least 1".into()));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError("max concurrency must be at least 1".into()));
        }
        if self.processing_timeout_secs == 0 {
            return Err(ConfigError(
                "processing timeout must be at least 1 second".into(),
            ));
        }
        if self.idle_backoff_base_ms == 0 {
            return Err(ConfigError("idle backoff base must be non-zero".into()));
        }
        if self.idle_backoff_base_ms > self.idle_backoff_cap_ms {
            return Err(ConfigError(
                "idle backoff base cannot exceed its cap".into(),
            ));
        }
        Ok(())
    }

    /// Per-message processing timeout as a duration.
    pub fn processing_timeout(&self) -> Duration {
        Duration::from_secs(self.processing_timeout_secs)
    }

    /// Starting delay of the idle backoff curve.
    pub fn idle_backoff_base(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_base_ms)
    }

    /// Ceiling of the idle backoff curve.
    pub fn idle_backoff_cap(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_cap_ms)
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            subscription: "demo-subscription".into(),
            max_messages: 10,
            max_concurrency: 4,
            processing_timeout_secs: 30,
            idle_backoff_base_ms: 100,
            idle_backoff_cap_ms: 5_000,
            log_level: "info".into(),
            otel_endpoint: None,
        }
    }
}
