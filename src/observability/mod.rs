//! Observability setup: structured logging and self-metrics.

pub mod metrics;
pub mod tracing;
