//! Gauge metric model and the periodic reporting loop.

pub mod descriptor;
pub mod reporter;
pub mod sample;

pub use descriptor::{LabelDescriptor, MetricDescriptor, MetricKind, ValueType};
pub use reporter::{GaugeSource, Reporter};
pub use sample::{ResourceLabels, Sample, Timestamp};
