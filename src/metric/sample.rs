//! Time-series sample model.
//!
//! A sample is one (timestamp, value) observation tagged with the
//! resource identity and metric-specific label values. Samples are
//! constructed fresh on every reporting tick and never retained after
//! submission.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock instant as whole seconds plus a subsecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// Whole seconds since the Unix epoch.
    pub seconds: i64,
    /// Subsecond remainder, always in `[0, 1_000_000_000)`.
    pub nanos: u32,
}

impl Timestamp {
    /// Capture the current wall clock.
    ///
    /// Recomputed from `SystemTime` on every call. Long-running loops
    /// must not accumulate an interval onto a stored timestamp; the
    /// remainder drifts.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch");
        Self {
            seconds: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos(),
        }
    }

    /// Seconds since the epoch, fractional part included.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.nanos) / 1e9
    }
}

/// Resource identity attached to every sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLabels {
    pub cluster: String,
    pub container: String,
    pub pod: String,
    pub namespace: String,
    pub location: String,
}

impl ResourceLabels {
    /// Flatten into the label map the backend expects.
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("cluster_name".to_string(), self.cluster.clone()),
            ("container_name".to_string(), self.container.clone()),
            ("pod_name".to_string(), self.pod.clone()),
            ("namespace_name".to_string(), self.namespace.clone()),
            ("location".to_string(), self.location.clone()),
        ])
    }
}

/// One (timestamp, value) observation with its label sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub end_time: Timestamp,
    pub resource: ResourceLabels,
    pub metric_labels: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanos_always_below_one_second() {
        for _ in 0..1_000 {
            let ts = Timestamp::now();
            assert!(ts.nanos < 1_000_000_000);
        }
    }

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b.as_secs_f64() >= a.as_secs_f64() - 1.0);
    }

    #[test]
    fn test_as_secs_f64_combines_parts() {
        let ts = Timestamp {
            seconds: 10,
            nanos: 500_000_000,
        };
        assert!((ts.as_secs_f64() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_resource_labels_flatten() {
        let resource = ResourceLabels {
            cluster: "c".into(),
            container: "ct".into(),
            pod: "p".into(),
            namespace: "ns".into(),
            location: "loc".into(),
        };
        let map = resource.to_map();
        assert_eq!(map.len(), 5);
        assert_eq!(map["cluster_name"], "c");
        assert_eq!(map["namespace_name"], "ns");
    }
}
