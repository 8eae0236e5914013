//! Metric descriptor model.
//!
//! A descriptor declares a named, typed measurement series to the
//! monitoring backend. It is created once at startup and owned by the
//! backend thereafter.

use crate::error::RegistrationError;

/// How successive samples of a metric relate to one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Value may rise or fall arbitrarily between samples.
    Gauge,
    /// Value accumulates monotonically over a time window.
    Cumulative,
}

/// Wire type of a metric value or label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Double,
    Int64,
    String,
}

/// Schema for one label attached to a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDescriptor {
    pub key: String,
    pub value_type: ValueType,
    pub description: String,
}

impl LabelDescriptor {
    /// Declare a string-valued label.
    pub fn string(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::String,
            description: description.into(),
        }
    }
}

/// Declaration of a named, typed measurement series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    /// Fully qualified type, e.g. `custom.test/my_metric`.
    pub metric_type: String,
    pub kind: MetricKind,
    pub value_type: ValueType,
    pub description: String,
    pub labels: Vec<LabelDescriptor>,
}

impl MetricDescriptor {
    /// Create a double-valued gauge descriptor with no labels.
    pub fn gauge(metric_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            metric_type: metric_type.into(),
            kind: MetricKind::Gauge,
            value_type: ValueType::Double,
            description: description.into(),
            labels: Vec::new(),
        }
    }

    /// Attach a label definition.
    pub fn with_label(mut self, label: LabelDescriptor) -> Self {
        self.labels.push(label);
        self
    }

    /// Check that the descriptor is well formed before sending it anywhere.
    ///
    /// The type string must be a `domain/path` pair of non-empty halves
    /// using alphanumerics plus `.`, `_`, `-`. Label keys must be
    /// non-empty and unique.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        let invalid = |msg: String| Err(RegistrationError::InvalidDescriptor(msg));

        let Some((domain, path)) = self.metric_type.split_once('/') else {
            return invalid(format!(
                "metric type '{}' must contain a '/' separator",
                self.metric_type
            ));
        };
        if domain.is_empty() || path.is_empty() {
            return invalid(format!(
                "metric type '{}' has an empty domain or path",
                self.metric_type
            ));
        }
        let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/');
        if !self.metric_type.chars().all(valid_char) {
            return invalid(format!(
                "metric type '{}' contains invalid characters",
                self.metric_type
            ));
        }

        for (i, label) in self.labels.iter().enumerate() {
            if label.key.is_empty() {
                return invalid("label key cannot be empty".into());
            }
            if self.labels[..i].iter().any(|other| other.key == label.key) {
                return invalid(format!("duplicate label key '{}'", label.key));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_gauge() -> MetricDescriptor {
        MetricDescriptor::gauge("custom.test/my_metric", "A test gauge")
            .with_label(LabelDescriptor::string("TestLabel", "This is a test label"))
    }

    #[test]
    fn test_valid_descriptor_passes() {
        assert!(valid_gauge().validate().is_ok());
    }

    #[test]
    fn test_missing_separator_rejected() {
        let descriptor = MetricDescriptor::gauge("my_metric", "no slash");
        assert!(matches!(
            descriptor.validate(),
            Err(RegistrationError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_empty_domain_or_path_rejected() {
        assert!(MetricDescriptor::gauge("/my_metric", "").validate().is_err());
        assert!(MetricDescriptor::gauge("custom.test/", "").validate().is_err());
    }

    #[test]
    fn test_invalid_characters_rejected() {
        for bad in ["custom test/metric", "custom:test/metric", "custom.test/metric!"] {
            let descriptor = MetricDescriptor::gauge(bad, "bad chars");
            assert!(descriptor.validate().is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn test_empty_label_key_rejected() {
        let descriptor =
            valid_gauge().with_label(LabelDescriptor::string("", "nameless"));
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_duplicate_label_key_rejected() {
        let descriptor =
            valid_gauge().with_label(LabelDescriptor::string("TestLabel", "again"));
        assert!(descriptor.validate().is_err());
    }
}
