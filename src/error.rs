//! Error taxonomy for the reporter and consumer loops.
//!
//! Failures are split by the policy they require:
//! - transient backend failures are retried with backoff
//! - permanent backend failures abort the owning loop
//! - processing failures are isolated to a single message

use std::time::Duration;

use thiserror::Error;

/// Error returned by a monitoring or queue backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Retryable failure: timeout, overload, transport interruption.
    #[error("transient backend error: {0}")]
    Transient(String),

    /// Non-retryable failure: bad request, unauthorized, quota exhausted.
    #[error("permanent backend error: {0}")]
    Permanent(String),
}

impl BackendError {
    /// Whether the caller should retry the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Error raised when declaring a metric descriptor.
///
/// Always fatal: the reporter cannot proceed without a valid schema.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid metric descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("backend rejected descriptor: {0}")]
    Backend(#[from] BackendError),
}

/// Error raised when submitting a single sample.
///
/// Non-fatal to the reporting loop: logged, then the next tick proceeds.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("sample submission failed: {0}")]
    Backend(#[from] BackendError),
}

/// Invalid configuration detected before any loop starts.
#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Failure confined to one message.
///
/// The message is left unacknowledged so the queue redelivers it.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("handler failed: {0}")]
    Handler(String),

    #[error("processing timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::Transient("overloaded".into()).is_transient());
        assert!(!BackendError::Permanent("unauthorized".into()).is_transient());
    }

    #[test]
    fn test_backend_error_converts_into_registration_error() {
        let err: RegistrationError = BackendError::Permanent("conflict".into()).into();
        assert!(matches!(err, RegistrationError::Backend(_)));
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = ProcessingError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("timed out"));
    }
}
