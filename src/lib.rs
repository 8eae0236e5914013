//! Pulsework: periodic metric reporting and pull/ack queue consumption.
//!
//! Two independent loop patterns behind pluggable backends:
//!
//! - **Reporter**: registers a gauge metric descriptor once, then submits
//!   one time-series sample per fixed interval.
//! - **Consumer**: pulls bounded batches of messages from a subscription,
//!   processes them with bounded concurrency under a per-message timeout,
//!   and acknowledges each message individually.
//!
//! The monitoring and queue services are external collaborators reached
//! through the [`backend`] traits; in-memory implementations back the demo
//! binaries and the test suite.
//!
//! # Modules
//!
//! - [`backend`]: backend trait seams and in-memory implementations
//! - [`config`]: CLI and environment configuration
//! - [`error`]: error taxonomy
//! - [`metric`]: descriptor/sample model and the reporting loop
//! - [`observability`]: tracing and self-metrics setup
//! - [`queue`]: message model, backoff, and the consumption loop

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // metric::reporter::Reporter is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod backend;
pub mod config;
pub mod error;
pub mod metric;
pub mod observability;
pub mod queue;

use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

/// Generate a new UUIDv7 (time-sortable) identifier.
///
/// Used for message and delivery IDs; time-sortable IDs give natural
/// ordering by creation time.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_millis() as i64
}

/// Spawn a task that flips the shutdown channel on SIGINT/SIGTERM.
///
/// Both daemons check the channel at each loop iteration boundary.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl+c");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        let _ = shutdown_tx.send(true);
    });
}

/// Sleep for `delay` unless shutdown is signaled first.
///
/// Returns true if the caller's loop should stop. A dropped sender is
/// treated as a shutdown request.
pub(crate) async fn sleep_or_shutdown(
    delay: Duration,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}
