//! Custom error types for the benchmark.
//!
//! This module defines the primary error type, `BenchError`, for the entire
//! application. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures a benchmark run
//! can hit, from invalid run parameters to device transfer timeouts.
//!
//! ## Error Hierarchy
//!
//! - **`Integrity`**: a validation pass detected a data or register mismatch
//!   on a channel. Fatal to the whole run, reported with the offending
//!   channel and value.
//! - **`TransferTimeout`**: a blocking FIFO transfer did not complete within
//!   the fixed per-operation timeout. Fatal to the enclosing sampler or
//!   validator call.
//! - **`Configuration`**: semantically invalid run parameters (block size 0,
//!   fewer than two samples per channel, ...). Raised before any device
//!   interaction.
//! - **`Io`**: wraps `std::io::Error` for output artifact failures; fatal to
//!   the remaining sweep.
//! - **`Session`**: device session problems reported by the driver layer
//!   (open failures, unexpected status codes).
//! - **`FeatureNotEnabled`**: the binary was built without the hardware
//!   driver and was asked to talk to a physical target.
//!
//! There are no retries anywhere: every failure is terminal to its immediate
//! operation and propagates upward unmodified with the `?` operator.

use thiserror::Error;

/// Convenience alias for results using the benchmark error type.
pub type BenchResult<T> = std::result::Result<T, BenchError>;

/// All failure kinds a benchmark run can produce.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Integrity check failed on '{channel}': {detail}")]
    Integrity { channel: String, detail: String },

    #[error("Transfer on '{channel}' did not complete within {timeout_ms} ms")]
    TransferTimeout { channel: String, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device session error: {0}")]
    Session(String),

    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

impl BenchError {
    /// Short machine-friendly label for the failure kind, used in top-level
    /// run reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            BenchError::Integrity { .. } => "integrity",
            BenchError::TransferTimeout { .. } => "timeout",
            BenchError::Configuration(_) => "configuration",
            BenchError::Io(_) => "io",
            BenchError::Session(_) => "session",
            BenchError::FeatureNotEnabled(_) => "feature-not-enabled",
        }
    }
}
