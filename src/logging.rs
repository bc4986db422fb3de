//! Logging Infrastructure
//!
//! Structured logging via `tracing` and `tracing-subscriber`. Sampler threads
//! are named after their channel, so thread names are enabled to make
//! concurrent batches readable in the output. `RUST_LOG` overrides the level
//! passed on the command line.

use tracing_subscriber::EnvFilter;

use crate::error::{BenchError, BenchResult};

/// Initialize the global subscriber. Call once, before any other output.
pub fn init(level: &str) -> BenchResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|err| BenchError::Configuration(format!("invalid log filter '{level}': {err}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| {
            BenchError::Configuration(format!("failed to initialize logging: {err}"))
        })?;
    Ok(())
}
