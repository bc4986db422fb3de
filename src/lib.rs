//! # RIO Latency Core Library
//!
//! This crate benchmarks the round-trip latency of host↔target DMA FIFO
//! channels exposed by an NI FPGA (RIO) target. For a bitfile-defined set of
//! named loopback channels it validates correctness, samples wall-clock
//! round-trip times for fixed-size block transfers, optionally drives
//! several channels concurrently under a parallelism bound, and records each
//! channel's latency series for later analysis.
//!
//! ## Crate Structure
//!
//! - **`config`**: Layered run configuration (defaults, TOML file,
//!   environment) with semantic validation. See [`config::BenchConfig`].
//! - **`coordinator`**: Dispatches the sampler across channels in bounded
//!   concurrent batches and aggregates per-channel results.
//! - **`error`**: The [`error::BenchError`] taxonomy shared by the whole
//!   crate.
//! - **`hardware`**: Capability traits for loopback pairs, the bitfile
//!   channel registry, mock hardware, and the feature-gated NI FPGA driver.
//! - **`logging`**: `tracing` subscriber setup.
//! - **`sampler`**: Timed round trips on one channel, warm-up excluded.
//! - **`sink`**: Per-channel text artifacts and run metadata.
//! - **`stats`**: Latency series summaries for log output.
//! - **`sweep`**: The outer iteration over block sizes tying it all
//!   together.
//! - **`validate`**: Register-walk and FIFO loopback correctness checks run
//!   before any measurement.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod sampler;
pub mod sink;
pub mod stats;
pub mod sweep;
pub mod validate;

pub use config::BenchConfig;
pub use error::{BenchError, BenchResult};
