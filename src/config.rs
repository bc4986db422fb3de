//! Benchmark Configuration
//!
//! Strongly-typed run configuration with layered loading:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`rio_latency.toml`, or an explicit path)
//! 3. Environment variables prefixed with `RIO_LATENCY_`
//! 4. CLI flag overrides, applied by the binary after loading
//!
//! # Example
//! ```no_run
//! use rio_latency::config::BenchConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BenchConfig::load(None)?;
//! config.validate()?;
//! println!("sweeping {} block sizes", config.block_sizes.len());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::sampler::{SampleSettings, INTER_SAMPLE_DELAY};
use crate::validate::ValidationSettings;

/// Configuration file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rio_latency.toml";

/// Everything one benchmark invocation needs to know.
///
/// Block size and sample count are constant across all channels within one
/// coordinator invocation; the sweep iterates `block_sizes`, producing one
/// complete result set per entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Directory receiving the per-channel artifacts and run metadata.
    pub output_dir: PathBuf,
    /// RIO resource to open, e.g. `RIO0`.
    pub resource: String,
    /// Round trips per channel including the warm-up. Must be at least 2.
    pub samples_per_channel: usize,
    /// Maximum number of concurrently sampled channels. Must be at least 1.
    pub parallelism: usize,
    /// Block sizes in elements, one sweep step each.
    pub block_sizes: Vec<usize>,
    /// Per-operation transfer timeout.
    #[serde(with = "humantime_serde")]
    pub transfer_timeout: Duration,
    /// Pause after every round trip.
    #[serde(with = "humantime_serde")]
    pub inter_sample_delay: Duration,
    /// Host-side FIFO queue depth in elements.
    pub fifo_depth: usize,
    /// Write/read iterations per channel during FIFO validation.
    pub validation_runs: usize,
    /// Seed for block content generation. Generated (and logged) when unset.
    pub seed: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            resource: "RIO0".to_string(),
            samples_per_channel: 100,
            parallelism: 1,
            block_sizes: vec![16, 64, 256, 1024, 4096, 16384],
            transfer_timeout: Duration::from_secs(1),
            inter_sample_delay: INTER_SAMPLE_DELAY,
            fifo_depth: 1024 * 1024,
            validation_runs: 100,
            seed: None,
        }
    }
}

impl BenchConfig {
    /// Load configuration from defaults, an optional TOML file, and
    /// `RIO_LATENCY_` environment variables.
    ///
    /// When no path is given, `rio_latency.toml` is read if it exists.
    pub fn load(path: Option<&Path>) -> BenchResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }
        figment
            .merge(Env::prefixed("RIO_LATENCY_"))
            .extract()
            .map_err(|err| BenchError::Configuration(err.to_string()))
    }

    /// Validate configuration after loading, before any device interaction.
    pub fn validate(&self) -> BenchResult<()> {
        if self.resource.is_empty() {
            return Err(BenchError::Configuration(
                "resource name cannot be empty".to_string(),
            ));
        }
        if self.samples_per_channel < 2 {
            return Err(BenchError::Configuration(format!(
                "samples_per_channel must be at least 2, got {}",
                self.samples_per_channel
            )));
        }
        if self.parallelism < 1 {
            return Err(BenchError::Configuration(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.block_sizes.is_empty() {
            return Err(BenchError::Configuration(
                "at least one block size is required".to_string(),
            ));
        }
        if let Some(&bad) = self.block_sizes.iter().find(|&&size| size == 0) {
            return Err(BenchError::Configuration(format!(
                "block sizes must be at least 1 element, got {bad}"
            )));
        }
        if let Some(&largest) = self.block_sizes.iter().max() {
            if self.fifo_depth < largest {
                return Err(BenchError::Configuration(format!(
                    "fifo_depth {} cannot hold the largest block of {largest} elements",
                    self.fifo_depth
                )));
            }
        }
        if self.validation_runs < 1 {
            return Err(BenchError::Configuration(
                "validation_runs must be at least 1".to_string(),
            ));
        }
        if self.transfer_timeout.is_zero() {
            return Err(BenchError::Configuration(
                "transfer_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Sampler parameters for one sweep step.
    pub fn sample_settings(&self, block_size: usize) -> SampleSettings {
        SampleSettings {
            samples: self.samples_per_channel,
            block_size,
            timeout: self.transfer_timeout,
            inter_sample_delay: self.inter_sample_delay,
        }
    }

    /// Validator parameters for one sweep step.
    pub fn validation_settings(&self, block_size: usize) -> ValidationSettings {
        ValidationSettings {
            runs: self.validation_runs,
            block_size,
            depth: self.fifo_depth,
            timeout: self.transfer_timeout,
        }
    }
}
