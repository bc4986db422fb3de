//! CLI Entry Point for rio_latency
//!
//! Loads the layered configuration, applies command-line overrides, opens
//! the channel set (a physical RIO target with `--features fpga_hardware`,
//! or in-process mock loopback hardware with `--mock`), and runs the sweep.
//!
//! # Usage
//!
//! Benchmark a target:
//! ```bash
//! rio_latency -d results -r RIO0 -p 4 -n 1000
//! ```
//!
//! Dry-run against mock hardware:
//! ```bash
//! rio_latency --mock -d /tmp/results --block-sizes 16,256
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use rio_latency::config::BenchConfig;
use rio_latency::error::BenchResult;
use rio_latency::hardware::registry::{self, ChannelSet};
use rio_latency::{logging, sweep};

#[derive(Parser)]
#[command(name = "rio_latency")]
#[command(about = "Round-trip latency benchmark for NI FPGA DMA FIFO channels", long_about = None)]
struct Cli {
    /// Output directory for latency artifacts
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// RIO resource to open (e.g. RIO0)
    #[arg(short = 'r', long)]
    resource: Option<String>,

    /// Maximum number of concurrently sampled channels
    #[arg(short = 'p', long = "parallel")]
    parallel: Option<usize>,

    /// Round trips per channel, including the discarded warm-up
    #[arg(short = 'n', long)]
    numruns: Option<usize>,

    /// Block sizes to sweep, in elements, comma separated
    #[arg(long, value_delimiter = ',')]
    block_sizes: Option<Vec<usize>>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for block content generation (generated and logged when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Run against in-process mock loopback hardware
    #[arg(long)]
    mock: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let mut config = BenchConfig::load(cli.config.as_deref())?;
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(resource) = cli.resource {
        config.resource = resource;
    }
    if let Some(parallel) = cli.parallel {
        config.parallelism = parallel;
    }
    if let Some(numruns) = cli.numruns {
        config.samples_per_channel = numruns;
    }
    if let Some(block_sizes) = cli.block_sizes {
        config.block_sizes = block_sizes;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    config.validate()?;

    let set = if cli.mock {
        info!("using in-process mock loopback hardware");
        registry::mock_channel_set()
    } else {
        open_target(&config)?
    };

    if let Err(err) = sweep::run_sweep(&set, &config) {
        error!(kind = err.kind(), error = %err, "benchmark run failed");
        return Err(err.into());
    }

    info!(output_dir = %config.output_dir.display(), "benchmark run complete");
    Ok(())
}

#[cfg(feature = "fpga_hardware")]
fn open_target(config: &BenchConfig) -> BenchResult<ChannelSet> {
    use rio_latency::hardware::nifpga::FpgaSession;
    use std::path::Path;

    info!(
        resource = config.resource.as_str(),
        bitfile = registry::BITFILE_FILE,
        "opening FPGA session"
    );
    let session = FpgaSession::open(
        Path::new(registry::BITFILE_FILE),
        registry::BITFILE_SIGNATURE,
        &config.resource,
    )?;
    Ok(registry::fpga_channel_set(&session))
}

#[cfg(not(feature = "fpga_hardware"))]
fn open_target(_config: &BenchConfig) -> BenchResult<ChannelSet> {
    Err(rio_latency::error::BenchError::FeatureNotEnabled(
        "fpga_hardware".to_string(),
    ))
}
