//! Sweep Driver
//!
//! The outer iteration over block-size configurations. Each sweep step
//! validates every FIFO channel at that block size, runs the coordinator,
//! logs per-channel summaries and writes one artifact per channel. Register
//! pairs are validated once, before the first step.
//!
//! Validation runs strictly before any latency measurement, and a failure on
//! any channel aborts the whole run. Every error is terminal to the
//! remaining sweep and propagates to the caller unmodified.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::coordinator::{self, RunSettings};
use crate::error::BenchResult;
use crate::hardware::registry::ChannelSet;
use crate::{sink, stats, validate};

/// Run the full sweep described by `config` over `set`.
pub fn run_sweep(set: &ChannelSet, config: &BenchConfig) -> BenchResult<()> {
    config.validate()?;

    sink::prepare_output_dir(&config.output_dir)?;
    sink::write_metadata(&config.output_dir, config)?;

    // Always log the seed so any run can be reproduced.
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, channels = set.channels.len(), "starting benchmark run");

    let mut rng = StdRng::seed_from_u64(seed);

    for loopback in &set.registers {
        validate::validate_register_loopback(loopback)?;
        info!(register = loopback.name(), "register loopback validated");
    }

    for &block_size in &config.block_sizes {
        info!(
            block_size,
            parallelism = config.parallelism,
            samples = config.samples_per_channel,
            "starting sweep step"
        );

        let validation = config.validation_settings(block_size);
        for channel in &set.channels {
            validate::validate_channel(channel, &validation, &mut rng)?;
            debug!(channel = channel.name(), "FIFO loopback validated");
        }

        let settings = RunSettings {
            sample: config.sample_settings(block_size),
            parallelism: config.parallelism,
            seed,
        };
        let result = coordinator::run(&set.channels, &settings)?;

        for (channel, series) in &result {
            if let Some(summary) = stats::summarize(series) {
                info!(
                    channel = channel.as_str(),
                    samples = summary.count,
                    min_ns = summary.min_ns,
                    mean_ns = summary.mean_ns,
                    std_ns = summary.std_ns,
                    max_ns = summary.max_ns,
                    "channel summary"
                );
            }
        }

        sink::write_run(&config.output_dir, &result, block_size, config.parallelism)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::hardware::mock::{MockFault, MockFifoPair, MockRegisterPair};
    use crate::hardware::registry::{
        Channel, FifoHandle, RegisterHandle, RegisterLoopback,
    };
    use std::time::Duration;

    fn quick_config(output_dir: std::path::PathBuf) -> BenchConfig {
        BenchConfig {
            output_dir,
            samples_per_channel: 4,
            parallelism: 2,
            block_sizes: vec![4, 8],
            transfer_timeout: Duration::from_millis(20),
            inter_sample_delay: Duration::from_micros(10),
            fifo_depth: 64,
            validation_runs: 2,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn clean_set() -> ChannelSet {
        ChannelSet {
            registers: vec![RegisterLoopback::new(RegisterHandle::I32(Box::new(
                MockRegisterPair::<i32>::new("I32"),
            )))],
            channels: vec![
                Channel::new(FifoHandle::I32(Box::new(MockFifoPair::<i32>::new("a")))),
                Channel::new(FifoHandle::U64(Box::new(MockFifoPair::<u64>::new("b")))),
            ],
        }
    }

    #[test]
    fn sweep_writes_one_artifact_per_channel_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let config = quick_config(dir.path().to_path_buf());

        run_sweep(&clean_set(), &config).unwrap();

        for block_size in [4usize, 8] {
            for channel in ["a", "b"] {
                let path = sink::artifact_path(dir.path(), channel, block_size, 2);
                assert!(path.exists(), "missing {}", path.display());
            }
        }
        assert!(dir.path().join(sink::METADATA_FILE).exists());
    }

    #[test]
    fn register_failure_aborts_before_any_channel_is_driven() {
        let dir = tempfile::tempdir().unwrap();
        let config = quick_config(dir.path().to_path_buf());

        let broken_register = RegisterLoopback::new(RegisterHandle::I32(Box::new(
            MockRegisterPair::<i32>::new("I32").with_corrupt_readback(),
        )));
        let fifo = MockFifoPair::<i32>::new("a");
        let round_trips = fifo.round_trip_counter();
        let set = ChannelSet {
            registers: vec![broken_register],
            channels: vec![Channel::new(FifoHandle::I32(Box::new(fifo)))],
        };

        assert!(matches!(
            run_sweep(&set, &config),
            Err(BenchError::Integrity { .. })
        ));
        assert_eq!(round_trips.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!sink::artifact_path(dir.path(), "a", 4, 2).exists());
    }

    #[test]
    fn validation_failure_on_one_channel_aborts_the_whole_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = quick_config(dir.path().to_path_buf());

        let set = ChannelSet {
            registers: vec![],
            channels: vec![
                Channel::new(FifoHandle::I32(Box::new(MockFifoPair::<i32>::new("good")))),
                Channel::new(FifoHandle::I32(Box::new(
                    MockFifoPair::<i32>::new("bad").with_fault(MockFault::CorruptElement(0)),
                ))),
            ],
        };

        match run_sweep(&set, &config) {
            Err(BenchError::Integrity { channel, .. }) => assert_eq!(channel, "bad"),
            other => panic!("expected integrity failure, got {:?}", other),
        }
        // no artifacts at all, including for the good channel
        assert!(!sink::artifact_path(dir.path(), "good", 4, 2).exists());
    }

    #[test]
    fn invalid_configuration_fails_before_touching_the_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("never-created");
        let config = BenchConfig {
            samples_per_channel: 1,
            ..quick_config(output.clone())
        };

        assert!(matches!(
            run_sweep(&clean_set(), &config),
            Err(BenchError::Configuration(_))
        ));
        assert!(!output.exists());
    }
}
