//! Latency Sampler
//!
//! Performs N timed round trips on one FIFO loopback pair and returns the
//! N-1 latencies after the warm-up sample. One round trip is a blocking
//! write of a fixed-size block to the host→target direction followed by a
//! blocking read of the same element count from the target→host direction,
//! bracketed by monotonic timestamps.
//!
//! The first round trip pays one-off setup costs (driver buffer pinning,
//! page faults on the block) and is always discarded. A fixed inter-sample
//! delay after every round trip keeps device-side queues drained so one
//! sample cannot bias the next.

use rand::rngs::StdRng;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{BenchError, BenchResult};
use crate::hardware::capabilities::{Element, FifoPair};
use crate::hardware::registry::{Channel, FifoHandle};

/// Default pause between round trips.
pub const INTER_SAMPLE_DELAY: Duration = Duration::from_micros(100);

/// Parameters of one sampling pass over a channel.
#[derive(Debug, Clone, Copy)]
pub struct SampleSettings {
    /// Round trips per channel, including the warm-up. Must be at least 2.
    pub samples: usize,
    /// Block size in elements per transfer. Must be at least 1.
    pub block_size: usize,
    /// Per-operation transfer timeout.
    pub timeout: Duration,
    /// Pause after every round trip.
    pub inter_sample_delay: Duration,
}

impl SampleSettings {
    pub(crate) fn check(&self) -> BenchResult<()> {
        if self.block_size == 0 {
            return Err(BenchError::Configuration(
                "block size must be at least 1 element".to_string(),
            ));
        }
        if self.samples < 2 {
            return Err(BenchError::Configuration(format!(
                "need at least 2 samples per channel to drop the warm-up, got {}",
                self.samples
            )));
        }
        Ok(())
    }
}

/// Run `settings.samples` timed round trips on `pair` and return the
/// latencies in nanoseconds, warm-up excluded.
///
/// Block content comes from the caller's seeded generator; it is irrelevant
/// to timing (correctness is validated separately) but kept reproducible.
/// A timeout on any iteration aborts the pass with no partial result.
pub fn measure_latency<T: Element>(
    pair: &dyn FifoPair<T>,
    settings: &SampleSettings,
    rng: &mut StdRng,
) -> BenchResult<Vec<u64>> {
    settings.check()?;

    let block: Vec<T> = (0..settings.block_size).map(|_| T::random(rng)).collect();
    let mut readback = vec![T::default(); settings.block_size];
    let mut series = Vec::with_capacity(settings.samples - 1);

    for i in 0..settings.samples {
        let start = Instant::now();
        pair.write_block(&block, settings.timeout)?;
        pair.read_block(&mut readback, settings.timeout)?;
        let elapsed = start.elapsed();

        if i > 0 {
            series.push(elapsed.as_nanos() as u64);
        }
        thread::sleep(settings.inter_sample_delay);
    }

    Ok(series)
}

/// Sample one channel, whatever its element type.
pub fn measure_channel(
    channel: &Channel,
    settings: &SampleSettings,
    rng: &mut StdRng,
) -> BenchResult<Vec<u64>> {
    match channel.handle() {
        FifoHandle::U8(pair) => measure_latency(pair.as_ref(), settings, rng),
        FifoHandle::I32(pair) => measure_latency(pair.as_ref(), settings, rng),
        FifoHandle::U64(pair) => measure_latency(pair.as_ref(), settings, rng),
    }
}
