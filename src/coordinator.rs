//! Parallel Run Coordinator
//!
//! Dispatches the latency sampler across channels in bounded-size concurrent
//! batches and aggregates per-channel results. Channels are partitioned into
//! sequential batches of at most P in their fixed enumeration order; each
//! batch spawns one named OS thread per channel inside a `std::thread::scope`
//! and joins them all before the next batch starts, so at most P sampler
//! threads are ever alive and none can outlive the call.
//!
//! Batches are disjoint slices of the channel set, so a channel pair is
//! never driven by two concurrent tasks within one invocation. Every task
//! returns its own result value; the shared map is only touched after the
//! batch has fully joined, and result keys are exactly the input channel
//! names regardless of intra-batch completion order.
//!
//! Failure semantics: failures are observed after the batch joins (siblings
//! are never cancelled), the first failure in batch dispatch order wins when
//! several tasks fail at once, and no further batches are dispatched after a
//! failed one.

use std::collections::BTreeMap;
use std::thread;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::error::{BenchError, BenchResult};
use crate::hardware::registry::Channel;
use crate::sampler::{self, SampleSettings};

/// Ordered latency series of one channel, nanoseconds per round trip.
pub type ChannelSeries = Vec<u64>;

/// Per-channel latency series of one coordinator invocation, keyed by
/// channel name.
pub type RunResult = BTreeMap<String, ChannelSeries>;

/// Parameters of one coordinator invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    /// Sampler parameters, identical for every channel in the invocation.
    pub sample: SampleSettings,
    /// Maximum number of concurrently sampled channels. Must be at least 1.
    pub parallelism: usize,
    /// Run seed; each task derives its own generator from it.
    pub seed: u64,
}

/// Sample every channel and return the complete result mapping.
///
/// See the module docs for the scheduling and failure contract.
pub fn run(channels: &[Channel], settings: &RunSettings) -> BenchResult<RunResult> {
    if settings.parallelism == 0 {
        return Err(BenchError::Configuration(
            "parallelism must be at least 1".to_string(),
        ));
    }
    settings.sample.check()?;

    let mut results = RunResult::new();
    let indexed: Vec<(usize, &Channel)> = channels.iter().enumerate().collect();

    for (batch_index, batch) in indexed.chunks(settings.parallelism).enumerate() {
        debug!(batch = batch_index, channels = batch.len(), "dispatching batch");

        let outcomes = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(batch.len());
            for &(index, channel) in batch {
                // Distinct per-task seed; content does not affect timing, but
                // keeping it deterministic makes reruns comparable.
                let seed = settings.seed.wrapping_add(index as u64 + 1);
                let spawned = thread::Builder::new()
                    .name(format!("sample-{}", channel.name()))
                    .spawn_scoped(scope, move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        sampler::measure_channel(channel, &settings.sample, &mut rng)
                    });
                handles.push((index, spawned));
            }

            // Join-all: the batch is not evaluated until every task is done.
            handles
                .into_iter()
                .map(|(index, spawned)| match spawned {
                    Ok(handle) => match handle.join() {
                        Ok(outcome) => (index, outcome),
                        Err(payload) => std::panic::resume_unwind(payload),
                    },
                    Err(err) => (index, Err(BenchError::Io(err))),
                })
                .collect::<Vec<_>>()
        });

        // Merge after join; first failure in dispatch order decides the call.
        let mut first_failure: Option<BenchError> = None;
        for (index, outcome) in outcomes {
            let name = channels[index].name();
            match outcome {
                Ok(series) => {
                    debug!(channel = name, samples = series.len(), "channel sampled");
                    results.insert(name.to_string(), series);
                }
                Err(err) => {
                    warn!(channel = name, error = %err, "channel sampling failed");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_failure {
            return Err(err);
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{ActiveGauge, MockFault, MockFifoPair};
    use crate::hardware::registry::FifoHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn settings(parallelism: usize, samples: usize) -> RunSettings {
        RunSettings {
            sample: SampleSettings {
                samples,
                block_size: 4,
                timeout: Duration::from_millis(20),
                inter_sample_delay: Duration::from_micros(10),
            },
            parallelism,
            seed: 42,
        }
    }

    struct Probe {
        round_trips: Arc<AtomicUsize>,
    }

    fn channel(name: &str, delay: Duration, fault: MockFault) -> (Channel, Probe) {
        let pair = MockFifoPair::<i32>::new(name)
            .with_delay(delay)
            .with_fault(fault);
        let probe = Probe {
            round_trips: pair.round_trip_counter(),
        };
        (Channel::new(FifoHandle::I32(Box::new(pair))), probe)
    }

    fn gauged_channel(name: &str, gauge: &Arc<ActiveGauge>) -> Channel {
        let pair = MockFifoPair::<i32>::new(name)
            .with_delay(Duration::from_millis(5))
            .with_gauge(Arc::clone(gauge));
        Channel::new(FifoHandle::I32(Box::new(pair)))
    }

    #[test]
    fn result_keys_equal_the_input_channel_set() {
        // Completion order is scrambled by per-channel delays; the mapping
        // must not care.
        let delays = [30u64, 0, 15, 0];
        let (channels, _probes): (Vec<_>, Vec<_>) = delays
            .iter()
            .enumerate()
            .map(|(i, &ms)| {
                channel(
                    &format!("ch{i}"),
                    Duration::from_millis(ms),
                    MockFault::None,
                )
            })
            .unzip();

        let result = run(&channels, &settings(4, 3)).unwrap();
        let keys: Vec<_> = result.keys().cloned().collect();
        assert_eq!(keys, vec!["ch0", "ch1", "ch2", "ch3"]);
        for series in result.values() {
            assert_eq!(series.len(), 2);
        }
    }

    #[test]
    fn slow_channel_samples_stay_under_their_own_name() {
        let (slow, _p1) = channel("slow", Duration::from_millis(25), MockFault::None);
        let (fast, _p2) = channel("fast", Duration::ZERO, MockFault::None);

        let mut s = settings(2, 3);
        s.sample.timeout = Duration::from_millis(100);
        let result = run(&[slow, fast], &s).unwrap();

        for sample in &result["slow"] {
            assert!(*sample >= 25_000_000, "slow sample {sample}ns too fast");
        }
        for sample in &result["fast"] {
            assert!(*sample < 25_000_000, "fast sample {sample}ns too slow");
        }
    }

    #[test]
    fn active_channel_count_never_exceeds_the_bound() {
        for parallelism in [1usize, 2, 4] {
            let gauge = Arc::new(ActiveGauge::default());
            let channels: Vec<Channel> = (0..8)
                .map(|i| gauged_channel(&format!("ch{i}"), &gauge))
                .collect();

            run(&channels, &settings(parallelism, 3)).unwrap();
            assert!(
                gauge.high_water() <= parallelism,
                "high water {} exceeded bound {parallelism}",
                gauge.high_water()
            );
        }
    }

    #[test]
    fn sequential_run_is_strictly_single_flight() {
        let gauge = Arc::new(ActiveGauge::default());
        let channels: Vec<Channel> = (0..3)
            .map(|i| gauged_channel(&format!("ch{i}"), &gauge))
            .collect();

        run(&channels, &settings(1, 2)).unwrap();
        assert_eq!(gauge.high_water(), 1);
    }

    #[test]
    fn bound_larger_than_channel_count_runs_one_batch() {
        let (a, pa) = channel("a", Duration::ZERO, MockFault::None);
        let (b, pb) = channel("b", Duration::ZERO, MockFault::None);
        let result = run(&[a, b], &settings(8, 4)).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(pa.round_trips.load(Ordering::SeqCst), 4);
        assert_eq!(pb.round_trips.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn failure_stops_later_batches_from_dispatching() {
        let (a, _pa) = channel("a", Duration::ZERO, MockFault::None);
        let (b, _pb) = channel("b", Duration::ZERO, MockFault::StallRead);
        let (c, pc) = channel("c", Duration::ZERO, MockFault::None);
        let (d, pd) = channel("d", Duration::ZERO, MockFault::None);

        match run(&[a, b, c, d], &settings(2, 3)) {
            Err(BenchError::TransferTimeout { channel, .. }) => assert_eq!(channel, "b"),
            other => panic!("expected timeout from 'b', got {:?}", other),
        }
        // the second batch never ran
        assert_eq!(pc.round_trips.load(Ordering::SeqCst), 0);
        assert_eq!(pd.round_trips.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn first_failure_in_dispatch_order_wins() {
        let (a, _pa) = channel("a", Duration::ZERO, MockFault::StallRead);
        let (b, _pb) = channel("b", Duration::ZERO, MockFault::StallRead);

        match run(&[a, b], &settings(2, 3)) {
            Err(BenchError::TransferTimeout { channel, .. }) => assert_eq!(channel, "a"),
            other => panic!("expected timeout from 'a', got {:?}", other),
        }
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let (a, _p) = channel("a", Duration::ZERO, MockFault::None);
        assert!(matches!(
            run(&[a], &settings(0, 3)),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn empty_channel_set_yields_an_empty_result() {
        let result = run(&[], &settings(4, 3)).unwrap();
        assert!(result.is_empty());
    }
}
