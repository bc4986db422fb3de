//! Mock Hardware Implementations
//!
//! Provides simulated loopback hardware for running and testing the benchmark
//! without a physical FPGA target. All mock operations are blocking, matching
//! the real driver's behavior on the calling thread.
//!
//! # Available Mocks
//!
//! - `MockFifoPair<T>` - FIFO loopback over an in-memory queue, with
//!   configurable round-trip delay and fault injection
//! - `MockRegisterPair<T>` - register loopback with optional readback
//!   corruption
//!
//! Fault injection covers the three failure modes the core has to handle:
//! corrupted data (integrity), a stalled read side (transfer timeout), and a
//! clean pass. `ActiveGauge` lets tests observe how many round trips are in
//! flight at once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{BenchError, BenchResult};
use crate::hardware::capabilities::{Element, FifoPair, RegisterPair};

// =============================================================================
// Instrumentation
// =============================================================================

/// Tracks how many round trips are in flight across a set of mock pairs.
///
/// `enter` is called when a block write starts, `exit` when the matching read
/// returns; the high-water mark therefore records the peak number of channels
/// that were mid-round-trip at the same instant.
#[derive(Debug, Default)]
pub struct ActiveGauge {
    active: AtomicUsize,
    high_water: AtomicUsize,
}

impl ActiveGauge {
    /// Record one round trip entering flight.
    pub fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
    }

    /// Record one round trip leaving flight.
    pub fn exit(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    /// Peak number of simultaneously in-flight round trips observed so far.
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

// =============================================================================
// MockFifoPair - Simulated FIFO Loopback
// =============================================================================

/// Fault a mock FIFO pair injects on the read side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockFault {
    /// Clean loopback.
    #[default]
    None,
    /// Bit-flip the element at this index in every block read back.
    CorruptElement(usize),
    /// Never produce data: reads sleep the full timeout, then fail.
    StallRead,
    /// Behave cleanly for this many round trips, then stall like
    /// `StallRead`. Lets a pair pass validation and fail during sampling.
    StallAfter(usize),
}

/// FIFO loopback pair over an in-memory queue.
///
/// Written blocks become readable in order on the read side. The optional
/// round-trip delay is charged on the read, simulating target echo time.
///
/// # Example
///
/// ```rust,ignore
/// let pair = MockFifoPair::<i32>::new("FIFO_I32").with_delay(Duration::from_millis(1));
/// pair.write_block(&[1, 2, 3], timeout)?;
/// let mut out = [0i32; 3];
/// pair.read_block(&mut out, timeout)?;
/// assert_eq!(out, [1, 2, 3]);
/// ```
pub struct MockFifoPair<T> {
    name: String,
    queue: Mutex<VecDeque<T>>,
    configured_depth: AtomicUsize,
    round_trip_delay: Duration,
    fault: MockFault,
    gauge: Option<Arc<ActiveGauge>>,
    round_trips: Arc<AtomicUsize>,
}

impl<T: Element> MockFifoPair<T> {
    /// Create a clean loopback pair with no artificial delay.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            queue: Mutex::new(VecDeque::new()),
            configured_depth: AtomicUsize::new(0),
            round_trip_delay: Duration::ZERO,
            fault: MockFault::None,
            gauge: None,
            round_trips: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Charge this much time on every block read.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.round_trip_delay = delay;
        self
    }

    /// Inject the given fault on the read side.
    pub fn with_fault(mut self, fault: MockFault) -> Self {
        self.fault = fault;
        self
    }

    /// Report in-flight round trips to the given gauge.
    pub fn with_gauge(mut self, gauge: Arc<ActiveGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    /// Shared counter of round trips attempted on this pair.
    ///
    /// Clone before boxing the pair; it keeps counting after ownership moves
    /// into a channel set.
    pub fn round_trip_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.round_trips)
    }

    /// Depth last passed to `configure_depth`, in elements.
    pub fn configured_depth(&self) -> usize {
        self.configured_depth.load(Ordering::SeqCst)
    }

    fn timeout_error(&self, timeout: Duration) -> BenchError {
        BenchError::TransferTimeout {
            channel: self.name.clone(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    fn stalled(&self) -> bool {
        match self.fault {
            MockFault::StallRead => true,
            MockFault::StallAfter(clean) => self.round_trips.load(Ordering::SeqCst) >= clean,
            _ => false,
        }
    }

    fn read_inner(&self, out: &mut [T], timeout: Duration) -> BenchResult<()> {
        if self.stalled() {
            thread::sleep(timeout);
            return Err(self.timeout_error(timeout));
        }
        if !self.round_trip_delay.is_zero() {
            thread::sleep(self.round_trip_delay);
        }

        let mut queue = self.queue.lock();
        if queue.len() < out.len() {
            drop(queue);
            thread::sleep(timeout);
            return Err(self.timeout_error(timeout));
        }
        for slot in out.iter_mut() {
            if let Some(value) = queue.pop_front() {
                *slot = value;
            }
        }
        drop(queue);

        if let MockFault::CorruptElement(index) = self.fault {
            if index < out.len() {
                out[index] = out[index].toggled();
            }
        }
        Ok(())
    }
}

impl<T: Element> FifoPair<T> for MockFifoPair<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure_depth(&self, depth: usize) -> BenchResult<()> {
        self.configured_depth.store(depth, Ordering::SeqCst);
        Ok(())
    }

    fn write_block(&self, block: &[T], _timeout: Duration) -> BenchResult<()> {
        if let Some(gauge) = &self.gauge {
            gauge.enter();
        }
        self.queue.lock().extend(block.iter().copied());
        Ok(())
    }

    fn read_block(&self, out: &mut [T], timeout: Duration) -> BenchResult<()> {
        let result = self.read_inner(out, timeout);
        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        result
    }
}

// =============================================================================
// MockRegisterPair - Simulated Register Loopback
// =============================================================================

/// Register loopback pair backed by a single cell.
///
/// Reads return the last written value, optionally bit-flipped to exercise
/// the mismatch path of the register validator.
pub struct MockRegisterPair<T> {
    name: String,
    value: Mutex<T>,
    corrupt_readback: bool,
}

impl<T: Element> MockRegisterPair<T> {
    /// Create a clean register loopback holding `T::default()`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Mutex::new(T::default()),
            corrupt_readback: false,
        }
    }

    /// Bit-flip every readback.
    pub fn with_corrupt_readback(mut self) -> Self {
        self.corrupt_readback = true;
        self
    }
}

impl<T: Element> RegisterPair<T> for MockRegisterPair<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_input(&self, value: T) -> BenchResult<()> {
        *self.value.lock() = value;
        Ok(())
    }

    fn read_output(&self) -> BenchResult<T> {
        let value = *self.value.lock();
        if self.corrupt_readback {
            Ok(value.toggled())
        } else {
            Ok(value)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(20);

    #[test]
    fn fifo_loopback_round_trips_blocks_in_order() {
        let pair = MockFifoPair::<i32>::new("FIFO_I32");
        pair.write_block(&[1, 2, 3, 4], TIMEOUT).unwrap();

        let mut out = [0i32; 4];
        pair.read_block(&mut out, TIMEOUT).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn fifo_read_of_empty_queue_times_out() {
        let pair = MockFifoPair::<u64>::new("FIFO_U64");
        let mut out = [0u64; 2];
        match pair.read_block(&mut out, TIMEOUT) {
            Err(BenchError::TransferTimeout { channel, timeout_ms }) => {
                assert_eq!(channel, "FIFO_U64");
                assert_eq!(timeout_ms, 20);
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn stalled_read_side_times_out_even_with_data_queued() {
        let pair = MockFifoPair::<i32>::new("FIFO_I32").with_fault(MockFault::StallRead);
        pair.write_block(&[5; 8], TIMEOUT).unwrap();

        let mut out = [0i32; 8];
        let started = std::time::Instant::now();
        assert!(matches!(
            pair.read_block(&mut out, TIMEOUT),
            Err(BenchError::TransferTimeout { .. })
        ));
        assert!(started.elapsed() >= TIMEOUT);
    }

    #[test]
    fn stall_after_allows_the_clean_round_trips_first() {
        let pair = MockFifoPair::<i32>::new("FIFO_I32").with_fault(MockFault::StallAfter(2));
        let mut out = [0i32; 2];

        for _ in 0..2 {
            pair.write_block(&[1, 2], TIMEOUT).unwrap();
            pair.read_block(&mut out, TIMEOUT).unwrap();
        }

        pair.write_block(&[1, 2], TIMEOUT).unwrap();
        assert!(matches!(
            pair.read_block(&mut out, TIMEOUT),
            Err(BenchError::TransferTimeout { .. })
        ));
    }

    #[test]
    fn corruption_flips_exactly_the_requested_element() {
        let pair = MockFifoPair::<i32>::new("FIFO_I32").with_fault(MockFault::CorruptElement(2));
        let block = [10, 20, 30, 40];
        pair.write_block(&block, TIMEOUT).unwrap();

        let mut out = [0i32; 4];
        pair.read_block(&mut out, TIMEOUT).unwrap();
        assert_eq!(out[0], 10);
        assert_eq!(out[1], 20);
        assert_eq!(out[2], !30);
        assert_eq!(out[3], 40);
    }

    #[test]
    fn gauge_sees_a_single_threaded_round_trip() {
        let gauge = Arc::new(ActiveGauge::default());
        let pair = MockFifoPair::<u8>::new("FIFO_U8").with_gauge(Arc::clone(&gauge));

        pair.write_block(&[1, 2], TIMEOUT).unwrap();
        let mut out = [0u8; 2];
        pair.read_block(&mut out, TIMEOUT).unwrap();

        assert_eq!(gauge.high_water(), 1);
    }

    #[test]
    fn round_trip_counter_outlives_the_pair() {
        let pair = MockFifoPair::<u8>::new("FIFO_U8");
        let counter = pair.round_trip_counter();
        let boxed: Box<dyn FifoPair<u8>> = Box::new(pair);

        boxed.write_block(&[7], TIMEOUT).unwrap();
        let mut out = [0u8; 1];
        boxed.read_block(&mut out, TIMEOUT).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn register_loopback_returns_the_last_write() {
        let pair = MockRegisterPair::<i32>::new("I32");
        pair.write_input(42).unwrap();
        assert_eq!(pair.read_output().unwrap(), 42);
        pair.write_input(-7).unwrap();
        assert_eq!(pair.read_output().unwrap(), -7);
    }

    #[test]
    fn corrupt_register_readback_never_matches() {
        let pair = MockRegisterPair::<u8>::new("u8").with_corrupt_readback();
        pair.write_input(9).unwrap();
        assert_eq!(pair.read_output().unwrap(), !9u8);
    }
}
