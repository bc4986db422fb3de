//! Correctness Validator
//!
//! Round-trips known data through every loopback unit before any latency is
//! measured. The register walk catches a dead or mis-addressed interface
//! cheaply; the FIFO loopback check catches data corruption on the DMA path
//! that a timing run would silently absorb.
//!
//! Validation is strictly ordered before measurement for a given channel
//! set, and any failure aborts the whole run, not just the offending
//! channel. There are no retries.

use rand::rngs::StdRng;
use std::time::Duration;

use crate::error::{BenchError, BenchResult};
use crate::hardware::capabilities::{Element, FifoPair, RegisterPair};
use crate::hardware::registry::{Channel, FifoHandle, RegisterHandle, RegisterLoopback};

/// Number of values walked through each register pair.
const REGISTER_WALK_LEN: u32 = 100;

/// Parameters of one FIFO validation pass.
#[derive(Debug, Clone, Copy)]
pub struct ValidationSettings {
    /// Number of write/read iterations per channel.
    pub runs: usize,
    /// Block size in elements written and read back per iteration.
    pub block_size: usize,
    /// Host-side queue depth configured on both directions, in elements.
    pub depth: usize,
    /// Per-operation transfer timeout.
    pub timeout: Duration,
}

/// Walk values 0..100 through a register loopback pair, reading the output
/// register back after every write and requiring exact equality.
pub fn validate_registers<T: Element>(pair: &dyn RegisterPair<T>) -> BenchResult<()> {
    for i in 0..REGISTER_WALK_LEN {
        let value = T::from_index(i);
        pair.write_input(value)?;
        let read = pair.read_output()?;
        if read != value {
            return Err(BenchError::Integrity {
                channel: pair.name().to_string(),
                detail: format!("register walk at {i}: wrote {value}, read {read}"),
            });
        }
    }
    Ok(())
}

/// Round-trip a block of arbitrary content through a FIFO loopback pair
/// `runs` times, requiring element-wise equality on every iteration.
///
/// The queue depth of both directions is configured first. Content comes
/// from the caller's seeded generator so failures are reproducible.
pub fn validate_fifo<T: Element>(
    pair: &dyn FifoPair<T>,
    settings: &ValidationSettings,
    rng: &mut StdRng,
) -> BenchResult<()> {
    if settings.block_size == 0 {
        return Err(BenchError::Configuration(
            "validation block size must be at least 1 element".to_string(),
        ));
    }
    if settings.runs == 0 {
        return Err(BenchError::Configuration(
            "validation needs at least 1 run".to_string(),
        ));
    }

    pair.configure_depth(settings.depth)?;

    let block: Vec<T> = (0..settings.block_size).map(|_| T::random(rng)).collect();
    let mut readback = vec![T::default(); settings.block_size];

    for run in 0..settings.runs {
        pair.write_block(&block, settings.timeout)?;
        pair.read_block(&mut readback, settings.timeout)?;

        if let Some(index) = block
            .iter()
            .zip(readback.iter())
            .position(|(wrote, read)| wrote != read)
        {
            return Err(BenchError::Integrity {
                channel: pair.name().to_string(),
                detail: format!(
                    "run {run}, element {index}: wrote {}, read {}",
                    block[index], readback[index]
                ),
            });
        }
    }
    Ok(())
}

/// Validate one register loopback unit, whatever its element type.
pub fn validate_register_loopback(loopback: &RegisterLoopback) -> BenchResult<()> {
    match loopback.handle() {
        RegisterHandle::U8(pair) => validate_registers(pair.as_ref()),
        RegisterHandle::I32(pair) => validate_registers(pair.as_ref()),
        RegisterHandle::U64(pair) => validate_registers(pair.as_ref()),
    }
}

/// Validate one FIFO channel, whatever its element type.
pub fn validate_channel(
    channel: &Channel,
    settings: &ValidationSettings,
    rng: &mut StdRng,
) -> BenchResult<()> {
    match channel.handle() {
        FifoHandle::U8(pair) => validate_fifo(pair.as_ref(), settings, rng),
        FifoHandle::I32(pair) => validate_fifo(pair.as_ref(), settings, rng),
        FifoHandle::U64(pair) => validate_fifo(pair.as_ref(), settings, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{MockFault, MockFifoPair, MockRegisterPair};
    use rand::SeedableRng;

    fn settings(block_size: usize) -> ValidationSettings {
        ValidationSettings {
            runs: 3,
            block_size,
            depth: 1024,
            timeout: Duration::from_millis(20),
        }
    }

    #[test]
    fn register_walk_passes_on_a_clean_loopback() {
        let pair = MockRegisterPair::<i32>::new("I32");
        validate_registers(&pair).unwrap();
    }

    #[test]
    fn register_walk_passes_for_narrow_elements() {
        // 0..100 fits u8 without wrapping, like the original walk
        let pair = MockRegisterPair::<u8>::new("u8");
        validate_registers(&pair).unwrap();
    }

    #[test]
    fn corrupt_register_readback_raises_integrity() {
        let pair = MockRegisterPair::<i32>::new("I32").with_corrupt_readback();
        match validate_registers(&pair) {
            Err(BenchError::Integrity { channel, detail }) => {
                assert_eq!(channel, "I32");
                assert!(detail.contains("register walk at 0"), "{detail}");
            }
            other => panic!("expected integrity failure, got {:?}", other),
        }
    }

    #[test]
    fn fifo_loopback_passes_for_a_range_of_block_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        for block_size in [1, 7, 64] {
            let pair = MockFifoPair::<u64>::new("FIFO_U64");
            validate_fifo(&pair, &settings(block_size), &mut rng).unwrap();
        }
    }

    #[test]
    fn fifo_validation_configures_the_queue_depth_first() {
        let mut rng = StdRng::seed_from_u64(2);
        let pair = MockFifoPair::<i32>::new("FIFO_I32");
        validate_fifo(&pair, &settings(16), &mut rng).unwrap();
        assert_eq!(pair.configured_depth(), 1024);
    }

    #[test]
    fn corrupted_element_raises_integrity_with_its_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let pair = MockFifoPair::<i32>::new("FIFO_I32").with_fault(MockFault::CorruptElement(5));
        match validate_fifo(&pair, &settings(16), &mut rng) {
            Err(BenchError::Integrity { channel, detail }) => {
                assert_eq!(channel, "FIFO_I32");
                assert!(detail.contains("element 5"), "{detail}");
            }
            other => panic!("expected integrity failure, got {:?}", other),
        }
    }

    #[test]
    fn stalled_read_side_raises_transfer_timeout() {
        let mut rng = StdRng::seed_from_u64(4);
        let pair = MockFifoPair::<u8>::new("FIFO_U8").with_fault(MockFault::StallRead);
        assert!(matches!(
            validate_fifo(&pair, &settings(8), &mut rng),
            Err(BenchError::TransferTimeout { .. })
        ));
    }

    #[test]
    fn zero_block_size_is_rejected_before_touching_the_device() {
        let mut rng = StdRng::seed_from_u64(5);
        let pair = MockFifoPair::<i32>::new("FIFO_I32");
        assert!(matches!(
            validate_fifo(&pair, &settings(0), &mut rng),
            Err(BenchError::Configuration(_))
        ));
        assert_eq!(pair.configured_depth(), 0);
    }
}
