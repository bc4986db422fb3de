//! Atomic Hardware Capabilities
//!
//! This module defines the fine-grained capability traits the benchmark core
//! is written against. Instead of one monolithic device trait, a target
//! exposes exactly the two surfaces the benchmark needs:
//!
//! - `RegisterPair` - a control/indicator loopback pair for sanity checks
//! - `FifoPair` - a host→target / target→host DMA FIFO loopback pair
//!
//! This approach enables:
//! - Hardware-agnostic core code (validator, sampler, coordinator work with
//!   trait bounds only)
//! - Easy substitution of loopback test doubles for the physical target
//!
//! # Design Philosophy
//!
//! Each capability trait:
//! - Is synchronous and blocking (all device operations and the inter-sample
//!   delay block the calling thread; there is no event loop)
//! - Is thread-safe (requires Send + Sync); one pair may be shared between
//!   a validation pass and a later sampling pass, but is never driven by two
//!   threads at the same time
//! - Uses `BenchResult` so timeouts keep their identity across the seam

use std::fmt::Display;
use std::time::Duration;

use rand::Rng;

use crate::error::BenchResult;

/// Element types a channel can carry.
///
/// Implemented for the scalar types that appear in the bitfile interface
/// (`u8`, `i32`, `u64`). The trait carries the small amount of per-type
/// behavior the core needs: generating block content, deriving a register
/// walk value from a loop index, and producing a guaranteed-different value
/// for corruption injection in test doubles.
pub trait Element:
    Copy + PartialEq + Default + Display + Send + Sync + 'static
{
    /// Value written during the register walk for loop index `i`,
    /// truncating like a C integer cast.
    fn from_index(i: u32) -> Self;

    /// Draw one element of arbitrary content from the caller's generator.
    fn random<R: Rng>(rng: &mut R) -> Self;

    /// Bitwise complement. Guaranteed to differ from `self`; used by test
    /// doubles to inject corruption that a loopback comparison must catch.
    fn toggled(self) -> Self;
}

impl Element for u8 {
    fn from_index(i: u32) -> Self {
        i as u8
    }

    fn random<R: Rng>(rng: &mut R) -> Self {
        rng.gen()
    }

    fn toggled(self) -> Self {
        !self
    }
}

impl Element for i32 {
    fn from_index(i: u32) -> Self {
        i as i32
    }

    fn random<R: Rng>(rng: &mut R) -> Self {
        rng.gen()
    }

    fn toggled(self) -> Self {
        !self
    }
}

impl Element for u64 {
    fn from_index(i: u32) -> Self {
        u64::from(i)
    }

    fn random<R: Rng>(rng: &mut R) -> Self {
        rng.gen()
    }

    fn toggled(self) -> Self {
        !self
    }
}

/// Capability: Register Loopback
///
/// A control register wired on the target to an indicator register, so that
/// every value written to the input side can be read back from the output
/// side.
///
/// # Contract
/// - `write_input` and `read_output` are blocking single-value operations
/// - A value written to the input is observable on the output by the next
///   read (the loopback path on the target is combinational or single-cycle)
pub trait RegisterPair<T: Element>: Send + Sync {
    /// Channel name, used in error reports and log output.
    fn name(&self) -> &str;

    /// Write one value to the control (input) register.
    fn write_input(&self, value: T) -> BenchResult<()>;

    /// Read one value back from the indicator (output) register.
    fn read_output(&self) -> BenchResult<T>;
}

/// Capability: FIFO Loopback
///
/// A host→target DMA FIFO wired on the target to a target→host DMA FIFO,
/// treated as one round-trip unit.
///
/// # Contract
/// - `configure_depth` sets the host-side buffer depth of BOTH directions
/// - `write_block`/`read_block` are blocking and must complete within
///   `timeout`, otherwise they fail with `BenchError::TransferTimeout`
///   carrying this pair's name
/// - A completed write of N elements is followed by exactly N elements
///   becoming readable on the return direction (the target echoes blocks
///   unmodified and unreordered)
/// - No partial transfers: on timeout the operation is abandoned and the
///   caller discards the whole measurement
pub trait FifoPair<T: Element>: Send + Sync {
    /// Channel name, used in artifact names, error reports and log output.
    fn name(&self) -> &str;

    /// Set the host-side queue depth, in elements, for both directions.
    fn configure_depth(&self, depth: usize) -> BenchResult<()>;

    /// Blocking-write `block.len()` elements to the host→target direction.
    fn write_block(&self, block: &[T], timeout: Duration) -> BenchResult<()>;

    /// Blocking-read `out.len()` elements from the target→host direction.
    fn read_block(&self, out: &mut [T], timeout: Duration) -> BenchResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn from_index_truncates_like_a_cast() {
        assert_eq!(u8::from_index(0), 0);
        assert_eq!(u8::from_index(99), 99);
        assert_eq!(u8::from_index(260), 4);
        assert_eq!(i32::from_index(7), 7);
        assert_eq!(u64::from_index(99), 99);
    }

    #[test]
    fn toggled_always_differs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let a: u8 = Element::random(&mut rng);
            let b: i32 = Element::random(&mut rng);
            let c: u64 = Element::random(&mut rng);
            assert_ne!(a, a.toggled());
            assert_ne!(b, b.toggled());
            assert_ne!(c, c.toggled());
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let xs: Vec<i32> = (0..16).map(|_| Element::random(&mut a)).collect();
        let ys: Vec<i32> = (0..16).map(|_| Element::random(&mut b)).collect();
        assert_eq!(xs, ys);
    }
}
