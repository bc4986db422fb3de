//! Channel Registry for the Bitfile Interface
//!
//! This module is the single description of the loopback interface compiled
//! into the FPGA bitfile: every register pair and DMA FIFO pair the benchmark
//! can drive, with its direction addresses and element type. The table is
//! immutable for a run; there is no dynamic channel discovery.
//!
//! # Bitfile Interface (Bitfile-7975R-0002.lvbitx)
//!
//! | Channel | Kind | host→target | target→host |
//! |---------|------|-------------|-------------|
//! | `FIFO_U64` | u64 | FIFO 2 (`FIFO_U64H2T`) | FIFO 0 (`FIFO_U64T2H`) |
//! | `FIFO_I32` | i32 | FIFO 3 (`FIFO_I32H2T`) | FIFO 1 (`FIFO_I32T2H`) |
//!
//! | Register pair | Kind | control | indicator |
//! |---------------|------|---------|-----------|
//! | `I32` | i32 | 65536 (`I32in`) | 65540 (`I32out`) |
//! | `u8`  | u8  | 65544 (`u8in`)  | 65548 (`u8out`)  |
//!
//! The registry also owns the run-time channel handles: a [`Channel`] is one
//! named loopback unit wrapping a typed [`FifoPair`] behind an element-kind
//! enum, so the rest of the benchmark can hold heterogeneous channel sets in
//! one collection. [`mock_channel_set`] mirrors the bitfile table onto
//! in-memory loopback doubles; `fpga_channel_set` (feature `fpga_hardware`)
//! binds it to an open device session.

use std::fmt;

use crate::hardware::capabilities::{FifoPair, RegisterPair};

// =============================================================================
// Element kinds
// =============================================================================

/// Element type of a channel: bit width plus signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Unsigned 8-bit.
    U8,
    /// Signed 32-bit.
    I32,
    /// Unsigned 64-bit.
    U64,
}

impl ElementKind {
    /// Width of one element in bits.
    pub fn bit_width(self) -> u32 {
        match self {
            ElementKind::U8 => 8,
            ElementKind::I32 => 32,
            ElementKind::U64 => 64,
        }
    }

    /// Whether the element type is signed.
    pub fn is_signed(self) -> bool {
        matches!(self, ElementKind::I32)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::U8 => "u8",
            ElementKind::I32 => "i32",
            ElementKind::U64 => "u64",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Bitfile descriptor table
// =============================================================================

/// Bitfile deployed to the target.
pub const BITFILE_FILE: &str = "Bitfile-7975R-0002.lvbitx";

/// Signature the open call checks against the deployed bitfile.
pub const BITFILE_SIGNATURE: &str = "28EC3C5C7B6D124E15F517BE0C340D21";

/// One register loopback pair in the bitfile interface.
#[derive(Debug, Clone, Copy)]
pub struct RegisterSpec {
    /// Pair name (used in error reports).
    pub name: &'static str,
    /// Address of the control (input) register.
    pub input: u32,
    /// Address of the indicator (output) register.
    pub output: u32,
    /// Element type of both registers.
    pub kind: ElementKind,
}

/// One FIFO loopback pair in the bitfile interface.
#[derive(Debug, Clone, Copy)]
pub struct FifoSpec {
    /// Channel name (used in artifact names, error reports and logs).
    pub name: &'static str,
    /// FIFO number of the host→target direction.
    pub host_to_target: u32,
    /// FIFO number of the target→host direction.
    pub target_to_host: u32,
    /// Element type carried by both directions.
    pub kind: ElementKind,
}

/// Register loopback pairs wired in the bitfile.
pub const REGISTER_PAIRS: &[RegisterSpec] = &[
    RegisterSpec {
        name: "I32",
        input: 65536,
        output: 65540,
        kind: ElementKind::I32,
    },
    RegisterSpec {
        name: "u8",
        input: 65544,
        output: 65548,
        kind: ElementKind::U8,
    },
];

/// FIFO loopback pairs wired in the bitfile.
pub const FIFO_PAIRS: &[FifoSpec] = &[
    FifoSpec {
        name: "FIFO_U64",
        host_to_target: 2,
        target_to_host: 0,
        kind: ElementKind::U64,
    },
    FifoSpec {
        name: "FIFO_I32",
        host_to_target: 3,
        target_to_host: 1,
        kind: ElementKind::I32,
    },
];

// =============================================================================
// Run-time channel handles
// =============================================================================

/// Typed handle to a FIFO loopback pair.
///
/// The element type is fixed when the channel is built from the bitfile
/// table; the enum lets heterogeneous channels live in one `Vec` while the
/// validator and sampler stay generic over the element type.
pub enum FifoHandle {
    /// Pair carrying unsigned 8-bit elements.
    U8(Box<dyn FifoPair<u8>>),
    /// Pair carrying signed 32-bit elements.
    I32(Box<dyn FifoPair<i32>>),
    /// Pair carrying unsigned 64-bit elements.
    U64(Box<dyn FifoPair<u64>>),
}

/// One named loopback channel. Immutable after creation.
pub struct Channel {
    name: String,
    handle: FifoHandle,
}

impl Channel {
    /// Wrap a typed pair handle; the channel takes its name from the pair.
    pub fn new(handle: FifoHandle) -> Self {
        let name = match &handle {
            FifoHandle::U8(p) => p.name().to_string(),
            FifoHandle::I32(p) => p.name().to_string(),
            FifoHandle::U64(p) => p.name().to_string(),
        };
        Self { name, handle }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type carried by this channel.
    pub fn kind(&self) -> ElementKind {
        match &self.handle {
            FifoHandle::U8(_) => ElementKind::U8,
            FifoHandle::I32(_) => ElementKind::I32,
            FifoHandle::U64(_) => ElementKind::U64,
        }
    }

    /// Typed access for the validator and sampler dispatch.
    pub fn handle(&self) -> &FifoHandle {
        &self.handle
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Typed handle to a register loopback pair.
pub enum RegisterHandle {
    /// Pair of unsigned 8-bit registers.
    U8(Box<dyn RegisterPair<u8>>),
    /// Pair of signed 32-bit registers.
    I32(Box<dyn RegisterPair<i32>>),
    /// Pair of unsigned 64-bit registers.
    U64(Box<dyn RegisterPair<u64>>),
}

/// One named register loopback pair. Immutable after creation.
pub struct RegisterLoopback {
    name: String,
    handle: RegisterHandle,
}

impl RegisterLoopback {
    /// Wrap a typed pair handle; the loopback takes its name from the pair.
    pub fn new(handle: RegisterHandle) -> Self {
        let name = match &handle {
            RegisterHandle::U8(p) => p.name().to_string(),
            RegisterHandle::I32(p) => p.name().to_string(),
            RegisterHandle::U64(p) => p.name().to_string(),
        };
        Self { name, handle }
    }

    /// Pair name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed access for the validator dispatch.
    pub fn handle(&self) -> &RegisterHandle {
        &self.handle
    }
}

/// The full set of loopback units the benchmark drives in one run.
pub struct ChannelSet {
    /// Register loopback pairs, validated once per run.
    pub registers: Vec<RegisterLoopback>,
    /// FIFO loopback channels, validated and sampled per sweep step.
    pub channels: Vec<Channel>,
}

// =============================================================================
// Constructors
// =============================================================================

/// Build the bitfile channel set on top of in-memory loopback doubles.
///
/// Used by `--mock` runs and as the base fixture for integration tests.
pub fn mock_channel_set() -> ChannelSet {
    use crate::hardware::mock::{MockFifoPair, MockRegisterPair};

    let registers = REGISTER_PAIRS
        .iter()
        .map(|spec| {
            let handle = match spec.kind {
                ElementKind::U8 => {
                    RegisterHandle::U8(Box::new(MockRegisterPair::<u8>::new(spec.name)))
                }
                ElementKind::I32 => {
                    RegisterHandle::I32(Box::new(MockRegisterPair::<i32>::new(spec.name)))
                }
                ElementKind::U64 => {
                    RegisterHandle::U64(Box::new(MockRegisterPair::<u64>::new(spec.name)))
                }
            };
            RegisterLoopback::new(handle)
        })
        .collect();

    let channels = FIFO_PAIRS
        .iter()
        .map(|spec| {
            let handle = match spec.kind {
                ElementKind::U8 => FifoHandle::U8(Box::new(MockFifoPair::<u8>::new(spec.name))),
                ElementKind::I32 => FifoHandle::I32(Box::new(MockFifoPair::<i32>::new(spec.name))),
                ElementKind::U64 => FifoHandle::U64(Box::new(MockFifoPair::<u64>::new(spec.name))),
            };
            Channel::new(handle)
        })
        .collect();

    ChannelSet {
        registers,
        channels,
    }
}

/// Build the bitfile channel set on top of an open device session.
///
/// All channels share the one read-mostly session handle; distinct FIFO
/// pairs are hardware-independent, so concurrent samplers never contend.
#[cfg(feature = "fpga_hardware")]
pub fn fpga_channel_set(
    session: &std::sync::Arc<crate::hardware::nifpga::FpgaSession>,
) -> ChannelSet {
    use crate::hardware::nifpga::{FpgaFifoPair, FpgaRegisterPair};

    let registers = REGISTER_PAIRS
        .iter()
        .map(|spec| {
            let handle = match spec.kind {
                ElementKind::U8 => {
                    RegisterHandle::U8(Box::new(FpgaRegisterPair::<u8>::new(session.clone(), spec)))
                }
                ElementKind::I32 => RegisterHandle::I32(Box::new(FpgaRegisterPair::<i32>::new(
                    session.clone(),
                    spec,
                ))),
                ElementKind::U64 => RegisterHandle::U64(Box::new(FpgaRegisterPair::<u64>::new(
                    session.clone(),
                    spec,
                ))),
            };
            RegisterLoopback::new(handle)
        })
        .collect();

    let channels = FIFO_PAIRS
        .iter()
        .map(|spec| {
            let handle = match spec.kind {
                ElementKind::U8 => {
                    FifoHandle::U8(Box::new(FpgaFifoPair::<u8>::new(session.clone(), spec)))
                }
                ElementKind::I32 => {
                    FifoHandle::I32(Box::new(FpgaFifoPair::<i32>::new(session.clone(), spec)))
                }
                ElementKind::U64 => {
                    FifoHandle::U64(Box::new(FpgaFifoPair::<u64>::new(session.clone(), spec)))
                }
            };
            Channel::new(handle)
        })
        .collect();

    ChannelSet {
        registers,
        channels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_kinds_describe_width_and_signedness() {
        assert_eq!(ElementKind::U8.bit_width(), 8);
        assert_eq!(ElementKind::I32.bit_width(), 32);
        assert_eq!(ElementKind::U64.bit_width(), 64);
        assert!(ElementKind::I32.is_signed());
        assert!(!ElementKind::U64.is_signed());
        assert_eq!(ElementKind::I32.to_string(), "i32");
    }

    #[test]
    fn bitfile_table_matches_the_deployed_interface() {
        assert_eq!(FIFO_PAIRS.len(), 2);
        let u64_pair = &FIFO_PAIRS[0];
        assert_eq!(u64_pair.name, "FIFO_U64");
        assert_eq!(u64_pair.host_to_target, 2);
        assert_eq!(u64_pair.target_to_host, 0);

        assert_eq!(REGISTER_PAIRS.len(), 2);
        assert_eq!(REGISTER_PAIRS[0].input, 65536);
        assert_eq!(REGISTER_PAIRS[0].output, 65540);
    }

    #[test]
    fn mock_set_mirrors_the_bitfile_table() {
        let set = mock_channel_set();
        assert_eq!(set.channels.len(), FIFO_PAIRS.len());
        assert_eq!(set.registers.len(), REGISTER_PAIRS.len());
        assert_eq!(set.channels[0].name(), "FIFO_U64");
        assert_eq!(set.channels[0].kind(), ElementKind::U64);
        assert_eq!(set.channels[1].name(), "FIFO_I32");
        assert_eq!(set.channels[1].kind(), ElementKind::I32);
    }
}
