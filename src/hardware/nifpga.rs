//! NI FPGA Device Session and Channel Drivers
//!
//! Safe wrapper over the `nifpga-sys` FFI bindings, compiled only with the
//! `fpga_hardware` feature. One [`FpgaSession`] is opened per run and shared
//! read-mostly across sampler threads behind an `Arc`; the NiFpga C API is
//! thread-safe for operations on distinct FIFOs and registers, which is the
//! only concurrent access pattern the coordinator produces.
//!
//! Status-code policy: the FIFO-timeout status becomes
//! [`BenchError::TransferTimeout`] so the core can tell a stuck channel from
//! a broken session; every other non-success status becomes
//! [`BenchError::Session`].

// The one module allowed to cross the FFI boundary.
#![allow(unsafe_code)]

use std::ffi::CString;
use std::marker::PhantomData;
use std::path::Path;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use nifpga_sys as ffi;
use tracing::{debug, warn};

use crate::error::{BenchError, BenchResult};
use crate::hardware::capabilities::{Element, FifoPair, RegisterPair};
use crate::hardware::registry::{FifoSpec, RegisterSpec};

fn check_session(status: ffi::NiFpga_Status, context: &str) -> BenchResult<()> {
    if ffi::NiFpga_IsError(status) {
        Err(BenchError::Session(format!(
            "{context} failed with status {status}"
        )))
    } else {
        Ok(())
    }
}

fn c_string(value: &str, what: &str) -> BenchResult<CString> {
    CString::new(value)
        .map_err(|_| BenchError::Session(format!("{what} contains an interior NUL byte")))
}

fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(ffi::NiFpga_InfiniteTimeout)
}

// =============================================================================
// Session
// =============================================================================

/// An open session to a running bitfile on an NI RIO target.
///
/// Opening downloads and runs the bitfile; dropping the last handle closes
/// the session and finalizes the library.
pub struct FpgaSession {
    session: ffi::NiFpga_Session,
}

impl FpgaSession {
    /// Open `resource` (e.g. `"RIO0"`) with the given bitfile and signature.
    pub fn open(bitfile: &Path, signature: &str, resource: &str) -> BenchResult<Arc<Self>> {
        let bitfile = c_string(&bitfile.to_string_lossy(), "bitfile path")?;
        let signature = c_string(signature, "bitfile signature")?;
        let resource = c_string(resource, "resource name")?;

        unsafe {
            check_session(ffi::NiFpga_Initialize(), "NiFpga_Initialize")?;

            let mut session: ffi::NiFpga_Session = 0;
            let status = ffi::NiFpga_Open(
                bitfile.as_ptr(),
                signature.as_ptr(),
                resource.as_ptr(),
                0,
                &mut session,
            );
            if let Err(err) = check_session(status, "NiFpga_Open") {
                ffi::NiFpga_Finalize();
                return Err(err);
            }
            debug!(session, "opened FPGA session");
            Ok(Arc::new(Self { session }))
        }
    }

    fn raw(&self) -> ffi::NiFpga_Session {
        self.session
    }
}

impl Drop for FpgaSession {
    fn drop(&mut self) {
        unsafe {
            let status = ffi::NiFpga_Close(self.session, 0);
            if ffi::NiFpga_IsError(status) {
                warn!(status, "NiFpga_Close reported an error");
            }
            ffi::NiFpga_Finalize();
        }
    }
}

// =============================================================================
// Typed C API dispatch
// =============================================================================

/// Maps an element type onto the matching typed NiFpga calls.
trait FpgaElement: Element {
    /// # Safety
    /// `session` must be a live session and `control` a matching control id.
    unsafe fn write_register(
        session: ffi::NiFpga_Session,
        control: u32,
        value: Self,
    ) -> ffi::NiFpga_Status;

    /// # Safety
    /// `session` must be a live session and `indicator` a matching id.
    unsafe fn read_register(
        session: ffi::NiFpga_Session,
        indicator: u32,
        value: *mut Self,
    ) -> ffi::NiFpga_Status;

    /// # Safety
    /// `data` must point to at least `count` readable elements.
    unsafe fn write_fifo(
        session: ffi::NiFpga_Session,
        fifo: u32,
        data: *const Self,
        count: usize,
        timeout_ms: u32,
    ) -> ffi::NiFpga_Status;

    /// # Safety
    /// `data` must point to at least `count` writable elements.
    unsafe fn read_fifo(
        session: ffi::NiFpga_Session,
        fifo: u32,
        data: *mut Self,
        count: usize,
        timeout_ms: u32,
    ) -> ffi::NiFpga_Status;
}

macro_rules! impl_fpga_element {
    ($ty:ty, $write_reg:ident, $read_reg:ident, $write_fifo:ident, $read_fifo:ident) => {
        impl FpgaElement for $ty {
            unsafe fn write_register(
                session: ffi::NiFpga_Session,
                control: u32,
                value: Self,
            ) -> ffi::NiFpga_Status {
                ffi::$write_reg(session, control, value)
            }

            unsafe fn read_register(
                session: ffi::NiFpga_Session,
                indicator: u32,
                value: *mut Self,
            ) -> ffi::NiFpga_Status {
                ffi::$read_reg(session, indicator, value)
            }

            unsafe fn write_fifo(
                session: ffi::NiFpga_Session,
                fifo: u32,
                data: *const Self,
                count: usize,
                timeout_ms: u32,
            ) -> ffi::NiFpga_Status {
                ffi::$write_fifo(session, fifo, data, count, timeout_ms, ptr::null_mut())
            }

            unsafe fn read_fifo(
                session: ffi::NiFpga_Session,
                fifo: u32,
                data: *mut Self,
                count: usize,
                timeout_ms: u32,
            ) -> ffi::NiFpga_Status {
                ffi::$read_fifo(session, fifo, data, count, timeout_ms, ptr::null_mut())
            }
        }
    };
}

impl_fpga_element!(u8, NiFpga_WriteU8, NiFpga_ReadU8, NiFpga_WriteFifoU8, NiFpga_ReadFifoU8);
impl_fpga_element!(
    i32,
    NiFpga_WriteI32,
    NiFpga_ReadI32,
    NiFpga_WriteFifoI32,
    NiFpga_ReadFifoI32
);
impl_fpga_element!(
    u64,
    NiFpga_WriteU64,
    NiFpga_ReadU64,
    NiFpga_WriteFifoU64,
    NiFpga_ReadFifoU64
);

// =============================================================================
// Channel drivers
// =============================================================================

/// Register loopback pair on an open session.
pub struct FpgaRegisterPair<T> {
    session: Arc<FpgaSession>,
    name: String,
    input: u32,
    output: u32,
    _element: PhantomData<T>,
}

impl<T> FpgaRegisterPair<T> {
    /// Bind a register pair descriptor to an open session.
    pub fn new(session: Arc<FpgaSession>, spec: &RegisterSpec) -> Self {
        Self {
            session,
            name: spec.name.to_string(),
            input: spec.input,
            output: spec.output,
            _element: PhantomData,
        }
    }
}

impl<T: FpgaElement> RegisterPair<T> for FpgaRegisterPair<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_input(&self, value: T) -> BenchResult<()> {
        let status = unsafe { T::write_register(self.session.raw(), self.input, value) };
        check_session(status, "register write")
    }

    fn read_output(&self) -> BenchResult<T> {
        let mut value = T::default();
        let status = unsafe { T::read_register(self.session.raw(), self.output, &mut value) };
        check_session(status, "register read")?;
        Ok(value)
    }
}

/// FIFO loopback pair on an open session.
pub struct FpgaFifoPair<T> {
    session: Arc<FpgaSession>,
    name: String,
    host_to_target: u32,
    target_to_host: u32,
    _element: PhantomData<T>,
}

impl<T> FpgaFifoPair<T> {
    /// Bind a FIFO pair descriptor to an open session.
    pub fn new(session: Arc<FpgaSession>, spec: &FifoSpec) -> Self {
        Self {
            session,
            name: spec.name.to_string(),
            host_to_target: spec.host_to_target,
            target_to_host: spec.target_to_host,
            _element: PhantomData,
        }
    }

    fn check_transfer(&self, status: ffi::NiFpga_Status, timeout: Duration) -> BenchResult<()> {
        if status == ffi::NiFpga_Status_FifoTimeout {
            return Err(BenchError::TransferTimeout {
                channel: self.name.clone(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        if ffi::NiFpga_IsError(status) {
            return Err(BenchError::Session(format!(
                "FIFO transfer on '{}' failed with status {status}",
                self.name
            )));
        }
        Ok(())
    }
}

impl<T: FpgaElement> FifoPair<T> for FpgaFifoPair<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure_depth(&self, depth: usize) -> BenchResult<()> {
        unsafe {
            check_session(
                ffi::NiFpga_ConfigureFifo(self.session.raw(), self.host_to_target, depth),
                "FIFO configure (host to target)",
            )?;
            check_session(
                ffi::NiFpga_ConfigureFifo(self.session.raw(), self.target_to_host, depth),
                "FIFO configure (target to host)",
            )?;
        }
        Ok(())
    }

    fn write_block(&self, block: &[T], timeout: Duration) -> BenchResult<()> {
        let status = unsafe {
            T::write_fifo(
                self.session.raw(),
                self.host_to_target,
                block.as_ptr(),
                block.len(),
                timeout_ms(timeout),
            )
        };
        self.check_transfer(status, timeout)
    }

    fn read_block(&self, out: &mut [T], timeout: Duration) -> BenchResult<()> {
        let status = unsafe {
            T::read_fifo(
                self.session.raw(),
                self.target_to_host,
                out.as_mut_ptr(),
                out.len(),
                timeout_ms(timeout),
            )
        };
        self.check_transfer(status, timeout)
    }
}
