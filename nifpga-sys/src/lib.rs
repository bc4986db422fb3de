//! Low-level FFI bindings for the NI FPGA Interface C API.
//!
//! This crate provides raw, unsafe bindings to the NiFpga C library, the
//! host-side interface to LabVIEW FPGA bitfiles running on NI RIO targets
//! (PXIe/PCIe FlexRIO, CompactRIO, USB RIO).
//!
//! # Safety
//!
//! All functions in this crate are `unsafe` as they are direct FFI bindings.
//! For a safe wrapper, use the `rio_latency::hardware::nifpga` module instead.
//!
//! # Features
//!
//! - `nifpga-sdk`: Generate bindings from the installed NI FPGA C API headers.
//!   Without this feature, pre-defined bindings are used so the workspace
//!   builds on machines without the SDK.
//!
//! # Example (unsafe)
//!
//! ```no_run
//! use nifpga_sys::*;
//! use std::ffi::CString;
//!
//! unsafe {
//!     let status = NiFpga_Initialize();
//!     assert_eq!(status, NiFpga_Status_Success);
//!
//!     let bitfile = CString::new("latency.lvbitx").unwrap();
//!     let signature = CString::new("28EC3C5C7B6D124E15F517BE0C340D21").unwrap();
//!     let resource = CString::new("RIO0").unwrap();
//!     let mut session: NiFpga_Session = 0;
//!     NiFpga_Open(
//!         bitfile.as_ptr(),
//!         signature.as_ptr(),
//!         resource.as_ptr(),
//!         0,
//!         &mut session,
//!     );
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(clippy::all)]

// Include the generated bindings
include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

/// Returns true when `status` signals success (zero or a warning).
///
/// The NiFpga API uses negative status codes for errors and positive ones
/// for warnings; warnings leave the operation completed.
#[inline]
pub fn NiFpga_IsError(status: NiFpga_Status) -> bool {
    status < NiFpga_Status_Success
}
