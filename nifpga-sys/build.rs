//! Build script for nifpga-sys FFI bindings.
//!
//! Generates Rust FFI bindings for the NI FPGA Interface C API using bindgen.
//! Two modes are supported:
//!
//! 1. With `nifpga-sdk` feature: generates bindings from the installed headers
//! 2. Without the feature: uses pre-defined bindings so the workspace compiles
//!    on machines without the NI FPGA C API

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=wrapper.h");
    println!("cargo:rerun-if-env-changed=NIFPGA_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=NIFPGA_LIB_DIR");

    #[cfg(feature = "nifpga-sdk")]
    generate_bindings();

    #[cfg(not(feature = "nifpga-sdk"))]
    generate_dummy_bindings();

    // Link against the NiFpga library when building with the SDK
    #[cfg(feature = "nifpga-sdk")]
    {
        if let Ok(lib_dir) = env::var("NIFPGA_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", lib_dir);
        } else {
            // Standard locations for the Linux RT / desktop installations
            let lib_paths = ["/usr/local/lib", "/usr/lib", "/usr/lib/x86_64-linux-gnu"];
            for path in lib_paths {
                if std::path::Path::new(path).join("libNiFpga.so").exists() {
                    println!("cargo:rustc-link-search=native={}", path);
                    break;
                }
            }
        }
        println!("cargo:rustc-link-lib=NiFpga");
    }
}

#[cfg(feature = "nifpga-sdk")]
fn generate_bindings() {
    let include_dir = env::var("NIFPGA_INCLUDE_DIR").unwrap_or_else(|_| {
        for path in ["/usr/local/include", "/usr/include"] {
            if std::path::Path::new(path).join("NiFpga.h").exists() {
                return path.to_string();
            }
        }
        "/usr/local/include".to_string()
    });

    println!("cargo:rerun-if-changed={}/NiFpga.h", include_dir);

    let bindings = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", include_dir))
        .allowlist_function("NiFpga_.*")
        .allowlist_type("NiFpga_.*")
        .allowlist_var("NiFpga_.*")
        .default_enum_style(bindgen::EnumVariation::Consts)
        .derive_debug(true)
        .derive_default(true)
        .derive_copy(true)
        .generate_comments(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate NiFpga bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}

/// Generate dummy bindings when the SDK is not available.
/// This allows the crate to compile on systems without the NI FPGA C API.
#[cfg(not(feature = "nifpga-sdk"))]
fn generate_dummy_bindings() {
    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dummy = r#"
// Dummy bindings - nifpga-sdk feature not enabled
//
// These are placeholder types and functions that allow the crate to compile
// without the actual NiFpga headers. Enable the `nifpga-sdk` feature to
// generate real bindings.

use std::os::raw::c_char;

/// Handle to an open FPGA session
pub type NiFpga_Session = u32;

/// Status code returned by every NiFpga call (0 = success, negative = error)
pub type NiFpga_Status = i32;

/// C boolean as used by the NiFpga API
pub type NiFpga_Bool = u8;

pub const NiFpga_True: NiFpga_Bool = 1;
pub const NiFpga_False: NiFpga_Bool = 0;

// Status codes
pub const NiFpga_Status_Success: NiFpga_Status = 0;
pub const NiFpga_Status_FifoTimeout: NiFpga_Status = -50400;
pub const NiFpga_Status_InvalidParameter: NiFpga_Status = -52005;
pub const NiFpga_Status_ResourceNotFound: NiFpga_Status = -63192;
pub const NiFpga_Status_SignatureMismatch: NiFpga_Status = -63106;
pub const NiFpga_Status_BitfileReadError: NiFpga_Status = -63101;
pub const NiFpga_Status_InvalidSession: NiFpga_Status = -63195;

// Timeouts
pub const NiFpga_InfiniteTimeout: u32 = 0xFFFFFFFF;

// Open attributes
pub const NiFpga_OpenAttribute_NoRun: u32 = 1;

// Close attributes
pub const NiFpga_CloseAttribute_NoResetIfLastSession: u32 = 1;

// Run attributes
pub const NiFpga_RunAttribute_WaitUntilDone: u32 = 1;

// Panic stub implementations - these allow linking to succeed but will panic
// at runtime if called without the nifpga-sdk feature enabled.
//
// This is intentional: it allows the workspace to build and test on systems
// without the NI FPGA C API installed, while still catching any accidental
// usage at runtime.

const NIFPGA_SDK_PANIC_MSG: &str = "NiFpga function called but nifpga-sdk feature is not enabled. \
    Enable the nifpga-sdk feature (or fpga_hardware in rio_latency) to use the real NiFpga library.";

#[no_mangle]
pub unsafe extern "C" fn NiFpga_Initialize() -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_Finalize() -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_Open(
    _bitfile: *const c_char,
    _signature: *const c_char,
    _resource: *const c_char,
    _attribute: u32,
    _session: *mut NiFpga_Session,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_Close(_session: NiFpga_Session, _attribute: u32) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_Run(_session: NiFpga_Session, _attribute: u32) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_Reset(_session: NiFpga_Session) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ReadU8(
    _session: NiFpga_Session,
    _indicator: u32,
    _value: *mut u8,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_WriteU8(
    _session: NiFpga_Session,
    _control: u32,
    _value: u8,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ReadI32(
    _session: NiFpga_Session,
    _indicator: u32,
    _value: *mut i32,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_WriteI32(
    _session: NiFpga_Session,
    _control: u32,
    _value: i32,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ReadU64(
    _session: NiFpga_Session,
    _indicator: u32,
    _value: *mut u64,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_WriteU64(
    _session: NiFpga_Session,
    _control: u32,
    _value: u64,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ConfigureFifo(
    _session: NiFpga_Session,
    _fifo: u32,
    _depth: usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_StartFifo(_session: NiFpga_Session, _fifo: u32) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_StopFifo(_session: NiFpga_Session, _fifo: u32) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_WriteFifoU8(
    _session: NiFpga_Session,
    _fifo: u32,
    _data: *const u8,
    _number_of_elements: usize,
    _timeout_ms: u32,
    _empty_elements_remaining: *mut usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ReadFifoU8(
    _session: NiFpga_Session,
    _fifo: u32,
    _data: *mut u8,
    _number_of_elements: usize,
    _timeout_ms: u32,
    _elements_remaining: *mut usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_WriteFifoI32(
    _session: NiFpga_Session,
    _fifo: u32,
    _data: *const i32,
    _number_of_elements: usize,
    _timeout_ms: u32,
    _empty_elements_remaining: *mut usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ReadFifoI32(
    _session: NiFpga_Session,
    _fifo: u32,
    _data: *mut i32,
    _number_of_elements: usize,
    _timeout_ms: u32,
    _elements_remaining: *mut usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_WriteFifoU64(
    _session: NiFpga_Session,
    _fifo: u32,
    _data: *const u64,
    _number_of_elements: usize,
    _timeout_ms: u32,
    _empty_elements_remaining: *mut usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}

#[no_mangle]
pub unsafe extern "C" fn NiFpga_ReadFifoU64(
    _session: NiFpga_Session,
    _fifo: u32,
    _data: *mut u64,
    _number_of_elements: usize,
    _timeout_ms: u32,
    _elements_remaining: *mut usize,
) -> NiFpga_Status {
    panic!("{}", NIFPGA_SDK_PANIC_MSG);
}
"#;

    std::fs::write(out_path.join("bindings.rs"), dummy).expect("Couldn't write dummy bindings!");
}
