//! The `extern "C"` surface of the bridge.
//!
//! ```text
//! init() -> i8
//! term(label) -> i8
//! set_k_and_b(k, b) -> i8
//! sarissa_jpc(msg, len, ret, ret_count) -> i64
//! sarissa_jpc_free(buffers, count)
//! ```

pub mod bridge;
pub mod buffer;
pub mod status;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use tracing::{debug, warn};

use crate::dispatch::{encode_items, error_body};
use crate::error::{JpcError, Result};

pub use buffer::{live_buffer_count, JpcBuffer};
use status::{narrow, STATUS_ALLOCATION, STATUS_INVALID_INPUT, STATUS_OK};

fn byte_status(result: Result<()>) -> i8 {
    match result {
        Ok(()) => narrow(STATUS_OK),
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "lifecycle call failed");
            narrow(e.status())
        }
    }
}

/// Start a process lifetime. Must precede every other call.
#[unsafe(no_mangle)]
pub extern "C" fn init() -> i8 {
    byte_status(bridge::init())
}

/// End the process lifetime. `label` may be null and is only logged.
///
/// # Safety
///
/// A non-null `label` must point at a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn term(label: *const c_char) -> i8 {
    let label = if label.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(label) }.to_string_lossy().into_owned())
    };
    byte_status(bridge::term(label.as_deref()))
}

/// Set the BM25 `k1` and `b` parameters.
#[unsafe(no_mangle)]
pub extern "C" fn set_k_and_b(k: f32, b: f32) -> i8 {
    byte_status(bridge::set_k_and_b(k, b))
}

/// Hand `buffers` to the host, or report an allocation failure.
unsafe fn write_out(
    buffers: &[Vec<u8>],
    ret: *mut *mut JpcBuffer,
    ret_count: *mut usize,
) -> std::result::Result<(), i64> {
    match buffer::into_raw_buffers(buffers) {
        Ok((array, count)) => {
            unsafe {
                *ret = array;
                *ret_count = count;
            }
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "response not allocated");
            Err(STATUS_ALLOCATION)
        }
    }
}

unsafe fn write_error(
    error: &JpcError,
    id: &str,
    ret: *mut *mut JpcBuffer,
    ret_count: *mut usize,
) -> i64 {
    let body = error_body(error, id);
    match unsafe { write_out(&[body], ret, ret_count) } {
        Ok(()) => error.status(),
        Err(status) => status,
    }
}

/// Execute one JSON request.
///
/// On return `*ret` holds `*ret_count` buffers to release with
/// [`sarissa_jpc_free`]; zero buffers leave `*ret` null.
///
/// # Safety
///
/// `msg` must be valid for `len` bytes; `ret` and `ret_count` must be valid
/// for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sarissa_jpc(
    msg: *const u8,
    len: usize,
    ret: *mut *mut JpcBuffer,
    ret_count: *mut usize,
) -> i64 {
    if ret.is_null() || ret_count.is_null() {
        return STATUS_INVALID_INPUT;
    }
    unsafe {
        *ret = ptr::null_mut();
        *ret_count = 0;
    }

    let bytes: &[u8] = if len == 0 {
        &[]
    } else if msg.is_null() {
        let e = JpcError::invalid_input("msg is null");
        return unsafe { write_error(&e, "", ret, ret_count) };
    } else {
        unsafe { std::slice::from_raw_parts(msg, len) }
    };

    let reply = bridge::dispatch(bytes);
    let encoded = reply.result.and_then(|items| encode_items(&items));
    match encoded {
        Ok(buffers) => {
            debug!(session = %reply.id, items = buffers.len(), "request done");
            match unsafe { write_out(&buffers, ret, ret_count) } {
                Ok(()) => STATUS_OK,
                Err(status) => status,
            }
        }
        Err(e) => unsafe { write_error(&e, &reply.id, ret, ret_count) },
    }
}

/// Release a buffer set returned by [`sarissa_jpc`]. Null or zero is a no-op.
///
/// # Safety
///
/// `buffers` and `count` must come from one [`sarissa_jpc`] call and be
/// released only once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sarissa_jpc_free(buffers: *mut JpcBuffer, count: usize) {
    unsafe { buffer::free_buffers(buffers, count) }
}
