//! Response buffers handed to the host.
//!
//! A response is an array of [`JpcBuffer`]s. Both the array and every inner
//! byte buffer are boxed slices leaked with `Box::into_raw`, and are only
//! reclaimed by [`free_buffers`].

use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{JpcError, Result};

static LIVE_BUFFERS: AtomicUsize = AtomicUsize::new(0);

/// One response item: `len` bytes of JSON at `data`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JpcBuffer {
    /// First byte of the item.
    pub data: *mut u8,
    /// Number of bytes.
    pub len: usize,
}

impl JpcBuffer {
    /// View the buffer bytes.
    ///
    /// # Safety
    ///
    /// The buffer must come from [`into_raw_buffers`] and not be freed yet.
    pub unsafe fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.data, self.len) }
    }
}

/// Number of inner buffers handed out and not freed yet.
pub fn live_buffer_count() -> usize {
    LIVE_BUFFERS.load(Ordering::SeqCst)
}

fn leak_bytes(item: &[u8]) -> Result<JpcBuffer> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(item.len())
        .map_err(|e| JpcError::allocation(format!("{} byte buffer: {e}", item.len())))?;
    bytes.extend_from_slice(item);

    let boxed = bytes.into_boxed_slice();
    let len = boxed.len();
    let data = Box::into_raw(boxed) as *mut u8;
    LIVE_BUFFERS.fetch_add(1, Ordering::SeqCst);
    Ok(JpcBuffer { data, len })
}

unsafe fn release(buffer: JpcBuffer) {
    if buffer.data.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
            buffer.data,
            buffer.len,
        )));
    }
    LIVE_BUFFERS.fetch_sub(1, Ordering::SeqCst);
}

/// Leak `items` as a buffer array. No items gives a null pointer.
///
/// On failure every buffer allocated so far is released again.
pub fn into_raw_buffers(items: &[Vec<u8>]) -> Result<(*mut JpcBuffer, usize)> {
    if items.is_empty() {
        return Ok((ptr::null_mut(), 0));
    }

    let mut buffers: Vec<JpcBuffer> = Vec::new();
    buffers
        .try_reserve_exact(items.len())
        .map_err(|e| JpcError::allocation(format!("{} buffers: {e}", items.len())))?;

    for item in items {
        match leak_bytes(item) {
            Ok(buffer) => buffers.push(buffer),
            Err(e) => {
                for buffer in buffers {
                    unsafe { release(buffer) };
                }
                return Err(e);
            }
        }
    }

    let count = buffers.len();
    let array = Box::into_raw(buffers.into_boxed_slice()) as *mut JpcBuffer;
    Ok((array, count))
}

/// Release a buffer array and every buffer in it. Null or zero is a no-op.
///
/// # Safety
///
/// `buffers` and `count` must be exactly what [`into_raw_buffers`] returned,
/// and the set must not have been freed before.
pub unsafe fn free_buffers(buffers: *mut JpcBuffer, count: usize) {
    if buffers.is_null() || count == 0 {
        return;
    }
    let array = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(buffers, count)) };
    for buffer in array.iter() {
        unsafe { release(*buffer) };
    }
}
