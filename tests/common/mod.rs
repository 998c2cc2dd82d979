#![allow(dead_code)]

use std::ptr;

use parking_lot::{const_mutex, Mutex, MutexGuard};
use serde_json::Value;

use sarissa_jpc::ffi::{init, sarissa_jpc, sarissa_jpc_free, term, JpcBuffer};

/// The bridge is process-global; tests in one binary take turns.
static SERIAL: Mutex<()> = const_mutex(());

pub struct Response {
    pub status: i64,
    pub items: Vec<Value>,
}

impl Response {
    pub fn item(&self) -> &Value {
        assert_eq!(self.items.len(), 1, "expected one item, got {:?}", self.items);
        &self.items[0]
    }
}

/// Take the test lock and start from a fresh bridge.
pub fn fresh_bridge() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    unsafe { term(ptr::null()) };
    assert_eq!(init(), 0);
    guard
}

/// Take the test lock with no bridge running.
pub fn no_bridge() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock();
    unsafe { term(ptr::null()) };
    guard
}

pub fn call_bytes(request: &[u8]) -> Response {
    let mut ret: *mut JpcBuffer = ptr::null_mut();
    let mut count = 0usize;
    let status = unsafe { sarissa_jpc(request.as_ptr(), request.len(), &mut ret, &mut count) };

    let items = if ret.is_null() {
        assert_eq!(count, 0);
        Vec::new()
    } else {
        let buffers = unsafe { std::slice::from_raw_parts(ret, count) };
        buffers
            .iter()
            .map(|buffer| serde_json::from_slice(unsafe { buffer.as_bytes() }).unwrap())
            .collect()
    };
    unsafe { sarissa_jpc_free(ret, count) };

    Response { status, items }
}

pub fn call(request: Value) -> Response {
    call_bytes(request.to_string().as_bytes())
}

/// Call and require success.
pub fn ok(request: Value) -> Vec<Value> {
    let response = call(request.clone());
    assert_eq!(
        response.status, 0,
        "{request} failed: {:?}",
        response.items
    );
    response.items
}

/// An object-shape request.
pub fn obj(session: &str, obj: &str, method: &str, params: Value) -> Value {
    serde_json::json!({
        "id": session,
        "jpc": "1.0",
        "obj": obj,
        "method": method,
        "params": params,
    })
}
