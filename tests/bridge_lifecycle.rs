mod common;

use std::ffi::CString;
use std::ptr;

use serde_json::{json, Value};

use common::{call, call_bytes, fresh_bridge, no_bridge, ok};
use sarissa_jpc::ffi::bridge;
use sarissa_jpc::ffi::status::*;
use sarissa_jpc::ffi::{
    init, live_buffer_count, sarissa_jpc, sarissa_jpc_free, set_k_and_b, term, JpcBuffer,
};
use sarissa_jpc::search::scoring::{B_DESCRIPTION, K1_DESCRIPTION};

#[test]
fn test_calls_before_init_fail() {
    let _guard = no_bridge();

    assert_eq!(i64::from(set_k_and_b(1.2, 0.75)), STATUS_LIFECYCLE);
    assert_eq!(i64::from(unsafe { term(ptr::null()) }), STATUS_LIFECYCLE);

    let response = call(json!({"cmd": "num_docs"}));
    assert_eq!(response.status, STATUS_LIFECYCLE);
    assert_eq!(response.item()["kind"], "lifecycle");
    assert_eq!(response.item()["jpc"], "1.0");
}

#[test]
fn test_init_twice_keeps_live_bridge() {
    let _guard = fresh_bridge();

    ok(json!({"cmd": "index_document", "id": "keep", "doc": {"title": "East of Eden"}}));
    ok(json!({"cmd": "commit", "id": "keep"}));

    assert_eq!(i64::from(init()), STATUS_LIFECYCLE);

    let items = ok(json!({"cmd": "num_docs", "id": "keep"}));
    assert_eq!(items, vec![json!({"num_docs": 1})]);
}

#[test]
fn test_term_then_dispatch_is_lifecycle_error() {
    let _guard = fresh_bridge();

    assert_eq!(set_k_and_b(1.2, 0.75), 0);
    let response = call(json!({"cmd": "search", "q": "foo"}));
    assert_eq!(response.status, STATUS_OK);
    assert!(response.items.is_empty());

    let label = CString::new("shutdown").unwrap();
    assert_eq!(unsafe { term(label.as_ptr()) }, 0);
    assert!(!bridge::is_live());

    let response = call(json!({"cmd": "search", "q": "foo"}));
    assert_eq!(response.status, STATUS_LIFECYCLE);
    assert_eq!(response.items.len(), 1);
}

#[test]
fn test_reinit_starts_fresh() {
    let _guard = fresh_bridge();

    ok(json!({"cmd": "index_document", "id": "s", "doc": {"title": "The Pearl"}}));
    ok(json!({"cmd": "commit", "id": "s"}));
    assert_eq!(set_k_and_b(2.0, 0.1), 0);

    assert_eq!(unsafe { term(ptr::null()) }, 0);
    assert_eq!(init(), 0);

    let items = ok(json!({"cmd": "num_docs", "id": "s"}));
    assert_eq!(items, vec![json!({"num_docs": 0})]);
    let scoring = bridge::scoring().unwrap();
    assert_eq!((scoring.k1, scoring.b), (1.2, 0.75));
}

#[test]
fn test_set_k_and_b_rejects_non_finite() {
    let _guard = fresh_bridge();

    assert_eq!(i64::from(set_k_and_b(f32::NAN, 0.75)), STATUS_INVALID_INPUT);
    assert_eq!(i64::from(set_k_and_b(1.2, f32::INFINITY)), STATUS_INVALID_INPUT);

    let scoring = bridge::scoring().unwrap();
    assert_eq!((scoring.k1, scoring.b), (1.2, 0.75));
}

#[test]
fn test_k_and_b_reach_explanations() {
    let _guard = fresh_bridge();

    ok(json!({"cmd": "index_document", "id": "kb", "doc": {"body": "salinas valley salinas"}}));
    ok(json!({"cmd": "index_document", "id": "kb", "doc": {"body": "monterey"}}));
    ok(json!({"cmd": "commit", "id": "kb"}));

    let search = json!({"cmd": "search", "id": "kb", "q": "salinas", "explain": true});
    let before = ok(search.clone());

    assert_eq!(set_k_and_b(2.0, 0.5), 0);
    let after = ok(search);

    let explain = &after[0]["explain"];
    assert_eq!(find_value(explain, K1_DESCRIPTION), Some(2.0));
    assert_eq!(find_value(explain, B_DESCRIPTION), Some(0.5));
    assert_ne!(before[0]["score"], after[0]["score"]);
}

/// Value of the first explanation node with `description`, depth first.
fn find_value(node: &Value, description: &str) -> Option<f64> {
    if node["description"] == description {
        return node["value"].as_f64();
    }
    node["details"]
        .as_array()?
        .iter()
        .find_map(|detail| find_value(detail, description))
}

#[test]
fn test_null_out_params() {
    let _guard = fresh_bridge();
    let request = br#"{"cmd":"num_docs"}"#;
    let mut count = 7usize;
    let mut ret: *mut JpcBuffer = ptr::null_mut();

    let status =
        unsafe { sarissa_jpc(request.as_ptr(), request.len(), ptr::null_mut(), &mut count) };
    assert_eq!(status, STATUS_INVALID_INPUT);
    assert_eq!(count, 7);

    let status =
        unsafe { sarissa_jpc(request.as_ptr(), request.len(), &mut ret, ptr::null_mut()) };
    assert_eq!(status, STATUS_INVALID_INPUT);
    assert!(ret.is_null());
}

#[test]
fn test_null_message() {
    let _guard = fresh_bridge();
    let mut ret: *mut JpcBuffer = ptr::null_mut();
    let mut count = 0usize;

    let status = unsafe { sarissa_jpc(ptr::null(), 5, &mut ret, &mut count) };
    assert_eq!(status, STATUS_INVALID_INPUT);
    assert_eq!(count, 1);
    unsafe { sarissa_jpc_free(ret, count) };

    let status = unsafe { sarissa_jpc(ptr::null(), 0, &mut ret, &mut count) };
    assert_eq!(status, STATUS_PARSE_ERROR);
    unsafe { sarissa_jpc_free(ret, count) };
}

#[test]
fn test_malformed_requests() {
    let _guard = fresh_bridge();

    let response = call_bytes(b"{\"cmd\": \"search\"");
    assert_eq!(response.status, STATUS_PARSE_ERROR);
    assert_eq!(response.item()["kind"], "parse_error");
    assert_eq!(response.item()["id"], "");

    assert_eq!(call_bytes(&[0xff, 0xfe, 0x00]).status, STATUS_PARSE_ERROR);
    assert_eq!(call_bytes(b"[1, 2]").status, STATUS_PARSE_ERROR);

    let response = call(json!({"id": "m", "cmd": "launch"}));
    assert_eq!(response.status, STATUS_UNKNOWN_COMMAND);
    assert_eq!(response.item()["id"], "m");

    let response = call(json!({"id": "m", "jpc": "1.0", "params": {}}));
    assert_eq!(response.status, STATUS_INVALID_INPUT);

    let response = call(json!({"id": "m", "cmd": "search"}));
    assert_eq!(response.status, STATUS_INVALID_INPUT);

    // Nothing above touched the engine.
    assert!(bridge::is_live());
    let items = ok(json!({"cmd": "num_docs", "id": "m"}));
    assert_eq!(items, vec![json!({"num_docs": 0})]);
}

#[test]
fn test_engine_error_status() {
    let _guard = fresh_bridge();

    let response = call(json!({"id": "e", "cmd": "delete", "field": "title", "term": "x"}));
    assert_eq!(response.status, STATUS_ENGINE_ERROR);
    assert_eq!(response.item()["kind"], "bad_state");
    assert_eq!(response.item()["id"], "e");
}

#[test]
fn test_free_is_safe_on_empty_sets() {
    let _guard = no_bridge();
    unsafe {
        sarissa_jpc_free(ptr::null_mut(), 0);
        sarissa_jpc_free(ptr::null_mut(), 3);
    }
}

#[test]
fn test_buffers_are_released() {
    let _guard = fresh_bridge();
    let baseline = live_buffer_count();

    for round in 0..50 {
        let mut ret: *mut JpcBuffer = ptr::null_mut();
        let mut count = 0usize;
        let request = json!({
            "cmd": "index_document",
            "id": "stress",
            "doc": {"title": format!("title {round}")},
        })
        .to_string();

        let status =
            unsafe { sarissa_jpc(request.as_ptr(), request.len(), &mut ret, &mut count) };
        assert_eq!(status, 0);
        assert_eq!(live_buffer_count(), baseline + count);
        unsafe { sarissa_jpc_free(ret, count) };
        assert_eq!(live_buffer_count(), baseline);
    }

    // Buffers outlive the bridge.
    let request = br#"{"cmd":"num_docs","id":"stress"}"#;
    let mut ret: *mut JpcBuffer = ptr::null_mut();
    let mut count = 0usize;
    unsafe { sarissa_jpc(request.as_ptr(), request.len(), &mut ret, &mut count) };
    assert_eq!(unsafe { term(ptr::null()) }, 0);
    unsafe { sarissa_jpc_free(ret, count) };
    assert_eq!(live_buffer_count(), baseline);
}

#[test]
fn test_buffers_survive_bridge_cycles() {
    let _guard = no_bridge();
    let baseline = live_buffer_count();
    let request = br#"{"cmd":"index_document","id":"cycle","doc":{"title":"Cup of Gold"}}"#;

    for _ in 0..100 {
        assert_eq!(init(), 0);
        let mut ret: *mut JpcBuffer = ptr::null_mut();
        let mut count = 0usize;
        let status =
            unsafe { sarissa_jpc(request.as_ptr(), request.len(), &mut ret, &mut count) };
        assert_eq!(status, STATUS_OK);
        assert_eq!(count, 1);

        assert_eq!(unsafe { term(ptr::null()) }, 0);
        assert_eq!(live_buffer_count(), baseline + 1);
        unsafe { sarissa_jpc_free(ret, count) };
        assert_eq!(live_buffer_count(), baseline);
    }

    let response = call(json!({"cmd": "num_docs", "id": "cycle"}));
    assert_eq!(response.status, STATUS_LIFECYCLE);
    assert_eq!(live_buffer_count(), baseline);
}

#[test]
fn test_concurrent_k_and_b_never_tear() {
    let _guard = fresh_bridge();
    const PAIRS: [(f32, f32); 3] = [(1.2, 0.75), (2.0, 0.1), (0.5, 1.0)];

    ok(json!({"cmd": "index_document", "id": "race", "doc": {"body": "salinas valley salinas"}}));
    ok(json!({"cmd": "index_document", "id": "race", "doc": {"body": "salinas river monterey bay"}}));
    ok(json!({"cmd": "commit", "id": "race"}));
    let search = json!({"cmd": "search", "id": "race", "q": "salinas", "explain": true});

    // Scores of the first hit for each pair, taken without contention.
    let expected: Vec<Value> = PAIRS
        .iter()
        .map(|&(k1, b)| {
            assert_eq!(set_k_and_b(k1, b), 0);
            ok(search.clone())[0]["score"].clone()
        })
        .collect();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..300 {
                let (k1, b) = PAIRS[round % PAIRS.len()];
                assert_eq!(set_k_and_b(k1, b), 0);
            }
        });
        for _ in 0..2 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let hits = ok(search.clone());
                    let explain = &hits[0]["explain"];
                    let k1 = find_value(explain, K1_DESCRIPTION).unwrap();
                    let b = find_value(explain, B_DESCRIPTION).unwrap();
                    let pair = PAIRS
                        .iter()
                        .position(|&(pk, pb)| k1 as f32 == pk && b as f32 == pb)
                        .expect("k1 and b come from one setter call");
                    assert_eq!(hits[0]["score"], expected[pair]);
                }
            });
        }
    });
}
