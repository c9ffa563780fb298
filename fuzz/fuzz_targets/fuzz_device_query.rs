//! Fuzz target: `DeviceQuery::build` / `encode`
//!
//! The reported sizes must never exceed what the caller offered, and
//! encoding must stay inside the output buffer.
//!
//! cargo fuzz run fuzz_device_query

#![no_main]

use libfuzzer_sys::fuzz_target;
use spinet::net::query::{DeviceQuery, QUERY_SIZE};

fuzz_target!(|input: (u32, u32, u32, u8)| {
    let (size, mtu, bps, out_len) = input;
    let q = DeviceQuery::build(size, mtu, bps);
    assert!(q.size_supplied <= size);
    assert!(q.size_supplied <= QUERY_SIZE);

    let mut out = vec![0u8; usize::from(out_len)];
    let n = q.encode(&mut out);
    assert!(n <= out.len());
});
