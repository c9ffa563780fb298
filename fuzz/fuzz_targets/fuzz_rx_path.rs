//! Fuzz target: receive path
//!
//! Splits the input into frames and pushes them through a loopback
//! context with a few pending reads. Asserts that nothing panics and
//! that no completion reports more bytes than the frame carried.
//!
//! cargo fuzz run fuzz_rx_path

#![no_main]

use libfuzzer_sys::fuzz_target;
use spinet::driver::context::DriverContext;
use spinet::net::frame::{EthernetHeader, HEADER_LEN, MAX_FRAME_SIZE, MacAddr};
use spinet::{BufferPool, DriverConfig, LoopbackTransport};

fuzz_target!(|data: &[u8]| {
    let Ok(mut ctx) = DriverContext::new(
        LoopbackTransport::new(MacAddr([2, 0, 0, 0, 0, 1])),
        &DriverConfig::default(),
    ) else {
        return;
    };
    let dev = ctx.device();
    let pool = BufferPool::new();
    if dev.open(0, pool.adapter()).is_err() {
        return;
    }

    // First byte picks the types we wait for, the rest is wire traffic.
    let Some((&sel, rest)) = data.split_first() else {
        return;
    };
    let reads: Vec<_> = (0..4u16)
        .filter_map(|i| {
            let ty = 0x0800 + u16::from((sel >> (i * 2)) & 3);
            dev.read(ty, pool.alloc(), i % 2 == 0).ok()
        })
        .collect();

    for chunk in rest.split(|&b| b == 0x7e) {
        if let Some(hdr) = EthernetHeader::parse(chunk) {
            assert_eq!(hdr.ethertype, u16::from_be_bytes([chunk[12], chunk[13]]));
        } else {
            assert!(chunk.len() < HEADER_LEN);
        }
        ctx.transport_mut().inject(chunk);
    }
    ctx.run_rx();

    for h in reads {
        if let Some(Ok(t)) = h.try_result() {
            assert!(t.data_len <= MAX_FRAME_SIZE + HEADER_LEN);
        }
    }
});
