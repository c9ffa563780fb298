//! Mock transport for integration tests.
//!
//! Records every transport call so tests can assert on the exact frames
//! sent and the keepalive cadence without a real controller.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use spinet::driver::context::DriverContext;
use spinet::net::frame::{EthernetHeader, HEADER_LEN, MacAddr};
use spinet::{DriverConfig, Transport};

pub const STATION: MacAddr = MacAddr([0x02, 0x53, 0x50, 0x49, 0x00, 0x01]);
pub const PEER: MacAddr = MacAddr([0x02, 0x53, 0x50, 0x49, 0x00, 0x02]);

pub const ETH_IP: u16 = 0x0800;
pub const ETH_ARP: u16 = 0x0806;
pub const ETH_IPV6: u16 = 0x86dd;

// ── Call log ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLog {
    pub sent: Vec<Vec<u8>>,
    pub inbound: VecDeque<Vec<u8>>,
    pub keepalives: usize,
    pub receive_calls: usize,
    pub fail_sends: bool,
    pub fail_receives: bool,
}

// ── MockTransport ─────────────────────────────────────────────

/// Cloneable handle; every clone shares one log.
#[derive(Clone, Default)]
pub struct MockTransport {
    log: Arc<Mutex<MockLog>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, MockLog> {
        self.log.lock().unwrap()
    }

    /// Queue a frame as if it had arrived from the wire.
    pub fn inject(&self, frame: Vec<u8>) {
        self.log().inbound.push_back(frame);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.log().sent.clone()
    }

    pub fn keepalives(&self) -> usize {
        self.log().keepalives
    }
}

impl Transport for MockTransport {
    type Error = &'static str;

    fn send(&mut self, frame: &[u8]) -> Result<(), &'static str> {
        let mut log = self.log();
        if log.fail_sends {
            return Err("send rejected");
        }
        log.sent.push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, &'static str> {
        let mut log = self.log();
        log.receive_calls += 1;
        if log.fail_receives {
            return Err("receive fault");
        }
        let Some(frame) = log.inbound.pop_front() else {
            return Ok(None);
        };
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        Ok(Some(n))
    }

    fn keep_alive(&mut self) -> Result<(), &'static str> {
        self.log().keepalives += 1;
        Ok(())
    }

    fn local_address(&mut self) -> MacAddr {
        STATION
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Context over a fresh mock, plus a handle to inspect it.
pub fn mock_context() -> (DriverContext<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    let ctx = DriverContext::new(mock.clone(), &DriverConfig::default()).unwrap();
    (ctx, mock)
}

/// Build a wire frame with a header followed by `payload`.
pub fn frame(dst: MacAddr, src: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; HEADER_LEN + payload.len()];
    EthernetHeader { dst, src, ethertype }.write_to(&mut out).unwrap();
    out[HEADER_LEN..].copy_from_slice(payload);
    out
}
