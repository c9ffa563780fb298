//! Transport abstraction — the synchronous frame primitive over the bus.
//!
//! One call moves one whole frame. Implementations are not reentrant: the
//! driver serializes every call from its single worker task and wraps each
//! one in a hardware-exclusion section.
//!
//! Concrete implementations:
//! - ENC28J60 over bit-banged SPI (board crate)
//! - [`LoopbackTransport`] for host bring-up and tests

use std::collections::VecDeque;

use super::frame::MacAddr;

/// Frame-oriented transport to the network controller.
pub trait Transport: Send {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Bring up the controller. Called once before the worker starts.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Transmit one complete frame.
    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Receive one frame into `buf` (at most `buf.len()` bytes).
    /// Returns `Ok(None)` when no frame is pending.
    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Poke the link so it does not idle out.
    fn keep_alive(&mut self) -> Result<(), Self::Error>;

    /// Hardware address of the local station.
    fn local_address(&mut self) -> MacAddr;
}

/// A transport that echoes every sent frame back into its receive queue.
pub struct LoopbackTransport {
    address: MacAddr,
    pending: VecDeque<Vec<u8>>,
    sent: usize,
    keepalives: usize,
}

impl LoopbackTransport {
    pub fn new(address: MacAddr) -> Self {
        Self {
            address,
            pending: VecDeque::new(),
            sent: 0,
            keepalives: 0,
        }
    }

    /// Queue a frame as if it had arrived from the wire.
    pub fn inject(&mut self, frame: &[u8]) {
        self.pending.push_back(frame.to_vec());
    }

    pub fn frames_sent(&self) -> usize {
        self.sent
    }

    pub fn keepalives(&self) -> usize {
        self.keepalives
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Transport for LoopbackTransport {
    type Error = ();

    fn send(&mut self, frame: &[u8]) -> Result<(), ()> {
        self.sent += 1;
        self.pending.push_back(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ()> {
        let Some(frame) = self.pending.pop_front() else {
            return Ok(None);
        };
        // Oversized frames are truncated the way the controller's
        // receive buffer would clip them.
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        Ok(Some(n))
    }

    fn keep_alive(&mut self) -> Result<(), ()> {
        self.keepalives += 1;
        Ok(())
    }

    fn local_address(&mut self) -> MacAddr {
        self.address
    }
}
