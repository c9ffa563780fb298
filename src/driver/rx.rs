//! RxPath — polls the transport and hands frames to pending reads.
//!
//! Matching is by packet type: the read queue is scanned from the head and
//! the earliest read waiting for the frame's type wins. A frame nobody is
//! waiting for is dropped; there is no orphan backlog.

use log::{debug, trace, warn};

use crate::net::frame::{EthernetHeader, HEADER_LEN};
use crate::net::transport::Transport;

use super::context::DriverContext;
use super::request::Transfer;

impl<T: Transport> DriverContext<T> {
    /// One receive wakeup: keepalive tick, then receive until the
    /// transport has nothing left.
    ///
    /// Returns the number of frames pulled off the transport, matched or not.
    pub fn run_rx(&mut self) -> usize {
        self.tick_keepalive();

        let max = self.shared.max_frame_size;
        let mut received = 0;
        loop {
            self.scratch.clear();
            if self.scratch.resize_default(max).is_err() {
                // Unreachable with a validated config.
                warn!("RX: max frame size {} exceeds scratch capacity", max);
                break;
            }

            let polled = self.hw.exclusive(|t| t.receive(&mut self.scratch));
            let len = match polled {
                Ok(Some(n)) => n.min(max),
                Ok(None) => break,
                Err(e) => {
                    warn!("RX: transport receive failed: {:?}", e);
                    break;
                }
            };
            self.scratch.truncate(len);
            received += 1;
            self.deliver();
        }
        received
    }

    /// Advance the keepalive counter; poke the link when it wraps.
    fn tick_keepalive(&mut self) {
        self.keepalive_tick = (self.keepalive_tick + 1) % self.keepalive_interval;
        if self.keepalive_tick != 0 {
            return;
        }
        trace!("RX: keepalive");
        if let Err(e) = self.hw.exclusive(|t| t.keep_alive()) {
            warn!("RX: keepalive failed: {:?}", e);
        }
    }

    /// Complete the earliest read matching the frame in the scratch buffer.
    fn deliver(&self) {
        let Some(hdr) = EthernetHeader::parse(&self.scratch) else {
            debug!("RX: dropping runt frame ({} bytes)", self.scratch.len());
            return;
        };

        let Some(req) = self.shared.reads.take_first(|r| r.packet_type() == hdr.ethertype) else {
            trace!("RX: no reader for type 0x{:04x}, frame dropped", hdr.ethertype);
            return;
        };

        let payload = if req.raw() {
            &self.scratch[..]
        } else {
            &self.scratch[HEADER_LEN..]
        };

        let result = req.adapter().copy_out(req.buffer(), payload).map(|()| Transfer {
            packet_type: hdr.ethertype,
            src: hdr.src,
            dst: hdr.dst,
            data_len: payload.len(),
            raw: req.raw(),
            broadcast: hdr.dst.is_broadcast(),
        });

        match &result {
            Ok(t) => debug!(
                "RX[{}]: {} bytes type=0x{:04x} src={}{}",
                req.id(),
                t.data_len,
                t.packet_type,
                t.src,
                if t.broadcast { " (broadcast)" } else { "" }
            ),
            Err(_) => warn!("RX[{}]: client buffer copy failed", req.id()),
        }
        req.complete(result);
    }
}
