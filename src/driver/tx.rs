//! TxPath — drains the write queue onto the transport.

use log::{debug, warn};

use crate::error::Error;
use crate::net::frame::{EthernetHeader, HEADER_LEN};
use crate::net::transport::Transport;

use super::context::DriverContext;
use super::request::{Completion, IoRequest, Transfer};

impl<T: Transport> DriverContext<T> {
    /// Send every queued write, head first, until the queue is empty.
    ///
    /// Returns the number of frames handed to the transport.
    pub fn run_tx(&mut self) -> usize {
        let mut sent = 0;
        while let Some(req) = self.shared.writes.pop_front() {
            let result = self.transmit(&req);
            if result.is_ok() {
                sent += 1;
            }
            req.complete(result);
        }
        sent
    }

    /// Assemble one frame in the scratch buffer and send it.
    fn transmit(&mut self, req: &IoRequest) -> Completion {
        let len = req.data_len();
        let payload_at = if req.raw() { 0 } else { HEADER_LEN };

        self.scratch.clear();
        self.scratch
            .resize_default(payload_at + len)
            .map_err(|()| Error::MtuExceeded)?;

        if !req.raw() {
            let hdr = EthernetHeader {
                dst: req.dst(),
                src: self.shared.station,
                ethertype: req.packet_type(),
            };
            hdr.write_to(&mut self.scratch);
        }

        if let Err(e) = req.adapter().copy_in(&mut self.scratch[payload_at..], req.buffer()) {
            warn!("TX[{}]: client buffer copy failed", req.id());
            return Err(e);
        }

        self.hw.exclusive(|t| t.send(&self.scratch)).map_err(|e| {
            warn!("TX[{}]: transport send failed: {:?}", req.id(), e);
            Error::GenericWireError
        })?;

        debug!(
            "TX[{}]: {} bytes type=0x{:04x} dst={}{}",
            req.id(),
            self.scratch.len(),
            req.packet_type(),
            req.dst(),
            if req.raw() { " (raw)" } else { "" }
        );

        Ok(Transfer {
            packet_type: req.packet_type(),
            src: self.shared.station,
            dst: req.dst(),
            data_len: len,
            raw: req.raw(),
            broadcast: req.dst().is_broadcast(),
        })
    }
}
