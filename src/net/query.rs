//! Device capability descriptor.
//!
//! The caller declares how many bytes of descriptor it can take
//! (`size_available`); every field past the fixed 16-byte prefix is only
//! filled in when it fits.
//!
//! ```text
//!  off  size  field
//!    0    4   size_available
//!    4    4   size_supplied
//!    8    4   format
//!   12    4   device_level
//!   16    2   addr_field_size   (needs >= 18)
//!   18    4   mtu               (needs >= 22)
//!   22    4   bps               (needs >= 26)
//!   26    4   hardware_type     (needs >= 30)
//! ```

use serde::{Deserialize, Serialize};

use super::frame::ADDR_LEN;

/// Full descriptor length.
pub const QUERY_SIZE: u32 = 30;

/// Wire type tag for Ethernet.
pub const WIRE_TYPE_ETHERNET: u32 = 1;

/// Capability descriptor returned by a device query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceQuery {
    pub size_available: u32,
    pub size_supplied: u32,
    pub format: u32,
    pub device_level: u32,
    /// Address width in bits.
    pub addr_field_size: Option<u16>,
    pub mtu: Option<u32>,
    pub bps: Option<u32>,
    pub hardware_type: Option<u32>,
}

impl DeviceQuery {
    /// Fill the descriptor for a caller that can take `size_available` bytes.
    pub fn build(size_available: u32, mtu: u32, bps: u32) -> Self {
        let gate = |min: u32| size_available >= min;
        Self {
            size_available,
            size_supplied: size_available.min(QUERY_SIZE),
            format: 0,
            device_level: 0,
            addr_field_size: gate(18).then_some((ADDR_LEN * 8) as u16),
            mtu: gate(22).then_some(mtu),
            bps: gate(26).then_some(bps),
            hardware_type: gate(30).then_some(WIRE_TYPE_ETHERNET),
        }
    }

    /// Encode into `out` in big-endian wire order.
    ///
    /// Writes at most `size_supplied` bytes and never past `out.len()`.
    /// Returns the number of bytes written.
    pub fn encode(&self, out: &mut [u8]) -> usize {
        let mut wire = [0u8; QUERY_SIZE as usize];
        wire[0..4].copy_from_slice(&self.size_available.to_be_bytes());
        wire[4..8].copy_from_slice(&self.size_supplied.to_be_bytes());
        wire[8..12].copy_from_slice(&self.format.to_be_bytes());
        wire[12..16].copy_from_slice(&self.device_level.to_be_bytes());
        if let Some(bits) = self.addr_field_size {
            wire[16..18].copy_from_slice(&bits.to_be_bytes());
        }
        if let Some(mtu) = self.mtu {
            wire[18..22].copy_from_slice(&mtu.to_be_bytes());
        }
        if let Some(bps) = self.bps {
            wire[22..26].copy_from_slice(&bps.to_be_bytes());
        }
        if let Some(kind) = self.hardware_type {
            wire[26..30].copy_from_slice(&kind.to_be_bytes());
        }

        let n = (self.size_supplied as usize).min(out.len());
        out[..n].copy_from_slice(&wire[..n]);
        n
    }
}
