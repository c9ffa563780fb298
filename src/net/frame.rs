//! Ethernet frame header.
//!
//! Wire format:
//! ```text
//! ┌──────────────┬──────────────┬──────────┬───────────────┐
//! │ Dest (6B)    │ Source (6B)  │ Type (2B)│ Payload (N B) │
//! │              │              │ BE u16   │               │
//! └──────────────┴──────────────┴──────────┴───────────────┘
//! ```
//!
//! Raw-mode transfers skip this module entirely: the client buffer already
//! holds the whole frame.

use core::fmt;

/// Hardware address length in bytes.
pub const ADDR_LEN: usize = 6;

/// Header size (dest + source + type).
pub const HEADER_LEN: usize = 2 * ADDR_LEN + 2;

/// Largest frame the controller moves in one transfer.
pub const MAX_FRAME_SIZE: usize = 1518;

/// Scratch capacity: a maximal payload plus a synthesized header.
pub const SCRATCH_CAPACITY: usize = MAX_FRAME_SIZE + HEADER_LEN;

/// 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; ADDR_LEN]);

impl MacAddr {
    /// All-ones broadcast address.
    pub const BROADCAST: Self = Self([0xFF; ADDR_LEN]);

    pub const fn is_broadcast(&self) -> bool {
        let mut i = 0;
        while i < ADDR_LEN {
            if self.0[i] != 0xFF {
                return false;
            }
            i += 1;
        }
        true
    }

    pub const fn octets(&self) -> [u8; ADDR_LEN] {
        self.0
    }
}

impl From<[u8; ADDR_LEN]> for MacAddr {
    fn from(octets: [u8; ADDR_LEN]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: MacAddr,
    pub src: MacAddr,
    pub ethertype: u16,
}

impl EthernetHeader {
    /// Parse the header at the start of `frame`.
    ///
    /// Returns `None` for runt frames shorter than [`HEADER_LEN`].
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let hdr = frame.get(..HEADER_LEN)?;
        let mut dst = [0u8; ADDR_LEN];
        let mut src = [0u8; ADDR_LEN];
        dst.copy_from_slice(&hdr[..ADDR_LEN]);
        src.copy_from_slice(&hdr[ADDR_LEN..2 * ADDR_LEN]);
        Some(Self {
            dst: MacAddr(dst),
            src: MacAddr(src),
            ethertype: u16::from_be_bytes([hdr[2 * ADDR_LEN], hdr[2 * ADDR_LEN + 1]]),
        })
    }

    /// Write the header into the first [`HEADER_LEN`] bytes of `out`.
    ///
    /// Returns `None` if `out` is too short.
    pub fn write_to(&self, out: &mut [u8]) -> Option<usize> {
        let hdr = out.get_mut(..HEADER_LEN)?;
        hdr[..ADDR_LEN].copy_from_slice(&self.dst.0);
        hdr[ADDR_LEN..2 * ADDR_LEN].copy_from_slice(&self.src.0);
        hdr[2 * ADDR_LEN..].copy_from_slice(&self.ethertype.to_be_bytes());
        Some(HEADER_LEN)
    }
}
