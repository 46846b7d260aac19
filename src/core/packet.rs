//! # Packet
//!
//! In-memory representation of one transport packet and its validated field
//! mutators.
//!
//! A packet starts empty (type unset, numeric fields zero, no payload) and is
//! filled one field at a time. Every setter checks its argument and leaves the
//! packet untouched when it fails. Because the truncation flag is only legal on
//! `DATA` packets, set the type before the flag.
//!
//! ```rust
//! use trtp_codec::{Packet, PacketType};
//!
//! let mut pkt = Packet::new();
//! pkt.set_type(PacketType::Data as u8)?;
//! pkt.set_window(16)?;
//! pkt.set_sequence_number(3);
//! pkt.set_payload(b"hello")?;
//! assert_eq!(pkt.length(), 5);
//! # Ok::<(), trtp_codec::PacketError>(())
//! ```

use crate::config::{FIXED_HEADER_SIZE, MAX_PAYLOAD_SIZE, MAX_WINDOW};
use crate::core::varint;
use crate::error::{PacketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Packet kinds carried in the top two bits of byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PacketType {
    Data = 1,
    Ack = 2,
    Nack = 3,
}

impl PacketType {
    /// Wire value of this type
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Data => "DATA",
            PacketType::Ack => "ACK",
            PacketType::Nack => "NACK",
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = PacketError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(PacketType::Data),
            2 => Ok(PacketType::Ack),
            3 => Ok(PacketType::Nack),
            other => Err(PacketError::InvalidType(other)),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single transport packet.
///
/// The payload is owned by the packet; [`Packet::set_payload`] copies its input
/// and the decoder hands back a fresh copy of the bytes it extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    ptype: Option<PacketType>,
    truncated: bool,
    window: u8,
    length: u16,
    seqnum: u8,
    timestamp: u32,
    crc1: u32,
    crc2: u32,
    payload: Option<Vec<u8>>,
}

impl Packet {
    /// Empty packet: no type, zeroed fields, no payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Untruncated `DATA` packet carrying a copy of `payload`.
    pub fn data(window: u8, seqnum: u8, timestamp: u32, payload: &[u8]) -> Result<Self> {
        let mut pkt = Self::with_header(PacketType::Data, window, seqnum, timestamp)?;
        pkt.set_payload(payload)?;
        Ok(pkt)
    }

    /// `ACK` for `seqnum` advertising `window`.
    pub fn ack(window: u8, seqnum: u8, timestamp: u32) -> Result<Self> {
        Self::with_header(PacketType::Ack, window, seqnum, timestamp)
    }

    /// `NACK` for `seqnum` advertising `window`.
    pub fn nack(window: u8, seqnum: u8, timestamp: u32) -> Result<Self> {
        Self::with_header(PacketType::Nack, window, seqnum, timestamp)
    }

    fn with_header(ptype: PacketType, window: u8, seqnum: u8, timestamp: u32) -> Result<Self> {
        let mut pkt = Self::new();
        pkt.set_type(ptype.as_u8())?;
        pkt.set_window(window)?;
        pkt.set_sequence_number(seqnum);
        pkt.set_timestamp(timestamp);
        Ok(pkt)
    }

    // ---- getters ----

    pub fn packet_type(&self) -> Option<PacketType> {
        self.ptype
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Truncation flag as its wire bit (0 or 1)
    pub fn truncated(&self) -> u8 {
        u8::from(self.truncated)
    }

    pub fn window(&self) -> u8 {
        self.window
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn sequence_number(&self) -> u8 {
        self.seqnum
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn crc1(&self) -> u32 {
        self.crc1
    }

    pub fn crc2(&self) -> u32 {
        self.crc2
    }

    /// Payload bytes, or `None` if no payload has been assigned
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Take ownership of the payload, leaving the packet without one.
    pub fn take_payload(&mut self) -> Option<Vec<u8>> {
        self.payload.take()
    }

    /// Header size on the wire: 6 fixed bytes plus the varint width of `length`.
    pub fn header_len(&self) -> Result<usize> {
        Ok(FIXED_HEADER_SIZE + varint::predict_len(self.length)?)
    }

    /// Full encoded size: header, CRC1, payload, CRC2.
    pub fn encoded_len(&self) -> Result<usize> {
        Ok(self.header_len()? + 8 + usize::from(self.length))
    }

    // ---- validated setters ----

    pub fn set_type(&mut self, ptype: u8) -> Result<()> {
        self.ptype = Some(PacketType::try_from(ptype)?);
        Ok(())
    }

    /// Set the truncation flag; only `DATA` packets may be truncated.
    pub fn set_truncated(&mut self, tr: u8) -> Result<()> {
        match tr {
            0 => {}
            1 if self.ptype == Some(PacketType::Data) => {}
            other => return Err(PacketError::InvalidTruncationFlag(other)),
        }
        self.truncated = tr == 1;
        Ok(())
    }

    pub fn set_window(&mut self, window: u8) -> Result<()> {
        if window > MAX_WINDOW {
            return Err(PacketError::InvalidWindow(window));
        }
        self.window = window;
        Ok(())
    }

    pub fn set_length(&mut self, length: u16) -> Result<()> {
        if usize::from(length) > MAX_PAYLOAD_SIZE {
            return Err(PacketError::InvalidLength(length));
        }
        varint::predict_len(length)?;
        self.length = length;
        Ok(())
    }

    pub fn set_sequence_number(&mut self, seqnum: u8) {
        self.seqnum = seqnum;
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    pub fn set_crc1(&mut self, crc1: u32) {
        self.crc1 = crc1;
    }

    pub fn set_crc2(&mut self, crc2: u32) {
        self.crc2 = crc2;
    }

    /// Replace the payload with a copy of `data` and update `length`.
    pub fn set_payload(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_PAYLOAD_SIZE {
            return Err(PacketError::PayloadTooLarge(data.len()));
        }
        // Bounded by MAX_PAYLOAD_SIZE above
        let length = data.len() as u16;
        self.set_length(length)?;
        self.payload = Some(data.to_vec());
        Ok(())
    }
}
