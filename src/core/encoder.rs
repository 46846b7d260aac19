//! # Packet Encoder
//!
//! Serializes a [`Packet`] into its wire form:
//!
//! ```text
//! [type|TR|window (1)] [length varint (1-2)] [seqnum (1)] [timestamp (4)]
//! [CRC1 (4)] [payload (length)] [CRC2 (4)]
//! ```
//!
//! All multi-byte integers are big-endian. Every precondition is checked
//! before the first byte is written, so a failed call leaves the destination
//! untouched.

use crate::config::CHECKSUM_SIZE;
use crate::core::checksum::{crc32, header_crc};
use crate::core::packet::{Packet, PacketType};
use crate::core::varint;
use crate::error::{PacketError, Result};
use bytes::BytesMut;
use tracing::trace;

/// Serialize `packet` into the front of `buf`, returning the bytes written.
pub fn encode(packet: &Packet, buf: &mut [u8]) -> Result<usize> {
    packet.encode_into(buf)
}

impl Packet {
    /// Serialize into the front of `buf`.
    ///
    /// Fails with `BufferTooSmall` if `buf` cannot hold the whole packet.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize> {
        let plan = self.plan()?;
        if buf.len() < plan.total_len {
            return Err(PacketError::BufferTooSmall {
                needed: plan.total_len,
                available: buf.len(),
            });
        }

        buf[0] = plan.first_byte;
        let mut pos = 1;
        pos += varint::encode(self.length(), &mut buf[pos..])?;

        buf[pos] = self.sequence_number();
        pos += 1;
        buf[pos..pos + 4].copy_from_slice(&self.timestamp().to_be_bytes());
        pos += 4;

        let crc1 = header_crc(&buf[..pos]);
        buf[pos..pos + CHECKSUM_SIZE].copy_from_slice(&crc1.to_be_bytes());
        pos += CHECKSUM_SIZE;

        buf[pos..pos + plan.payload.len()].copy_from_slice(plan.payload);
        pos += plan.payload.len();

        let crc2 = crc32(plan.payload);
        buf[pos..pos + CHECKSUM_SIZE].copy_from_slice(&crc2.to_be_bytes());
        pos += CHECKSUM_SIZE;

        debug_assert_eq!(pos, plan.total_len);
        trace!(
            ptype = ?self.packet_type(),
            seqnum = self.sequence_number(),
            length = self.length(),
            crc1,
            crc2,
            "Encoded packet"
        );
        Ok(pos)
    }

    /// Serialize into a freshly allocated, exactly sized buffer.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()?];
        let written = self.encode_into(&mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    /// Append the encoded packet to `dst`, reserving space as needed.
    pub fn encode_to(&self, dst: &mut BytesMut) -> Result<usize> {
        let total_len = self.plan()?.total_len;
        let start = dst.len();
        dst.resize(start + total_len, 0);
        match self.encode_into(&mut dst[start..]) {
            Ok(written) => Ok(written),
            Err(e) => {
                dst.truncate(start);
                Err(e)
            }
        }
    }

    /// Validate everything the wire form depends on and size the output.
    fn plan(&self) -> Result<EncodePlan<'_>> {
        let ptype = self.packet_type().ok_or(PacketError::InvalidType(0))?;
        if self.is_truncated() && ptype != PacketType::Data {
            return Err(PacketError::InvalidTruncationFlag(1));
        }

        let header_len = self.header_len()?;
        let length = usize::from(self.length());
        let payload = match self.payload() {
            Some(bytes) if bytes.len() == length => bytes,
            None if length == 0 => &[],
            other => {
                return Err(PacketError::InconsistentLength {
                    expected: length,
                    actual: other.map_or(0, <[u8]>::len),
                })
            }
        };

        Ok(EncodePlan {
            first_byte: (ptype.as_u8() << 6) | (self.truncated() << 5) | self.window(),
            total_len: header_len + CHECKSUM_SIZE + length + CHECKSUM_SIZE,
            payload,
        })
    }
}

struct EncodePlan<'a> {
    first_byte: u8,
    total_len: usize,
    payload: &'a [u8],
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn sample() -> Packet {
        Packet::data(16, 3, 4, &[b'1'; 400]).unwrap()
    }

    #[test]
    fn test_encoded_size() {
        let bytes = sample().encode().unwrap();
        assert_eq!(bytes.len(), 416);
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample().encode().unwrap();
        // DATA (01), TR 0, window 16
        assert_eq!(bytes[0], 0b0101_0000);
        assert_eq!(&bytes[1..3], &[0x81, 0x90]);
        assert_eq!(bytes[3], 3);
        assert_eq!(&bytes[4..8], &4u32.to_be_bytes());

        let crc1 = u32::from_be_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(crc1, crc32(&bytes[..8]));
        assert!(bytes[12..412].iter().all(|&b| b == b'1'));

        let crc2 = u32::from_be_bytes(bytes[412..416].try_into().unwrap());
        assert_eq!(crc2, crc32(&[b'1'; 400]));
    }

    #[test]
    fn test_empty_payload_still_carries_crc2() {
        let ack = Packet::ack(2, 7, 99).unwrap();
        let bytes = ack.encode().unwrap();
        assert_eq!(bytes.len(), 7 + 4 + 4);
        assert_eq!(&bytes[11..15], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_buffer_too_small_writes_nothing() {
        let mut buf = [0xAAu8; 415];
        assert!(matches!(
            sample().encode_into(&mut buf),
            Err(PacketError::BufferTooSmall {
                needed: 416,
                available: 415
            })
        ));
        assert!(buf.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_oversized_buffer_reports_written() {
        let mut buf = [0u8; 600];
        assert_eq!(encode(&sample(), &mut buf).unwrap(), 416);
    }

    #[test]
    fn test_unset_type_rejected() {
        let pkt = Packet::new();
        assert!(matches!(pkt.encode(), Err(PacketError::InvalidType(0))));
    }

    #[test]
    fn test_length_without_payload_rejected() {
        let mut pkt = Packet::ack(1, 1, 1).unwrap();
        pkt.set_length(10).unwrap();
        assert!(matches!(
            pkt.encode(),
            Err(PacketError::InconsistentLength {
                expected: 10,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_type_change_after_truncation_rejected() {
        let mut pkt = Packet::data(0, 0, 0, b"x").unwrap();
        pkt.set_truncated(1).unwrap();
        pkt.set_type(PacketType::Ack.as_u8()).unwrap();
        assert!(matches!(
            pkt.encode(),
            Err(PacketError::InvalidTruncationFlag(1))
        ));
    }

    #[test]
    fn test_truncated_header_crc_is_masked() {
        let mut pkt = Packet::data(3, 1, 2, b"abc").unwrap();
        let plain = pkt.encode().unwrap();
        pkt.set_truncated(1).unwrap();
        let truncated = pkt.encode().unwrap();

        assert_eq!(truncated[0], plain[0] | 0x20);
        assert_eq!(&truncated[7..11], &plain[7..11]);
    }

    #[test]
    fn test_encode_to_appends() {
        let mut dst = BytesMut::from(&b"prefix"[..]);
        let written = sample().encode_to(&mut dst).unwrap();
        assert_eq!(written, 416);
        assert_eq!(dst.len(), 6 + 416);
        assert_eq!(&dst[..6], b"prefix");
    }

    #[test]
    fn test_encode_to_failure_leaves_buffer() {
        let mut dst = BytesMut::from(&b"keep"[..]);
        assert!(Packet::new().encode_to(&mut dst).is_err());
        assert_eq!(&dst[..], b"keep");
    }
}
