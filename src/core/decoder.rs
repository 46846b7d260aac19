//! # Packet Decoder
//!
//! Parses a wire buffer into a [`Packet`]. Decoding is a fixed pipeline and the
//! first failing step ends it; no partially filled packet is ever returned.
//!
//! The header checksum is recomputed with the truncation bit cleared, so a
//! relay may set that bit (after dropping the payload) without invalidating
//! CRC1. Payload and CRC2 are only read for untruncated `DATA` packets.

use crate::config::{CHECKSUM_SIZE, MIN_HEADER_SIZE, MIN_PACKET_SIZE};
use crate::core::checksum::{crc32, header_crc};
use crate::core::packet::{Packet, PacketType};
use crate::core::varint;
use crate::error::{PacketError, Result};
use tracing::{debug, trace};

/// Parse `data` into a packet.
pub fn decode(data: &[u8]) -> Result<Packet> {
    Packet::decode(data)
}

impl Packet {
    /// Parse `data` into a packet, verifying both checksums.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let result = decode_inner(data);
        match &result {
            Ok(pkt) => trace!(
                ptype = ?pkt.packet_type(),
                seqnum = pkt.sequence_number(),
                length = pkt.length(),
                truncated = pkt.is_truncated(),
                "Decoded packet"
            ),
            Err(e) => debug!(error = %e, input_len = data.len(), "Rejected packet"),
        }
        result
    }
}

fn decode_inner(data: &[u8]) -> Result<Packet> {
    if data.len() < MIN_HEADER_SIZE {
        return Err(PacketError::HeaderTooShort(data.len()));
    }
    // Nothing shorter can hold CRC1, whatever the varint width
    if data.len() < MIN_PACKET_SIZE {
        return Err(PacketError::ChecksumMismatch {
            expected: 0,
            computed: 0,
        });
    }

    let mut pkt = Packet::new();

    let first = data[0];
    pkt.set_type(first >> 6)?;
    pkt.set_truncated((first >> 5) & 0x01)?;
    pkt.set_window(first & 0x1F)?;

    let (length, width) = varint::decode(&data[1..])?;
    pkt.set_length(length)?;

    let mut pos = 1 + width;
    let header_end = pos + 5;
    let crc1_end = header_end + CHECKSUM_SIZE;
    if data.len() < crc1_end {
        return Err(PacketError::HeaderTooShort(data.len()));
    }

    pkt.set_sequence_number(data[pos]);
    pos += 1;
    pkt.set_timestamp(read_u32(data, pos));
    pos += 4;
    let crc1 = read_u32(data, pos);
    pkt.set_crc1(crc1);

    // Every offset below comes from the width actually on the wire
    let computed = header_crc(&data[..header_end]);
    if computed != crc1 {
        return Err(PacketError::ChecksumMismatch {
            expected: crc1,
            computed,
        });
    }

    // The encoder only emits the long form for values above 127
    if width != varint::predict_len(length)? {
        return Err(PacketError::InvalidLength(length));
    }

    let length = usize::from(length);
    let expected_size = length + header_end + 2 * CHECKSUM_SIZE;
    if !pkt.is_truncated() && expected_size > data.len() {
        return Err(PacketError::InconsistentLength {
            expected: expected_size,
            actual: data.len(),
        });
    }

    if !pkt.is_truncated() && pkt.packet_type() == Some(PacketType::Data) {
        let payload_start = crc1_end;
        let payload = &data[payload_start..payload_start + length];
        let crc2 = read_u32(data, payload_start + length);

        let computed = crc32(payload);
        if computed != crc2 {
            return Err(PacketError::ChecksumMismatch {
                expected: crc2,
                computed,
            });
        }
        pkt.set_crc2(crc2);
        pkt.set_payload(payload)?;
    }

    Ok(pkt)
}

/// Big-endian u32 at `pos`; callers have already checked the bounds.
fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn sample() -> Packet {
        Packet::data(16, 3, 4, &[b'1'; 400]).unwrap()
    }

    #[test]
    fn test_roundtrip_reference_packet() {
        let original = sample();
        let bytes = original.encode().unwrap();
        assert_eq!(bytes.len(), 416);

        let decoded = decode(&bytes).expect("decode");
        assert_eq!(decoded.packet_type(), Some(PacketType::Data));
        assert_eq!(decoded.window(), 16);
        assert_eq!(decoded.truncated(), 0);
        assert_eq!(decoded.sequence_number(), 3);
        assert_eq!(decoded.timestamp(), 4);
        assert_eq!(decoded.length(), 400);
        assert_eq!(decoded.payload(), original.payload());
        assert_eq!(decoded.crc1(), crc32(&bytes[..8]));
        assert_eq!(decoded.crc2(), crc32(&[b'1'; 400]));
    }

    #[test]
    fn test_short_inputs() {
        assert!(matches!(
            decode(&[0x40; 5]),
            Err(PacketError::HeaderTooShort(5))
        ));
        assert!(matches!(
            decode(&[0x40; 9]),
            Err(PacketError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_untruncated_ack_needs_room_for_crc2() {
        let bytes = Packet::ack(1, 2, 3).unwrap().encode().unwrap();
        let decoded = decode(&bytes[..11]);
        assert!(matches!(
            decoded,
            Err(PacketError::InconsistentLength {
                expected: 15,
                actual: 11
            })
        ));
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.packet_type(), Some(PacketType::Ack));
        assert!(decoded.payload().is_none());
    }

    #[test]
    fn test_long_varint_without_crc1_is_too_short() {
        let bytes = sample().encode().unwrap();
        assert!(matches!(
            decode(&bytes[..11]),
            Err(PacketError::HeaderTooShort(11))
        ));
    }

    #[test]
    fn test_invalid_type_rejected_before_checksum() {
        let mut bytes = sample().encode().unwrap();
        bytes[0] &= 0x3F;
        assert!(matches!(decode(&bytes), Err(PacketError::InvalidType(0))));
    }

    #[test]
    fn test_truncated_ack_rejected() {
        let mut bytes = Packet::ack(1, 2, 3).unwrap().encode().unwrap();
        bytes[0] |= 0x20;
        assert!(matches!(
            decode(&bytes),
            Err(PacketError::InvalidTruncationFlag(1))
        ));
    }

    #[test]
    fn test_length_over_cap_rejected() {
        let mut bytes = sample().encode().unwrap();
        // 0x8201 = long form, value 513
        bytes[1] = 0x82;
        bytes[2] = 0x01;
        assert!(matches!(
            decode(&bytes),
            Err(PacketError::InvalidLength(513))
        ));
    }

    #[test]
    fn test_header_corruption_detected() {
        let bytes = sample().encode().unwrap();
        for idx in 3..12 {
            for bit in 0..8 {
                let mut corrupt = bytes.clone();
                corrupt[idx] ^= 1 << bit;
                assert!(
                    matches!(decode(&corrupt), Err(PacketError::ChecksumMismatch { .. })),
                    "byte {idx} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn test_long_form_flag_flip_on_short_packet() {
        let mut bytes = Packet::ack(4, 3, 9).unwrap().encode().unwrap();
        bytes[1] ^= 0x80;
        assert!(matches!(
            decode(&bytes),
            Err(PacketError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_non_canonical_long_form_rejected() {
        // 0x8005 = long form holding 5, with CRC1 valid over all 8 header bytes
        let mut bytes = vec![0x82, 0x80, 0x05, 7, 0, 0, 0, 9];
        let crc1 = header_crc(&bytes);
        bytes.extend_from_slice(&crc1.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 4]);
        assert!(matches!(decode(&bytes), Err(PacketError::InvalidLength(5))));
    }

    #[test]
    fn test_crc1_covers_whole_long_form_header() {
        // Same frame but CRC1 only over the first 7 bytes: timestamp's last
        // byte would be left unchecked
        let mut bytes = vec![0x82, 0x80, 0x05, 7, 0, 0, 0, 9];
        let crc1 = header_crc(&bytes[..7]);
        bytes.extend_from_slice(&crc1.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 4]);
        assert!(matches!(
            decode(&bytes),
            Err(PacketError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_payload_corruption_detected_for_data() {
        let bytes = sample().encode().unwrap();
        let mut corrupt = bytes.clone();
        corrupt[100] ^= 0x04;
        assert!(matches!(
            decode(&corrupt),
            Err(PacketError::ChecksumMismatch { .. })
        ));

        let mut corrupt = bytes;
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0x80;
        assert!(matches!(
            decode(&corrupt),
            Err(PacketError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_trailing_crc2_ignored_for_ack() {
        let mut bytes = Packet::nack(4, 5, 6).unwrap().encode().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.packet_type(), Some(PacketType::Nack));
        assert_eq!(decoded.crc2(), 0);
    }

    #[test]
    fn test_flipped_truncation_bit_passes_header_crc() {
        let mut bytes = sample().encode().unwrap();
        bytes[0] |= 0x20;
        // Cut the payload off like a relay would
        bytes.truncate(12);

        let decoded = decode(&bytes).unwrap();
        assert!(decoded.is_truncated());
        assert_eq!(decoded.length(), 400);
        assert!(decoded.payload().is_none());
    }

    #[test]
    fn test_short_untruncated_data_is_inconsistent() {
        let bytes = sample().encode().unwrap();
        assert!(matches!(
            decode(&bytes[..415]),
            Err(PacketError::InconsistentLength {
                expected: 416,
                actual: 415
            })
        ));
    }
}
