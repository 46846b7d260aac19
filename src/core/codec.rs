//! # Packet Codec
//!
//! `tokio_util::codec` glue so a transport can read and write packets through
//! `Framed`, `FramedRead`/`FramedWrite` or a datagram framer.
//!
//! Frame boundaries come from the header itself: once the length varint is
//! readable the frame is `header + CRC1 + length + CRC2` bytes, exactly what
//! the encoder emits. A header that cannot be sized (bad type byte, length over
//! [`CodecConfig::max_payload_size`]) is always an error because the stream
//! cannot be resynced.
//! A complete frame that fails to decode is either returned as an error or,
//! with [`CodecConfig::discard_invalid`], logged and dropped.

use crate::config::{CodecConfig, CHECKSUM_SIZE, FIXED_HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::core::packet::{Packet, PacketType};
use crate::core::varint;
use crate::error::{PacketError, Result};
use crate::utils::metrics::global_metrics;
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Framing codec for [`Packet`]s.
#[derive(Debug, Clone, Default)]
pub struct PacketCodec {
    config: CodecConfig,
}

impl PacketCodec {
    /// `max_payload_size` is clamped to [`MAX_PAYLOAD_SIZE`]; no frame can
    /// legally carry more.
    pub fn new(mut config: CodecConfig) -> Self {
        config.max_payload_size = config.max_payload_size.min(MAX_PAYLOAD_SIZE);
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Size of the frame at the front of `src`, or `None` if more bytes are
    /// needed to tell.
    fn frame_len(&self, src: &[u8]) -> Result<Option<usize>> {
        let Some(&first) = src.first() else {
            return Ok(None);
        };
        PacketType::try_from(first >> 6)?;

        let Some(&len_byte) = src.get(1) else {
            return Ok(None);
        };
        let width = varint::width_of(len_byte);
        if src.len() < 1 + width {
            return Ok(None);
        }

        let (length, _) = varint::decode(&src[1..])?;
        if usize::from(length) > self.config.max_payload_size {
            return Err(PacketError::InvalidLength(length));
        }

        Ok(Some(
            FIXED_HEADER_SIZE + width + 2 * CHECKSUM_SIZE + usize::from(length),
        ))
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = PacketError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let metrics = global_metrics();

        loop {
            let frame_len = match self.frame_len(src)? {
                Some(len) if src.len() >= len => len,
                Some(len) => {
                    src.reserve(len - src.len());
                    return Ok(None);
                }
                None => return Ok(None),
            };

            let frame = src.split_to(frame_len);
            match Packet::decode(&frame) {
                Ok(pkt) => {
                    metrics.packet_decoded(frame_len as u64);
                    return Ok(Some(pkt));
                }
                Err(e) => {
                    metrics.decode_failed(&e);
                    if !self.config.discard_invalid {
                        return Err(e);
                    }

                    metrics.frame_discarded();
                    warn!(error = %e, frame_len, "Discarding invalid packet");
                }
            }
        }
    }
}

impl Encoder<&Packet> for PacketCodec {
    type Error = PacketError;

    fn encode(&mut self, item: &Packet, dst: &mut BytesMut) -> Result<()> {
        let written = item.encode_to(dst)?;
        global_metrics().packet_encoded(written as u64);
        Ok(())
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = PacketError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&Packet>::encode(self, &item, dst)
    }
}
