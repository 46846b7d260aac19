//! # Core Packet Components
//!
//! The packet entity, its wire codec and the stream framing built on it.
//!
//! ## Components
//! - **Varint**: 1- or 2-byte encoding of the length field
//! - **Packet**: In-memory packet with validated field setters
//! - **Encoder / Decoder**: Wire serialization with header and payload CRC-32
//! - **Codec**: Tokio codec for framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Type|TR|Window(1)] [Length(1-2)] [Seqnum(1)] [Timestamp(4)] [CRC1(4)] [Payload(N)] [CRC2(4)]
//! ```
//!
//! ## Limits
//! - Maximum payload: 512 bytes
//! - Window: 0..=31
//! - Truncation flag only on `DATA` packets

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod packet;
pub mod varint;
