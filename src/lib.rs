//! # trtp-codec
//!
//! Wire codec for the packets of a sliding-window transport.
//!
//! Each packet carries a type (`DATA`, `ACK`, `NACK`), a truncation flag, an
//! advertised window, a sequence number, a timestamp and up to 512 bytes of
//! payload, protected by two CRC-32 checksums: one over the header and one
//! over the payload. This crate only converts packets to and from bytes;
//! sockets, timers and retransmission belong to the transport using it.
//!
//! ```rust
//! use trtp_codec::{Packet, PacketType};
//!
//! let pkt = Packet::data(16, 3, 4, &[b'1'; 400])?;
//! let wire = pkt.encode()?;
//! assert_eq!(wire.len(), 416);
//!
//! let decoded = Packet::decode(&wire)?;
//! assert_eq!(decoded.packet_type(), Some(PacketType::Data));
//! assert_eq!(decoded.payload(), pkt.payload());
//! # Ok::<(), trtp_codec::PacketError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::codec::PacketCodec;
pub use crate::core::decoder::decode;
pub use crate::core::encoder::encode;
pub use crate::core::packet::{Packet, PacketType};
pub use config::{CodecConfig, LoggingConfig, PacketConfig};
pub use error::{PacketError, Result};
