//! # Error Types
//!
//! Every failure the packet codec can report.
//!
//! Field mutators, the encoder and the decoder all return [`Result`]; nothing in
//! the codec panics on malformed input. The variants map one-to-one onto the
//! status kinds a surrounding transport consumes, so a caller can tell a packet
//! that was corrupted in transit (`ChecksumMismatch`) from one that is malformed
//! or adversarial (`InconsistentLength`, `InvalidLength`, ...).
//!
//! ## Example Usage
//! ```rust
//! use trtp_codec::error::{PacketError, Result};
//! use trtp_codec::Packet;
//!
//! fn parse(datagram: &[u8]) -> Result<Packet> {
//!     Packet::decode(datagram)
//! }
//!
//! match parse(&[0u8; 5]) {
//!     Err(PacketError::HeaderTooShort(5)) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants for the ambient (non-codec) failure paths.
pub mod constants {
    pub const ERR_CONFIG_OPEN: &str = "Failed to open config file";
    pub const ERR_CONFIG_READ: &str = "Failed to read config file";
    pub const ERR_CONFIG_PARSE: &str = "Failed to parse TOML";
    pub const ERR_CONFIG_SERIALIZE: &str = "Failed to serialize config";
    pub const ERR_CONFIG_WRITE: &str = "Failed to write config file";
    pub const ERR_LOGGING_INIT: &str = "Failed to initialize logging";
}

// PacketError is the single error type for all codec operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum PacketError {
    #[error("Invalid packet type: {0}")]
    InvalidType(u8),

    #[error("Invalid truncation flag: {0}")]
    InvalidTruncationFlag(u8),

    #[error("Invalid window: {0} (maximum 31)")]
    InvalidWindow(u8),

    #[error("Invalid length field: {0}")]
    InvalidLength(u16),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Packet header too short: {0} bytes")]
    HeaderTooShort(usize),

    #[error("Checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    #[error("Inconsistent length: packet needs {expected} bytes, got {actual}")]
    InconsistentLength { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PacketError {
    /// True for failures that indicate corruption in transit rather than a
    /// malformed packet.
    pub fn is_corruption(&self) -> bool {
        matches!(self, PacketError::ChecksumMismatch { .. })
    }
}

/// Type alias for Results using PacketError
pub type Result<T> = std::result::Result<T, PacketError>;
