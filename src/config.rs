//! # Configuration Management
//!
//! Protocol constants and the runtime configuration of the stream codec.
//!
//! The wire constants below are fixed by the packet format and are not
//! configurable. [`PacketConfig`] only tunes how [`PacketCodec`](crate::core::codec::PacketCodec)
//! reacts to bad frames and how logging is set up.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - TOML strings via `from_toml()`
//! - Environment overrides via `from_env()`

use crate::error::{constants, PacketError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Maximum payload carried by one packet
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Largest advertised window
pub const MAX_WINDOW: u8 = 31;

/// Largest value the length varint can represent (15 bits)
pub const MAX_VARINT_VALUE: u16 = 0x7FFF;

/// Fixed part of the header: type/TR/window byte, sequence number, timestamp
pub const FIXED_HEADER_SIZE: usize = 6;

/// Size of each CRC-32 field on the wire
pub const CHECKSUM_SIZE: usize = 4;

/// Below this many bytes there is no header at all
pub const MIN_HEADER_SIZE: usize = 7;

/// Below this many bytes the header checksum cannot be present
pub const MIN_PACKET_SIZE: usize = 11;

/// Largest frame the encoder can produce (2-byte varint, full payload)
pub const MAX_PACKET_SIZE: usize = FIXED_HEADER_SIZE + 2 + 2 * CHECKSUM_SIZE + MAX_PAYLOAD_SIZE;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PacketConfig {
    /// Stream codec behaviour
    #[serde(default)]
    pub codec: CodecConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PacketConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            PacketError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_OPEN))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            PacketError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_READ))
        })?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).map_err(|e| {
            PacketError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_PARSE))
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(discard) = std::env::var("TRTP_DISCARD_INVALID") {
            config.codec.discard_invalid = discard.parse::<bool>().map_err(|_| {
                PacketError::ConfigError(format!("Invalid TRTP_DISCARD_INVALID: {discard}"))
            })?;
        }

        if let Ok(size) = std::env::var("TRTP_MAX_PAYLOAD_SIZE") {
            config.codec.max_payload_size = size.parse::<usize>().map_err(|_| {
                PacketError::ConfigError(format!("Invalid TRTP_MAX_PAYLOAD_SIZE: {size}"))
            })?;
        }

        if let Ok(level) = std::env::var("TRTP_LOG_LEVEL") {
            config.logging.log_level = level.parse::<Level>().map_err(|_| {
                PacketError::ConfigError(format!("Invalid log level: {level}"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            PacketError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_SERIALIZE))
        })?;

        std::fs::write(path, content).map_err(|e| {
            PacketError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_WRITE))
        })?;

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.codec.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PacketError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Stream codec configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Drop frames that fail to decode instead of returning the error.
    /// Matches datagram semantics where a corrupted packet is simply ignored.
    pub discard_invalid: bool,

    /// Largest payload accepted from a peer; frames announcing more are
    /// rejected from the header alone. Never above [`MAX_PAYLOAD_SIZE`].
    pub max_payload_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            discard_invalid: false,
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl CodecConfig {
    /// Validate codec configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_payload_size > MAX_PAYLOAD_SIZE {
            errors.push(format!(
                "Max payload size too large: {} bytes (protocol maximum: {MAX_PAYLOAD_SIZE})",
                self.max_payload_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("trtp-codec"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
