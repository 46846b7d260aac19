//! Observability and Metrics
//!
//! Counters for packet encode/decode outcomes, updated by
//! [`PacketCodec`](crate::core::codec::PacketCodec).
//!
//! Uses atomic counters for thread-safe metrics collection.

use crate::error::PacketError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Packets successfully encoded
    pub packets_encoded: AtomicU64,
    /// Bytes produced by the encoder
    pub bytes_encoded: AtomicU64,
    /// Packets successfully decoded
    pub packets_decoded: AtomicU64,
    /// Bytes consumed by successful decodes
    pub bytes_decoded: AtomicU64,
    /// Decodes rejected by a CRC1 or CRC2 check
    pub checksum_failures: AtomicU64,
    /// Decodes rejected for short or inconsistent lengths
    pub length_failures: AtomicU64,
    /// Decodes rejected by a field validator
    pub field_failures: AtomicU64,
    /// Frames dropped by a discarding codec
    pub frames_discarded: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            packets_encoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            packets_decoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            checksum_failures: AtomicU64::new(0),
            length_failures: AtomicU64::new(0),
            field_failures: AtomicU64::new(0),
            frames_discarded: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an encoded packet
    pub fn packet_encoded(&self, byte_count: u64) {
        self.packets_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decoded packet
    pub fn packet_decoded(&self, byte_count: u64) {
        self.packets_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a rejected decode, bucketed by cause
    pub fn decode_failed(&self, err: &PacketError) {
        let counter = match err {
            PacketError::ChecksumMismatch { .. } => &self.checksum_failures,
            PacketError::HeaderTooShort(_)
            | PacketError::InconsistentLength { .. }
            | PacketError::InvalidLength(_) => &self.length_failures,
            _ => &self.field_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded frame
    pub fn frame_discarded(&self) {
        self.frames_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_encoded: self.packets_encoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            packets_decoded: self.packets_decoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            length_failures: self.length_failures.load(Ordering::Relaxed),
            field_failures: self.field_failures.load(Ordering::Relaxed),
            frames_discarded: self.frames_discarded.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            packets_encoded = snapshot.packets_encoded,
            bytes_encoded = snapshot.bytes_encoded,
            packets_decoded = snapshot.packets_decoded,
            bytes_decoded = snapshot.bytes_decoded,
            checksum_failures = snapshot.checksum_failures,
            length_failures = snapshot.length_failures,
            field_failures = snapshot.field_failures,
            frames_discarded = snapshot.frames_discarded,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub packets_encoded: u64,
    pub bytes_encoded: u64,
    pub packets_decoded: u64,
    pub bytes_decoded: u64,
    pub checksum_failures: u64,
    pub length_failures: u64,
    pub field_failures: u64,
    pub frames_discarded: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
