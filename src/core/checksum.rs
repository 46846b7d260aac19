//! CRC-32 helpers for the header and payload checksums.
//!
//! Both checksums are the IEEE CRC-32 (the zlib `crc32` polynomial).

use crc32fast::Hasher;

/// Bit position of the truncation flag in byte 0 of the header.
pub(crate) const TRUNCATED_BIT: u8 = 0x20;

/// CRC-32 over `data`.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Header checksum: CRC-32 over `header` with the truncation bit of byte 0
/// forced to zero. The input slice itself is not modified.
pub fn header_crc(header: &[u8]) -> u32 {
    let Some((&first, rest)) = header.split_first() else {
        return crc32(header);
    };

    let mut hasher = Hasher::new();
    hasher.update(&[first & !TRUNCATED_BIT]);
    hasher.update(rest);
    hasher.finalize()
}
