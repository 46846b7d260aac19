//! # Length Varint
//!
//! The length field is a 15-bit unsigned integer stored in one or two bytes.
//! The top bit of the first byte selects the width:
//!
//! ```text
//! 0xxxxxxx                   value 0..=127
//! 1xxxxxxx xxxxxxxx          value 128..=32767, big-endian, flag bit masked off
//! ```

use crate::config::MAX_VARINT_VALUE;
use crate::error::{PacketError, Result};

/// Width flag in the first byte
const LONG_FORM_FLAG: u8 = 0x80;

/// Largest value that fits the 1-byte form
const SHORT_FORM_MAX: u16 = 0x7F;

/// Number of bytes `value` occupies on the wire.
pub fn predict_len(value: u16) -> Result<usize> {
    if value > MAX_VARINT_VALUE {
        Err(PacketError::InvalidLength(value))
    } else if value > SHORT_FORM_MAX {
        Ok(2)
    } else {
        Ok(1)
    }
}

/// Width announced by the first byte of an encoded varint.
#[inline]
pub fn width_of(first_byte: u8) -> usize {
    if first_byte & LONG_FORM_FLAG == 0 {
        1
    } else {
        2
    }
}

/// Write `value` at the start of `out`, returning the number of bytes written.
pub fn encode(value: u16, out: &mut [u8]) -> Result<usize> {
    let width = predict_len(value)?;
    if out.len() < width {
        return Err(PacketError::BufferTooSmall {
            needed: width,
            available: out.len(),
        });
    }

    if width == 1 {
        out[0] = value as u8 & !LONG_FORM_FLAG;
    } else {
        let bytes = (value | (u16::from(LONG_FORM_FLAG) << 8)).to_be_bytes();
        out[..2].copy_from_slice(&bytes);
    }
    Ok(width)
}

/// Read a varint from the start of `input`, returning `(value, bytes_consumed)`.
pub fn decode(input: &[u8]) -> Result<(u16, usize)> {
    let first = *input.first().ok_or(PacketError::HeaderTooShort(0))?;
    let width = width_of(first);
    if input.len() < width {
        return Err(PacketError::HeaderTooShort(input.len()));
    }

    let value = if width == 1 {
        u16::from(first)
    } else {
        u16::from_be_bytes([first, input[1]]) & MAX_VARINT_VALUE
    };
    Ok((value, width))
}
