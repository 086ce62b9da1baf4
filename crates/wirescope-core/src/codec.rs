//! Integer decoding for the protobuf wire format.
//!
//! Two encodings appear on the wire:
//!
//! - **Varint**: base-128, little-endian group order. Each byte contributes its
//!   low 7 bits; the first byte holds the least-significant group; a clear top
//!   bit terminates the sequence.
//! - **Fixed-width**: 4 or 8 bytes, unsigned little-endian.
//!
//! All decoding borrows from the input; nothing is copied.

use crate::error::{Error, Result};

/// Longest legal varint encoding for a 64-bit value (7 bits per byte)
pub const MAX_VARINT_LEN: usize = 10;

/// A decoded unsigned integer together with the exact bytes that encode it.
///
/// `raw` is always a sub-slice of the decode input, so callers can advance
/// past the consumed bytes with `raw.len()` or feed them to a hex dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar<'a> {
    /// Decoded value. A full 64-bit accumulator; `fixed64` values above
    /// 2^32 survive intact.
    pub value: u64,
    /// The bytes that encode `value`, nothing more
    pub raw: &'a [u8],
}

impl Scalar<'_> {
    /// Number of bytes consumed by the decode
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if no bytes were consumed
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Decode a varint from the front of `input`.
///
/// Fails with [`Error::MalformedVarint`] when no terminating byte (top bit
/// clear) appears within the input or within [`MAX_VARINT_LEN`] bytes. A
/// failure here must stop the caller's field loop; silently returning a
/// zero-length scalar would make that loop spin without consuming anything.
pub fn decode_varint(input: &[u8]) -> Result<Scalar<'_>> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in input.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(Error::malformed_varint(i));
        }

        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Ok(Scalar {
                value,
                raw: &input[..=i],
            });
        }
    }

    Err(Error::malformed_varint(input.len()))
}

/// Decode the first `width` bytes of `input` as an unsigned little-endian
/// integer. `width` is 4 or 8 on the wire.
///
/// A short input yields a scalar over whatever bytes are available; callers
/// treat `raw.len() < width` as a truncated field.
pub fn decode_fixed(input: &[u8], width: usize) -> Scalar<'_> {
    let raw = &input[..width.min(input.len())];
    let mut value: u64 = 0;

    // Little-endian: accumulate right to left
    for &byte in raw.iter().rev() {
        value = (value << 8) | u64::from(byte);
    }

    Scalar { value, raw }
}

/// Encode a value as a varint.
///
/// Companion to [`decode_varint`], used to build test fixtures and nested
/// message buffers.
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);

    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}
