//! Snappy decompression with pass-through fallback.
//!
//! Wire captures are sometimes snappy-compressed and sometimes not, and the
//! caller often does not know which. Decompression failure is therefore fully
//! recovered here: the original bytes are passed through unchanged so the
//! parser can still take a best-effort look at them.

use std::borrow::Cow;
use tracing::{debug, warn};

/// Decompress `input` as a raw snappy block.
///
/// Returns the decompressed bytes on success, or the input unchanged on any
/// decompression error. Never fails.
pub fn decompress(input: &[u8]) -> Cow<'_, [u8]> {
    match snap::raw::Decoder::new().decompress_vec(input) {
        Ok(output) => {
            debug!(
                compressed = input.len(),
                decompressed = output.len(),
                "snappy block decompressed"
            );
            Cow::Owned(output)
        }
        Err(err) => {
            warn!(%err, "failed to parse stream as snappy-compressed; passing bytes through");
            Cow::Borrowed(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let payload = b"the quick brown fox jumps over the lazy dog, twice over";
        let compressed = snap::raw::Encoder::new().compress_vec(payload).unwrap();
        let output = decompress(&compressed);
        assert_eq!(&output[..], &payload[..]);
        assert!(matches!(output, Cow::Owned(_)));
    }

    #[test]
    fn test_fallback_on_garbage() {
        // Claims 6 decompressed bytes, then an unsupported legacy copy tag
        let garbage = [0x06, 0xff, 0xfe, 0xfd, 0xfc];
        let output = decompress(&garbage);
        assert_eq!(&output[..], &garbage[..]);
        assert!(matches!(output, Cow::Borrowed(_)));
    }

    #[test]
    fn test_fallback_on_empty() {
        let output = decompress(&[]);
        assert!(output.is_empty());
    }
}
