//! SLIP de-framing for byte streams.
//!
//! SLIP (Serial Line Internet Protocol) framing bounds each message with a
//! delimiter byte. To carry the delimiter inside a message it is replaced by a
//! two-byte escape sequence, and the escape byte itself is escaped the same
//! way:
//!
//! - `0xc0` (delimiter) is encoded as `0xdb 0xdc`
//! - `0xdb` (escape) is encoded as `0xdb 0xdd`
//!
//! The permissive decoder matches the wire behavior of existing tooling
//! bit-for-bit: *any* escaped byte other than `0xdc` unescapes to `0xdb`,
//! including bytes that are plausibly corruption. Strict mode rejects such
//! sequences instead.

use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

/// Frame delimiter byte
pub const DELIMITER: u8 = 0xc0;
/// Escape introducer byte
pub const ESCAPE: u8 = 0xdb;
/// Escaped form of the delimiter (`0xdb 0xdc` decodes to `0xc0`)
pub const ESCAPED_DELIMITER: u8 = 0xdc;
/// Escaped form of the escape byte (`0xdb 0xdd` decodes to `0xdb`)
pub const ESCAPED_ESCAPE: u8 = 0xdd;

/// Structural role of one input byte, for diagnostic rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRole {
    /// Payload byte copied through unchanged
    Literal,
    /// Frame delimiter
    Delimiter,
    /// Escape introducer
    Escape,
    /// Byte following an escape that decodes to the delimiter
    EscapedDelimiter,
    /// Byte following an escape that decodes to the escape byte
    EscapedEscape,
}

/// Splits a raw byte stream into delimiter-bounded message buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlipDeframer {
    strict: bool,
}

impl SlipDeframer {
    /// Creates a permissive deframer (compatibility fallback for malformed
    /// escape sequences)
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Creates a strict deframer that rejects malformed escape sequences
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// De-frame `input` into zero or more message buffers, in stream order.
    ///
    /// One buffer is produced per delimiter-bounded non-empty region;
    /// consecutive delimiters and bytes after the final delimiter produce
    /// nothing. In permissive mode this never fails: an unrecognized escaped
    /// byte decodes to the escape byte, and a trailing escape with no
    /// following byte is dropped.
    pub fn deframe(&self, input: &[u8]) -> Result<Vec<Bytes>> {
        let mut frames = Vec::new();
        let mut collector = BytesMut::new();
        let mut i = 0;

        while i < input.len() {
            match input[i] {
                DELIMITER => {
                    if !collector.is_empty() {
                        frames.push(collector.split().freeze());
                    }
                }
                ESCAPE => {
                    let Some(&next) = input.get(i + 1) else {
                        if self.strict {
                            return Err(Error::dangling_escape(i));
                        }
                        warn!(
                            offset = i,
                            "input ends inside a SLIP escape sequence; dropping escape byte"
                        );
                        break;
                    };
                    match next {
                        ESCAPED_DELIMITER => collector.put_u8(DELIMITER),
                        ESCAPED_ESCAPE => collector.put_u8(ESCAPE),
                        other => {
                            if self.strict {
                                return Err(Error::invalid_escape(i, other));
                            }
                            // Compatibility fallback: unrecognized escaped
                            // bytes decode to the escape byte, the same as a
                            // proper escaped-escape. Possibly a corrupted
                            // stream, so it gets a warning rather than
                            // silence.
                            warn!(
                                offset = i,
                                byte = other,
                                "unrecognized SLIP escape; decoding as escape byte"
                            );
                            collector.put_u8(ESCAPE);
                        }
                    }
                    i += 1;
                }
                byte => collector.put_u8(byte),
            }
            i += 1;
        }

        if !collector.is_empty() {
            debug!(
                bytes = collector.len(),
                "discarding unterminated region after final delimiter"
            );
        }

        Ok(frames)
    }
}

/// Annotate each input byte with its structural role.
///
/// Side channel for diagnostic rendering; does not decode anything.
pub fn annotate(input: &[u8]) -> Vec<ByteRole> {
    let mut roles = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            DELIMITER => roles.push(ByteRole::Delimiter),
            ESCAPE => {
                roles.push(ByteRole::Escape);
                if let Some(&next) = input.get(i + 1) {
                    roles.push(if next == ESCAPED_DELIMITER {
                        ByteRole::EscapedDelimiter
                    } else {
                        ByteRole::EscapedEscape
                    });
                    i += 1;
                }
            }
            _ => roles.push(ByteRole::Literal),
        }
        i += 1;
    }

    roles
}

/// Escape and frame each payload, delimiting every message on both sides.
///
/// Companion encoder to [`SlipDeframer::deframe`]; used to build fixtures and
/// round-trip tests.
pub fn frame<I, B>(payloads: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut out = Vec::new();

    for payload in payloads {
        out.push(DELIMITER);
        for &byte in payload.as_ref() {
            match byte {
                DELIMITER => out.extend_from_slice(&[ESCAPE, ESCAPED_DELIMITER]),
                ESCAPE => out.extend_from_slice(&[ESCAPE, ESCAPED_ESCAPE]),
                _ => out.push(byte),
            }
        }
        out.push(DELIMITER);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deframe_two_messages() {
        let input = [DELIMITER, 1, 2, 3, DELIMITER, 4, 5, DELIMITER];
        let frames = SlipDeframer::new().deframe(&input).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][..], &[1, 2, 3]);
        assert_eq!(&frames[1][..], &[4, 5]);
    }

    #[test]
    fn test_deframe_consecutive_delimiters() {
        let input = [DELIMITER, DELIMITER, 7, DELIMITER, DELIMITER];
        let frames = SlipDeframer::new().deframe(&input).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[7]);
    }

    #[test]
    fn test_deframe_unescapes() {
        let input = [
            DELIMITER,
            ESCAPE,
            ESCAPED_DELIMITER,
            ESCAPE,
            ESCAPED_ESCAPE,
            9,
            DELIMITER,
        ];
        let frames = SlipDeframer::new().deframe(&input).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[DELIMITER, ESCAPE, 9]);
    }

    #[test]
    fn test_deframe_unrecognized_escape_fallback() {
        // Anything escaped other than 0xdc decodes to 0xdb, preserved for
        // compatibility with existing streams
        let input = [DELIMITER, ESCAPE, 0xaa, 1, DELIMITER];
        let frames = SlipDeframer::new().deframe(&input).unwrap();
        assert_eq!(&frames[0][..], &[ESCAPE, 1]);
    }

    #[test]
    fn test_deframe_dangling_escape_dropped() {
        let input = [DELIMITER, 1, DELIMITER, 2, ESCAPE];
        let frames = SlipDeframer::new().deframe(&input).unwrap();
        // The trailing region was never closed, so the collected byte after
        // the dropped escape produces no frame
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[1]);
    }

    #[test]
    fn test_deframe_discards_unterminated_tail() {
        let input = [DELIMITER, 1, DELIMITER, 2, 3];
        let frames = SlipDeframer::new().deframe(&input).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[1]);
    }

    #[test]
    fn test_strict_rejects_invalid_escape() {
        let input = [DELIMITER, ESCAPE, 0xaa, DELIMITER];
        let err = SlipDeframer::strict().deframe(&input).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEscape {
                offset: 1,
                byte: 0xaa
            }
        ));
    }

    #[test]
    fn test_strict_rejects_dangling_escape() {
        let input = [DELIMITER, 1, ESCAPE];
        let err = SlipDeframer::strict().deframe(&input).unwrap_err();
        assert!(matches!(err, Error::DanglingEscape { offset: 2 }));
    }

    #[test]
    fn test_strict_accepts_well_formed() {
        let input = frame([&[DELIMITER, ESCAPE, 0x41][..]]);
        let frames = SlipDeframer::strict().deframe(&input).unwrap();
        assert_eq!(&frames[0][..], &[DELIMITER, ESCAPE, 0x41]);
    }

    #[test]
    fn test_frame_deframe_idempotence() {
        let payloads: [&[u8]; 6] = [
            b"hello",
            &[DELIMITER, DELIMITER, DELIMITER],
            &[ESCAPE, ESCAPE],
            &[ESCAPE, DELIMITER, ESCAPE, DELIMITER],
            &[0x00, 0x7f, 0xff],
            &[ESCAPED_DELIMITER, ESCAPED_ESCAPE],
        ];
        for payload in payloads {
            let framed = frame([payload]);
            let frames = SlipDeframer::new().deframe(&framed).unwrap();
            assert_eq!(frames.len(), 1, "payload {payload:02x?}");
            assert_eq!(&frames[0][..], payload);
        }
    }

    #[test]
    fn test_frame_deframe_empty_payload() {
        // An empty payload frames to two adjacent delimiters, which deframe
        // back to nothing
        let framed = frame([&[][..]]);
        assert_eq!(framed, vec![DELIMITER, DELIMITER]);
        let frames = SlipDeframer::new().deframe(&framed).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_frame_multiple_payloads() {
        let framed = frame([&[1u8][..], &[2u8][..]]);
        let frames = SlipDeframer::new().deframe(&framed).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0][..], &[1]);
        assert_eq!(&frames[1][..], &[2]);
    }

    #[test]
    fn test_annotate_roles() {
        let input = [DELIMITER, 1, ESCAPE, ESCAPED_DELIMITER, ESCAPE, 0xaa];
        let roles = annotate(&input);
        assert_eq!(
            roles,
            vec![
                ByteRole::Delimiter,
                ByteRole::Literal,
                ByteRole::Escape,
                ByteRole::EscapedDelimiter,
                ByteRole::Escape,
                ByteRole::EscapedEscape,
            ]
        );
    }

    #[test]
    fn test_annotate_bare_markers_are_literals() {
        // 0xdc / 0xdd only have meaning after an escape byte
        let roles = annotate(&[ESCAPED_DELIMITER, ESCAPED_ESCAPE]);
        assert_eq!(roles, vec![ByteRole::Literal, ByteRole::Literal]);
    }

    #[test]
    fn test_deframe_empty_input() {
        assert!(SlipDeframer::new().deframe(&[]).unwrap().is_empty());
    }
}
