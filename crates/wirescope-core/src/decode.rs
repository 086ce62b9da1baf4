//! The decode pipeline: raw bytes to rendered messages.
//!
//! Control flow: raw input, optionally SLIP de-framed into message buffers,
//! each buffer optionally snappy-decompressed, then parsed and rendered.
//! Options are plain values threaded by parameter, so decodes with different
//! settings run independently and concurrently.

use crate::error::Result;
use crate::parser::{self, FieldRecord};
use crate::render::{printable_lossy, Rendered, Renderer};
use crate::slip::SlipDeframer;
use crate::snappy;
use bytes::Bytes;
use std::borrow::Cow;
use tracing::debug;

/// Options for one decode invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Add per-field size annotations to tree output
    pub verbose: bool,
    /// Snappy-decompress each message buffer before parsing
    pub snappy: bool,
    /// Treat the input as a SLIP-framed stream
    pub slip: bool,
    /// Reject malformed SLIP escape sequences instead of applying the
    /// permissive fallback
    pub strict_slip: bool,
}

/// One decoded and rendered message
#[derive(Debug, Clone)]
pub struct MessageReport {
    /// Zero-based position in the input stream
    pub index: usize,
    /// The message bytes the parser saw (post de-framing, post decompression)
    pub data: Bytes,
    /// Flat, depth-ordered field records
    pub records: Vec<FieldRecord>,
    /// Annotated hex dump
    pub hex_dump: String,
    /// Indented field tree
    pub tree: String,
}

impl MessageReport {
    /// Best-effort printable preview of the message bytes
    pub fn preview(&self) -> String {
        printable_lossy(&self.data)
    }
}

/// Everything decoded from one input stream
#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    /// Messages in stream order
    pub messages: Vec<MessageReport>,
}

/// Top-level decoder. Stateless between invocations; holds only options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    /// Creates a decoder with the given options
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Decode one raw input stream into rendered messages.
    ///
    /// Fails only on input-level rejection (strict SLIP mode); everything the
    /// parser encounters is classified, truncated, or frame-stopped, never
    /// fatal.
    pub fn decode(&self, input: &[u8]) -> Result<DecodeReport> {
        let buffers: Vec<Bytes> = if self.options.slip {
            let deframer = if self.options.strict_slip {
                SlipDeframer::strict()
            } else {
                SlipDeframer::new()
            };
            let frames = deframer.deframe(input)?;
            debug!(count = frames.len(), "de-framed SLIP stream");
            frames
        } else {
            vec![Bytes::copy_from_slice(input)]
        };

        let mut messages = Vec::with_capacity(buffers.len());
        for (index, buffer) in buffers.into_iter().enumerate() {
            messages.push(self.decode_message(index, buffer));
        }

        Ok(DecodeReport { messages })
    }

    fn decode_message(&self, index: usize, buffer: Bytes) -> MessageReport {
        let data = if self.options.snappy {
            match snappy::decompress(&buffer) {
                Cow::Owned(decompressed) => Bytes::from(decompressed),
                // Fallback path: the buffer goes to the parser unchanged
                Cow::Borrowed(_) => buffer.clone(),
            }
        } else {
            buffer
        };

        let mut records = Vec::new();
        parser::parse(&data, &mut records);
        debug!(index, bytes = data.len(), fields = records.len(), "message parsed");

        let mut renderer = Renderer::new(self.options.verbose);
        for record in &records {
            renderer.push(record);
        }
        let Rendered { hex, tree } = renderer.finish();

        MessageReport {
            index,
            data,
            records,
            hex_dump: hex,
            tree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::FieldContent;
    use crate::slip;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_decode() {
        let decoder = Decoder::new(DecodeOptions::default());
        let report = decoder.decode(&[0x08, 0x96, 0x01]).unwrap();
        assert_eq!(report.messages.len(), 1);
        let message = &report.messages[0];
        assert_eq!(message.records.len(), 1);
        assert_eq!(message.hex_dump, "[08][96][01]");
        assert_eq!(message.records[0].content, FieldContent::Varint(150));
    }

    #[test]
    fn test_slip_pipeline_two_messages() {
        let framed = slip::frame([&[0x08u8, 0x01][..], &[0x10u8, 0x02][..]]);
        let decoder = Decoder::new(DecodeOptions {
            slip: true,
            ..Default::default()
        });
        let report = decoder.decode(&framed).unwrap();
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[0].records[0].field_number, 1);
        assert_eq!(report.messages[1].records[0].field_number, 2);
    }

    #[test]
    fn test_snappy_pipeline() {
        let message = [0x08, 0x92, 0x01];
        let compressed = snap::raw::Encoder::new().compress_vec(&message).unwrap();
        let decoder = Decoder::new(DecodeOptions {
            snappy: true,
            ..Default::default()
        });
        let report = decoder.decode(&compressed).unwrap();
        assert_eq!(report.messages.len(), 1);
        assert_eq!(&report.messages[0].data[..], &message[..]);
        assert_eq!(report.messages[0].records[0].rendered(), "146");
    }

    #[test]
    fn test_snappy_fallback_still_parses() {
        // Not actually compressed: the fallback hands the parser the raw
        // bytes and decoding proceeds
        let decoder = Decoder::new(DecodeOptions {
            snappy: true,
            ..Default::default()
        });
        let report = decoder.decode(&[0x08, 0x01]).unwrap();
        assert_eq!(report.messages[0].records[0].content, FieldContent::Varint(1));
    }

    #[test]
    fn test_slip_then_snappy_per_buffer() {
        let message = [0x08, 0x2a];
        let compressed = snap::raw::Encoder::new().compress_vec(&message).unwrap();
        let framed = slip::frame([&compressed[..]]);
        let decoder = Decoder::new(DecodeOptions {
            slip: true,
            snappy: true,
            ..Default::default()
        });
        let report = decoder.decode(&framed).unwrap();
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].records[0].content, FieldContent::Varint(42));
    }

    #[test]
    fn test_strict_slip_rejects() {
        let input = [slip::DELIMITER, slip::ESCAPE, 0xaa, slip::DELIMITER];
        let decoder = Decoder::new(DecodeOptions {
            slip: true,
            strict_slip: true,
            ..Default::default()
        });
        assert!(decoder.decode(&input).is_err());
    }

    #[test]
    fn test_preview() {
        let decoder = Decoder::new(DecodeOptions::default());
        let report = decoder.decode(&[0x0a, 0x02, b'h', b'i']).unwrap();
        assert_eq!(report.messages[0].preview(), "[0a][02]hi");
    }

    #[test]
    fn test_empty_input() {
        let decoder = Decoder::new(DecodeOptions::default());
        let report = decoder.decode(&[]).unwrap();
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].records.is_empty());
    }
}
