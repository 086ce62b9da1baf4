//! Recursive schema-less decoding of protobuf wire data.
//!
//! The parser reads field after field from an untyped byte buffer, guessing
//! structure as it goes: a length-delimited field whose content is printable
//! ASCII is rendered as text, anything else is tentatively treated as a nested
//! message and recursed into. There is no validation that a nested parse is
//! meaningful; garbage recurses into garbage fields, bounded only by the
//! per-frame iteration cap and by varint failures ending a frame early.
//!
//! ## Bounds
//!
//! Two constants keep adversarial or misaligned input from producing
//! unbounded work:
//!
//! - [`MAX_FIELDS_PER_FRAME`] caps how many fields one nesting level emits.
//!   A corrupted offset can otherwise cascade into an endless run of spurious
//!   fields. Legitimate messages with more fields get truncated output; a
//!   tolerable trade for an inspection tool. Tunable, not a protocol limit.
//! - [`MAX_DEPTH`] caps recursion. Each nesting level consumes at least one
//!   header byte so depth is already bounded by input length, but a hard
//!   ceiling keeps a crafted stream of one-byte headers off the call stack.

mod wire;

use crate::codec::{self, Scalar};
use tracing::{debug, trace};

pub use wire::{looks_like_text, WireType};

/// Maximum fields decoded per parser frame (one frame per nesting level)
pub const MAX_FIELDS_PER_FRAME: usize = 5;

/// Maximum nesting depth before content is reported opaque instead of
/// recursed into
pub const MAX_DEPTH: usize = 64;

/// What a field's content turned out to be, decided at decode time.
///
/// A single `match` over this drives all rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldContent {
    /// Varint scalar value
    Varint(u64),
    /// Fixed-width scalar value (width recorded in the wire type)
    Fixed(u64),
    /// Length-delimited content that passed the text heuristic
    Text(String),
    /// Length-delimited content treated as a nested message; its fields
    /// follow in the record stream at `depth + 1`
    Nested,
    /// Content not decoded further (nesting ceiling reached)
    Opaque,
    /// Deprecated group encoding, recognized but never interpreted
    Unsupported,
    /// Unassigned wire type value
    Unknown(u8),
}

/// One decoded field. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    /// Nesting depth (0 = top level)
    pub depth: usize,
    /// Field number from the tag varint
    pub field_number: u64,
    /// Wire type from the tag varint
    pub wire_type: WireType,
    /// The tag varint bytes
    pub header: Vec<u8>,
    /// Length-prefix varint bytes; empty for non-length-delimited fields
    pub length_prefix: Vec<u8>,
    /// The field's content bytes (truncated when the input ran short)
    pub payload: Vec<u8>,
    /// Content length the field declared or occupies. For length-delimited
    /// fields this is the declared length, which may exceed `payload.len()`
    /// on truncated input.
    pub declared_len: usize,
    /// Bytes that remained in the frame after the header, for verbose
    /// diagnostics
    pub branch_len: usize,
    /// What the content turned out to be
    pub content: FieldContent,
}

impl FieldRecord {
    /// Label describing the decoded kind, as shown in tree output
    pub fn kind_label(&self) -> &'static str {
        match self.content {
            FieldContent::Text(_) => "string",
            FieldContent::Nested => "sub",
            FieldContent::Opaque => "opaque",
            _ => self.wire_type.label(),
        }
    }

    /// Length shown in tree output: the declared length for nested messages,
    /// the actual payload length otherwise
    pub fn display_len(&self) -> usize {
        match self.content {
            FieldContent::Nested => self.declared_len,
            _ => self.payload.len(),
        }
    }

    /// Rendered value: numeric string, decoded text, or an explanatory note
    pub fn rendered(&self) -> String {
        match &self.content {
            FieldContent::Varint(value) | FieldContent::Fixed(value) => value.to_string(),
            FieldContent::Text(text) => text.clone(),
            FieldContent::Nested => String::new(),
            FieldContent::Opaque => "max nesting depth reached".to_string(),
            FieldContent::Unsupported => "unsupported type (deprecated group encoding)".to_string(),
            FieldContent::Unknown(value) => format!("invalid data type ({value})"),
        }
    }
}

/// Parse one message buffer into a flat, depth-ordered record stream.
///
/// Records are appended to `out`, which the caller owns; each top-level parse
/// must use its own accumulator, so concurrent decodes stay independent. The
/// parse itself never fails: every malformation is either a classification in
/// the output or a frame-local early stop.
pub fn parse(input: &[u8], out: &mut Vec<FieldRecord>) {
    parse_frame(input, 0, out);
}

fn parse_frame(input: &[u8], depth: usize, out: &mut Vec<FieldRecord>) {
    let mut branch = input;
    let mut fields = 0;

    while !branch.is_empty() && fields < MAX_FIELDS_PER_FRAME {
        let header = match codec::decode_varint(branch) {
            Ok(scalar) => scalar,
            Err(err) => {
                // Frame-local: stop consuming fields at this depth, leave
                // siblings and ancestors alone
                debug!(depth, %err, "field header is not a valid varint; ending frame");
                return;
            }
        };

        let body = &branch[header.len()..];
        let field_number = header.value >> 3;
        let wire_type = WireType::from((header.value & 0x07) as u8);

        trace!(depth, field_number, ?wire_type, remaining = body.len(), "field header");

        let mut length_prefix: &[u8] = &[];
        let mut nested: Option<&[u8]> = None;

        let (payload, declared_len, content, advance) = match wire_type {
            WireType::Varint => {
                let Ok(scalar) = codec::decode_varint(body) else {
                    debug!(depth, field_number, "varint value ran past end of input; ending frame");
                    return;
                };
                (scalar.raw, scalar.len(), FieldContent::Varint(scalar.value), scalar.len())
            }
            WireType::Fixed64 => fixed_content(body, 8, depth, field_number),
            WireType::Fixed32 => fixed_content(body, 4, depth, field_number),
            WireType::LengthDelimited => {
                let Ok(len_scalar) = codec::decode_varint(body) else {
                    debug!(depth, field_number, "length prefix is not a valid varint; ending frame");
                    return;
                };
                let declared = len_scalar.value as usize;
                let content_start = len_scalar.len();
                let available = body.len().saturating_sub(content_start);
                let taken = declared.min(available);
                if taken < declared {
                    // Tolerated mismatch, not an error: truncate to what is
                    // actually there
                    debug!(
                        depth,
                        field_number, declared, available, "length-delimited content truncated"
                    );
                }
                let payload = &body[content_start..content_start + taken];
                length_prefix = len_scalar.raw;

                let content = if looks_like_text(payload) {
                    FieldContent::Text(String::from_utf8_lossy(payload).into_owned())
                } else if depth + 1 >= MAX_DEPTH {
                    debug!(depth, field_number, "nesting ceiling reached; reporting content opaque");
                    FieldContent::Opaque
                } else {
                    nested = Some(payload);
                    FieldContent::Nested
                };

                // Advance by the declared length even when truncated, which
                // empties the branch and ends the frame
                (payload, declared, content, content_start + declared)
            }
            WireType::GroupStart | WireType::GroupEnd => {
                (body, body.len(), FieldContent::Unsupported, body.len())
            }
            WireType::Unknown(value) => {
                (body, body.len(), FieldContent::Unknown(value), body.len())
            }
        };

        out.push(FieldRecord {
            depth,
            field_number,
            wire_type,
            header: header.raw.to_vec(),
            length_prefix: length_prefix.to_vec(),
            payload: payload.to_vec(),
            declared_len,
            branch_len: body.len(),
            content,
        });

        // Nested content parses before this frame continues, keeping the
        // record stream depth-ordered
        if let Some(content) = nested {
            parse_frame(content, depth + 1, out);
        }

        branch = &body[advance.min(body.len())..];
        fields += 1;
    }
}

/// Decode a fixed-width field body; short input is reported as-is and the
/// branch ends naturally because every remaining byte was consumed.
fn fixed_content<'a>(
    body: &'a [u8],
    width: usize,
    depth: usize,
    field_number: u64,
) -> (&'a [u8], usize, FieldContent, usize) {
    let scalar: Scalar<'a> = codec::decode_fixed(body, width);
    if scalar.len() < width {
        debug!(
            depth,
            field_number,
            width,
            available = scalar.len(),
            "fixed-width field truncated"
        );
    }
    (scalar.raw, scalar.len(), FieldContent::Fixed(scalar.value), scalar.len())
}
