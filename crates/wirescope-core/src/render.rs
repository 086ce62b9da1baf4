//! Text rendering of decoded field records.
//!
//! The renderer turns the flat record stream into two strings: an annotated
//! hex dump (`[xx]` per byte, in input order, each span tagged with a
//! semantic role) and an indented field tree (one line per field). Roles are
//! purely semantic; mapping them to colors or other highlighting is the
//! presentation layer's concern.

use crate::parser::{FieldContent, FieldRecord};
use std::fmt::Write as _;

/// Semantic display role of a byte span or tree value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Field tag varint
    Header,
    /// Length-prefix varint of a length-delimited field
    LengthPrefix,
    /// Varint scalar payload
    Varint,
    /// Fixed-width scalar payload
    Fixed,
    /// Printable text payload
    Text,
    /// Nested message marker (payload bytes render through child records)
    Message,
    /// Deprecated group content
    Unsupported,
    /// Unassigned wire type content
    Unknown,
    /// Content left undecoded
    Opaque,
}

/// A run of bytes sharing one display role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexSpan {
    /// The bytes in this span
    pub bytes: Vec<u8>,
    /// Their shared role
    pub role: Role,
}

/// The two accumulated output strings of one rendered message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Annotated hex dump, `[xx]` per byte in input order
    pub hex: String,
    /// Indented field tree, one line per field
    pub tree: String,
}

/// Accumulates hex-dump and tree strings from the records a parse emits.
///
/// Exclusive to one top-level parse; concurrent decodes each build their own.
#[derive(Debug, Clone)]
pub struct Renderer {
    verbose: bool,
    out: Rendered,
}

impl Renderer {
    /// Creates a renderer; verbose mode adds per-field size annotation lines
    /// to the tree
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            out: Rendered::default(),
        }
    }

    /// Render one record, appending to both accumulated strings
    pub fn push(&mut self, record: &FieldRecord) {
        push_hex(&mut self.out.hex, &record.header);
        push_hex(&mut self.out.hex, &record.length_prefix);
        // Nested payload bytes arrive again through the child records; dumping
        // them here would duplicate them
        if record.content != FieldContent::Nested {
            push_hex(&mut self.out.hex, &record.payload);
        }

        let indent = "---".repeat(record.depth);

        if self.verbose {
            let _ = writeln!(
                self.out.tree,
                "{indent} {}b {} bytes",
                record.header.len(),
                record.branch_len
            );
        }

        let _ = writeln!(
            self.out.tree,
            "{indent}{:>3} {}({}) {}",
            record.field_number,
            record.kind_label(),
            record.display_len(),
            record.rendered()
        );
    }

    /// Consume the renderer, returning the accumulated output
    pub fn finish(self) -> Rendered {
        self.out
    }
}

/// Break a record stream into role-tagged hex spans, in input byte order.
///
/// For consumers that want to apply their own highlighting instead of the
/// pre-built dump string.
pub fn hex_spans(records: &[FieldRecord]) -> Vec<HexSpan> {
    let mut spans = Vec::new();

    for record in records {
        spans.push(HexSpan {
            bytes: record.header.clone(),
            role: Role::Header,
        });
        if !record.length_prefix.is_empty() {
            spans.push(HexSpan {
                bytes: record.length_prefix.clone(),
                role: Role::LengthPrefix,
            });
        }
        if record.content != FieldContent::Nested {
            spans.push(HexSpan {
                bytes: record.payload.clone(),
                role: payload_role(record),
            });
        }
    }

    spans
}

fn payload_role(record: &FieldRecord) -> Role {
    match record.content {
        FieldContent::Varint(_) => Role::Varint,
        FieldContent::Fixed(_) => Role::Fixed,
        FieldContent::Text(_) => Role::Text,
        FieldContent::Nested => Role::Message,
        FieldContent::Opaque => Role::Opaque,
        FieldContent::Unsupported => Role::Unsupported,
        FieldContent::Unknown(_) => Role::Unknown,
    }
}

/// Render bytes as best-effort text: printable ASCII passes through,
/// everything else appears as `[xx]`.
pub fn printable_lossy(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());

    for &byte in input {
        if (32..=126).contains(&byte) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "[{byte:02x}]");
        }
    }

    out
}

fn push_hex(out: &mut String, bytes: &[u8]) {
    for byte in bytes {
        let _ = write!(out, "[{byte:02x}]");
    }
}
