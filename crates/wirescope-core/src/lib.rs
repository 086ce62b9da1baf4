//! # wirescope-core
//!
//! A library for schema-less decoding of protobuf wire-format data.
//!
//! Given an arbitrary byte stream believed to contain protobuf-encoded
//! messages, this crate recursively recovers field structure (tag numbers,
//! wire types, lengths, nested messages) without a `.proto` definition, and
//! renders the result as an annotated hex dump and an indented field tree.
//! Two wrapper encodings common in captured traffic are understood: snappy
//! block compression and SLIP byte-stuffing.
//!
//! ## Architecture
//!
//! - [`codec`]: varint and fixed-width integer decoding
//! - [`slip`]: SLIP de-framing of byte streams
//! - [`snappy`]: snappy decompression with pass-through fallback
//! - [`parser`]: the recursive wire-format parser and its text heuristic
//! - [`render`]: hex-dump and tree rendering of decoded records
//! - [`decode`]: the pipeline tying the stages together
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```
//! use wirescope_core::{DecodeOptions, Decoder};
//!
//! // A single varint field: tag 1, value 150
//! let decoder = Decoder::new(DecodeOptions::default());
//! let report = decoder.decode(&[0x08, 0x96, 0x01])?;
//!
//! for message in &report.messages {
//!     println!("{}", message.tree);
//! }
//! # Ok::<(), wirescope_core::Error>(())
//! ```
//!
//! Decoding is best-effort by design: truncated content, unknown wire types,
//! and failed decompression are classifications in the output, not errors.
//! The string-vs-submessage distinction is a heuristic and carries no
//! guarantee of correctness.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod codec;
pub mod decode;
pub mod error;
pub mod parser;
pub mod render;
pub mod slip;
pub mod snappy;

// Re-export primary types for convenience
pub use decode::{DecodeOptions, DecodeReport, Decoder, MessageReport};
pub use error::{Error, Result};
pub use parser::{looks_like_text, parse, FieldContent, FieldRecord, WireType};
pub use render::{hex_spans, printable_lossy, HexSpan, Rendered, Renderer, Role};
pub use slip::{ByteRole, SlipDeframer};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
