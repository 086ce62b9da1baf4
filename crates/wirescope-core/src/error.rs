//! Error types for the wirescope-core library.
//!
//! Most decode problems are deliberately *not* errors: truncated
//! length-delimited content, unknown wire types, and failed decompression are
//! tolerated classifications embedded in the output (the tool is a best-effort
//! debugging aid). The variants here cover the few conditions that abort a
//! parser frame or, in strict mode, reject an input stream.

use thiserror::Error;

/// Result type alias for wirescope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wirescope decoding operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A varint ran past the available input without a terminating byte
    #[error("malformed varint at offset {offset}: no terminating byte before end of input")]
    MalformedVarint {
        /// Byte offset where decoding gave up
        offset: usize,
    },

    /// Strict SLIP mode: an escape byte was followed by an unrecognized byte
    #[error("invalid SLIP escape at offset {offset}: 0xdb followed by {byte:#04x}")]
    InvalidEscape {
        /// Offset of the escape byte
        offset: usize,
        /// The unrecognized byte that followed it
        byte: u8,
    },

    /// Strict SLIP mode: the input ended in the middle of an escape sequence
    #[error("dangling SLIP escape at offset {offset}: input ends mid-sequence")]
    DanglingEscape {
        /// Offset of the trailing escape byte
        offset: usize,
    },

    /// Unexpected internal fault, reported with enough context to reproduce
    #[error("internal error at depth {depth}, offset {offset}: {details}")]
    Internal {
        /// Nesting depth of the parser frame that faulted
        depth: usize,
        /// Byte offset within the message buffer
        offset: usize,
        /// Description of the fault
        details: String,
    },
}

impl Error {
    /// Creates a new malformed varint error
    pub fn malformed_varint(offset: usize) -> Self {
        Self::MalformedVarint { offset }
    }

    /// Creates a new invalid escape error
    pub fn invalid_escape(offset: usize, byte: u8) -> Self {
        Self::InvalidEscape { offset, byte }
    }

    /// Creates a new dangling escape error
    pub fn dangling_escape(offset: usize) -> Self {
        Self::DanglingEscape { offset }
    }

    /// Creates a new internal error
    pub fn internal(depth: usize, offset: usize, details: impl Into<String>) -> Self {
        Self::Internal {
            depth,
            offset,
            details: details.into(),
        }
    }

    /// Returns true if this error only terminates the current parser frame,
    /// leaving sibling and ancestor frames intact
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::MalformedVarint { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed_varint(12);
        assert!(err.to_string().contains("offset 12"));

        let err = Error::invalid_escape(3, 0xaa);
        assert!(err.to_string().contains("0xaa"));
    }

    #[test]
    fn test_is_frame_local() {
        assert!(Error::malformed_varint(0).is_frame_local());
        assert!(!Error::dangling_escape(0).is_frame_local());
    }
}
