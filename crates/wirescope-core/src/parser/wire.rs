//! Wire-type classification and the text heuristic.
//!
//! Each protobuf field starts with a varint tag: the low 3 bits select the
//! wire type, the remaining bits carry the field number. Without a schema the
//! wire type is the only structural information available, so it drives all
//! dispatch in the parser.

/// Protobuf wire types, including the 3-bit values the protocol never
/// assigned.
///
/// Schema-less decoding must not reject unknown values outright; they are
/// carried through and reported as a classification instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// Variable-length integer
    Varint,
    /// 64-bit fixed-width
    Fixed64,
    /// Length-delimited (strings, bytes, embedded messages)
    LengthDelimited,
    /// Start group (deprecated, unsupported)
    GroupStart,
    /// End group (deprecated, unsupported)
    GroupEnd,
    /// 32-bit fixed-width
    Fixed32,
    /// A 3-bit value the protocol never assigned (6 or 7)
    Unknown(u8),
}

impl From<u8> for WireType {
    fn from(value: u8) -> Self {
        match value & 0x07 {
            0 => WireType::Varint,
            1 => WireType::Fixed64,
            2 => WireType::LengthDelimited,
            3 => WireType::GroupStart,
            4 => WireType::GroupEnd,
            5 => WireType::Fixed32,
            other => WireType::Unknown(other),
        }
    }
}

impl WireType {
    /// Short label used in tree output
    pub fn label(&self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "len",
            WireType::GroupStart => "group-start",
            WireType::GroupEnd => "group-end",
            WireType::Fixed32 => "fixed32",
            WireType::Unknown(_) => "unknown",
        }
    }
}

/// Classify a buffer as likely printable text.
///
/// True iff every byte lies in the printable ASCII range `[32, 126]`. An
/// empty buffer is text (vacuously true), which routes zero-length
/// length-delimited fields down the string branch rather than the sub-message
/// branch.
pub fn looks_like_text(input: &[u8]) -> bool {
    input.iter().all(|&byte| (32..=126).contains(&byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_from_tag_bits() {
        assert_eq!(WireType::from(0), WireType::Varint);
        assert_eq!(WireType::from(1), WireType::Fixed64);
        assert_eq!(WireType::from(2), WireType::LengthDelimited);
        assert_eq!(WireType::from(3), WireType::GroupStart);
        assert_eq!(WireType::from(4), WireType::GroupEnd);
        assert_eq!(WireType::from(5), WireType::Fixed32);
        assert_eq!(WireType::from(6), WireType::Unknown(6));
        assert_eq!(WireType::from(7), WireType::Unknown(7));
    }

    #[test]
    fn test_wire_type_masks_high_bits() {
        assert_eq!(WireType::from(0x0a), WireType::LengthDelimited);
    }

    #[test]
    fn test_looks_like_text_full_printable_range() {
        let all: Vec<u8> = (32..=126).collect();
        assert!(looks_like_text(&all));
    }

    #[test]
    fn test_looks_like_text_rejects_boundaries() {
        assert!(!looks_like_text(&[b'h', b'i', 0x00]));
        assert!(!looks_like_text(&[0x7f]));
        assert!(!looks_like_text(&[31]));
        assert!(!looks_like_text(&[127]));
    }

    #[test]
    fn test_looks_like_text_empty_is_text() {
        assert!(looks_like_text(&[]));
    }
}
