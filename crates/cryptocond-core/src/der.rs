//! # DER Primitive Codec
//!
//! Tag-length-value writing and reading for the DER-flavored encodings:
//! encoded conditions and fingerprint contents. This layer only moves bytes;
//! it never interprets condition semantics.
//!
//! Only low-tag-number identifiers (tag < 31) are produced or accepted.
//! Every crypto-condition tag fits.
//!
//! ## Identifier Octets
//!
//! - `0x30`: universal constructed SEQUENCE.
//! - `0x80 | tag`: context-specific primitive field.
//! - `0xA0 | tag`: context-specific constructed field.

use crate::error::DecodeError;
use crate::length::{read_length, write_length};

/// Identifier octet of a universal constructed SEQUENCE.
pub const SEQUENCE: u8 = 0x30;

const CONTEXT_PRIMITIVE: u8 = 0x80;
const CONTEXT_CONSTRUCTED: u8 = 0xa0;
const LOW_TAG_MASK: u8 = 0x1f;

/// Identifier octet of a context-specific primitive field.
pub fn context_tag(tag: u8) -> u8 {
    debug_assert!(tag < LOW_TAG_MASK, "high tag numbers are not supported");
    CONTEXT_PRIMITIVE | tag
}

/// Identifier octet of a context-specific constructed field.
pub fn context_constructed_tag(tag: u8) -> u8 {
    debug_assert!(tag < LOW_TAG_MASK, "high tag numbers are not supported");
    CONTEXT_CONSTRUCTED | tag
}

/// If `identifier` is a context-specific constructed identifier, its tag number.
pub fn constructed_tag_number(identifier: u8) -> Option<u8> {
    (identifier & !LOW_TAG_MASK == CONTEXT_CONSTRUCTED && identifier & LOW_TAG_MASK != LOW_TAG_MASK)
        .then_some(identifier & LOW_TAG_MASK)
}

// ---------------------------------------------------------------------------
// Integer contents
// ---------------------------------------------------------------------------

/// Minimal two's-complement contents of a non-negative DER INTEGER.
///
/// A leading zero octet is kept only when the high bit of the next octet is
/// set, so the value never reads as negative.
pub fn integer_bytes(value: u64) -> Vec<u8> {
    let mut bytes = unsigned_bytes(value);
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    bytes
}

/// Minimal unsigned big-endian contents. Zero is a single `0x00` octet.
pub fn unsigned_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes
        .iter()
        .take_while(|b| **b == 0)
        .count()
        .min(bytes.len() - 1);
    bytes[start..].to_vec()
}

/// Parse contents produced by [`unsigned_bytes`].
pub fn read_unsigned(contents: &[u8]) -> Result<u64, DecodeError> {
    match contents {
        [] => Err(DecodeError::invalid("integer", "empty contents")),
        [0, _, ..] => Err(DecodeError::NonMinimalInteger),
        c if c.len() > 8 => Err(DecodeError::IntegerOverflow(64)),
        c => Ok(c.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)),
    }
}

// ---------------------------------------------------------------------------
// DerWriter
// ---------------------------------------------------------------------------

/// Accumulates DER elements into an in-memory buffer.
///
/// Writing to memory cannot fail, so none of the methods return `Result`.
#[derive(Debug, Default)]
pub struct DerWriter {
    buf: Vec<u8>,
}

impl DerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an element with an explicit identifier octet.
    pub fn write_encoded(&mut self, identifier: u8, contents: &[u8]) -> &mut Self {
        self.buf.push(identifier);
        write_length(&mut self.buf, contents.len());
        self.buf.extend_from_slice(contents);
        self
    }

    /// Write a context-specific primitive field `[tag] IMPLICIT`.
    pub fn write_tagged_object(&mut self, tag: u8, contents: &[u8]) -> &mut Self {
        self.write_encoded(context_tag(tag), contents)
    }

    /// Write a context-specific constructed field wrapping already-encoded elements.
    pub fn write_tagged_constructed_object(&mut self, tag: u8, contents: &[u8]) -> &mut Self {
        self.write_encoded(context_constructed_tag(tag), contents)
    }

    /// Write a SEQUENCE wrapping already-encoded elements.
    pub fn write_sequence(&mut self, contents: &[u8]) -> &mut Self {
        self.write_encoded(SEQUENCE, contents)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// DerReader
// ---------------------------------------------------------------------------

/// Reads DER elements from a borrowed buffer, front to back.
#[derive(Debug, Clone)]
pub struct DerReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The identifier octet of the next element, without consuming it.
    pub fn peek_identifier(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Read the next element, returning its identifier and contents.
    pub fn read_element(&mut self) -> Result<(u8, &'a [u8]), DecodeError> {
        let identifier = self.peek_identifier().ok_or(DecodeError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        if identifier & LOW_TAG_MASK == LOW_TAG_MASK {
            return Err(DecodeError::invalid(
                "identifier",
                format!("high tag number form 0x{identifier:02x} is not supported"),
            ));
        }
        let mut pos = self.pos + 1;
        let len = read_length(self.buf, &mut pos)?;
        let contents = &self.buf[pos..pos + len];
        self.pos = pos + len;
        Ok((identifier, contents))
    }

    /// Read the next element, requiring the given identifier octet.
    pub fn read_expected(&mut self, identifier: u8) -> Result<&'a [u8], DecodeError> {
        match self.peek_identifier() {
            Some(found) if found != identifier => Err(DecodeError::UnexpectedTag {
                expected: identifier,
                found,
            }),
            _ => self.read_element().map(|(_, contents)| contents),
        }
    }

    /// Read a context-specific primitive field `[tag]`.
    pub fn read_tagged_object(&mut self, tag: u8) -> Result<&'a [u8], DecodeError> {
        self.read_expected(context_tag(tag))
    }

    /// Read a context-specific constructed field `[tag]`.
    pub fn read_tagged_constructed_object(&mut self, tag: u8) -> Result<&'a [u8], DecodeError> {
        self.read_expected(context_constructed_tag(tag))
    }

    /// Read a context-specific primitive field `[tag]` only if it is next.
    pub fn read_optional_tagged_object(&mut self, tag: u8) -> Result<Option<&'a [u8]>, DecodeError> {
        if self.peek_identifier() == Some(context_tag(tag)) {
            self.read_tagged_object(tag).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Require that every byte has been consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_object_layout() {
        let mut w = DerWriter::new();
        w.write_tagged_object(0, b"abc");
        assert_eq!(w.as_bytes(), &[0x80, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_tagged_constructed_layout() {
        let mut w = DerWriter::new();
        w.write_tagged_constructed_object(2, &[0x80, 0x00]);
        assert_eq!(w.as_bytes(), &[0xa2, 0x02, 0x80, 0x00]);
    }

    #[test]
    fn test_sequence_long_form_length() {
        let contents = vec![0u8; 200];
        let mut w = DerWriter::new();
        w.write_sequence(&contents);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..3], &[0x30, 0x81, 200]);
        assert_eq!(bytes.len(), 203);
    }

    #[test]
    fn test_integer_bytes() {
        assert_eq!(integer_bytes(0), vec![0x00]);
        assert_eq!(integer_bytes(1), vec![0x01]);
        assert_eq!(integer_bytes(127), vec![0x7f]);
        assert_eq!(integer_bytes(128), vec![0x00, 0x80]);
        assert_eq!(integer_bytes(256), vec![0x01, 0x00]);
        assert_eq!(integer_bytes(65_535), vec![0x00, 0xff, 0xff]);
        assert_eq!(
            integer_bytes(u64::MAX),
            vec![0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_unsigned_bytes_roundtrip() {
        for v in [0u64, 1, 127, 128, 255, 256, 131_072, u64::MAX] {
            let bytes = unsigned_bytes(v);
            assert_eq!(read_unsigned(&bytes).unwrap(), v);
        }
        assert_eq!(unsigned_bytes(128), vec![0x80]);
        assert_eq!(unsigned_bytes(131_072), vec![0x02, 0x00, 0x00]);
    }

    #[test]
    fn test_read_unsigned_rejects_bad_contents() {
        assert!(read_unsigned(&[]).is_err());
        assert_eq!(read_unsigned(&[0, 1]), Err(DecodeError::NonMinimalInteger));
        assert_eq!(read_unsigned(&[1; 9]), Err(DecodeError::IntegerOverflow(64)));
        assert_eq!(read_unsigned(&[0]).unwrap(), 0);
    }

    #[test]
    fn test_reader_walks_fields() {
        let mut inner = DerWriter::new();
        inner.write_tagged_object(0, &[1, 2]).write_tagged_object(1, &[3]);
        let mut outer = DerWriter::new();
        outer.write_tagged_constructed_object(4, inner.as_bytes());
        let bytes = outer.into_bytes();

        let mut r = DerReader::new(&bytes);
        let (identifier, contents) = r.read_element().unwrap();
        assert_eq!(constructed_tag_number(identifier), Some(4));
        r.finish().unwrap();

        let mut r = DerReader::new(contents);
        assert_eq!(r.read_tagged_object(0).unwrap(), &[1, 2]);
        assert_eq!(r.read_optional_tagged_object(2).unwrap(), None);
        assert_eq!(r.read_tagged_object(1).unwrap(), &[3]);
        r.finish().unwrap();
    }

    #[test]
    fn test_reader_unexpected_tag() {
        let bytes = [0x81, 0x00];
        let mut r = DerReader::new(&bytes);
        assert_eq!(
            r.read_tagged_object(0),
            Err(DecodeError::UnexpectedTag {
                expected: 0x80,
                found: 0x81
            })
        );
    }

    #[test]
    fn test_reader_trailing_bytes() {
        let bytes = [0x80, 0x00, 0xff];
        let mut r = DerReader::new(&bytes);
        r.read_tagged_object(0).unwrap();
        assert_eq!(r.finish(), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_reader_rejects_high_tag_form() {
        let bytes = [0xbf, 0x00];
        let mut r = DerReader::new(&bytes);
        assert!(r.read_element().is_err());
    }

    #[test]
    fn test_constructed_tag_number() {
        assert_eq!(constructed_tag_number(0xa0), Some(0));
        assert_eq!(constructed_tag_number(0xa4), Some(4));
        assert_eq!(constructed_tag_number(0x80), None);
        assert_eq!(constructed_tag_number(0x30), None);
        assert_eq!(constructed_tag_number(0xbf), None);
    }
}
