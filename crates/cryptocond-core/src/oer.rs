//! # OER Primitive Codec
//!
//! Octet strings, variable-length unsigned integers and fixed 16-bit
//! integers for the OER-flavored fulfillment encoding.
//!
//! - **Octet string**: length determinant followed by the raw octets.
//! - **Var-uint**: length determinant followed by the minimal big-endian
//!   octets of the value (a single `0x00` for zero).
//! - **16-bit uint**: exactly two big-endian octets, no length.

use crate::der::{read_unsigned, unsigned_bytes};
use crate::error::DecodeError;
use crate::length::{read_length, write_length};

/// Accumulates OER fields into an in-memory buffer.
#[derive(Debug, Default)]
pub struct OerWriter {
    buf: Vec<u8>,
}

impl OerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_octet_string(&mut self, bytes: &[u8]) -> &mut Self {
        write_length(&mut self.buf, bytes.len());
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_var_u_int(&mut self, value: u64) -> &mut Self {
        let bytes = unsigned_bytes(value);
        self.write_octet_string(&bytes)
    }

    pub fn write_16_bit_u_int(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append bytes that are already OER-encoded (a nested fulfillment).
    pub fn write_encoded(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads OER fields from a borrowed buffer, front to back.
#[derive(Debug, Clone)]
pub struct OerReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> OerReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_octet_string(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = read_length(self.buf, &mut self.pos)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read an octet string that must have exactly `N` octets.
    pub fn read_fixed_octet_string<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_octet_string()?;
        bytes.try_into().map_err(|_| {
            DecodeError::invalid(field, format!("expected {N} bytes, got {}", bytes.len()))
        })
    }

    pub fn read_var_u_int(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.read_octet_string()?;
        read_unsigned(bytes)
    }

    pub fn read_16_bit_u_int(&mut self) -> Result<u16, DecodeError> {
        let remaining = self.remaining();
        if remaining < 2 {
            return Err(DecodeError::Truncated {
                needed: 2,
                remaining,
            });
        }
        let value = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
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
    fn test_octet_string_layout() {
        let mut w = OerWriter::new();
        w.write_octet_string(b"hi");
        assert_eq!(w.into_bytes(), vec![0x02, b'h', b'i']);
    }

    #[test]
    fn test_var_u_int_layout() {
        let mut w = OerWriter::new();
        w.write_var_u_int(0).write_var_u_int(1).write_var_u_int(0x1234);
        assert_eq!(
            w.into_bytes(),
            vec![0x01, 0x00, 0x01, 0x01, 0x02, 0x12, 0x34]
        );
    }

    #[test]
    fn test_16_bit_u_int_layout() {
        let mut w = OerWriter::new();
        w.write_16_bit_u_int(4);
        assert_eq!(w.into_bytes(), vec![0x00, 0x04]);
    }

    #[test]
    fn test_reads_fields_in_order() {
        let mut w = OerWriter::new();
        w.write_16_bit_u_int(3)
            .write_var_u_int(300)
            .write_octet_string(&[9; 130]);
        let bytes = w.into_bytes();

        let mut r = OerReader::new(&bytes);
        assert_eq!(r.read_16_bit_u_int().unwrap(), 3);
        assert_eq!(r.read_var_u_int().unwrap(), 300);
        assert_eq!(r.read_octet_string().unwrap(), &[9; 130][..]);
        r.finish().unwrap();
    }

    #[test]
    fn test_var_u_int_rejects_leading_zero() {
        let mut r = OerReader::new(&[0x02, 0x00, 0x01]);
        assert_eq!(r.read_var_u_int(), Err(DecodeError::NonMinimalInteger));
    }

    #[test]
    fn test_var_u_int_rejects_empty() {
        let mut r = OerReader::new(&[0x00]);
        assert!(r.read_var_u_int().is_err());
    }

    #[test]
    fn test_16_bit_u_int_truncated() {
        let mut r = OerReader::new(&[0x00]);
        assert_eq!(
            r.read_16_bit_u_int(),
            Err(DecodeError::Truncated {
                needed: 2,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_octet_string_overrun() {
        let mut r = OerReader::new(&[0x04, 0x01]);
        assert_eq!(
            r.read_octet_string(),
            Err(DecodeError::Truncated {
                needed: 4,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_fixed_octet_string_length_checked() {
        let mut r = OerReader::new(&[0x02, 0x01, 0x02]);
        assert!(r.read_fixed_octet_string::<3>("key").is_err());
        let mut r = OerReader::new(&[0x02, 0x01, 0x02]);
        assert_eq!(r.read_fixed_octet_string::<2>("key").unwrap(), [1, 2]);
    }
}
