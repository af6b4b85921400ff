//! Length determinants shared by the DER and OER codecs.
//!
//! Lengths 0–127 are a single octet. Longer lengths are `0x80 | n`
//! followed by `n` minimal big-endian length octets.

use crate::error::DecodeError;

/// Most length octets accepted after a long-form prefix.
const MAX_LENGTH_OCTETS: usize = 8;

/// Append the length determinant for `len` to `out`.
pub(crate) fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = (len as u64).to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

/// Read a length determinant from `buf` starting at `*pos`, advancing `*pos`.
///
/// The returned length is checked against the bytes remaining after the
/// determinant.
pub(crate) fn read_length(buf: &[u8], pos: &mut usize) -> Result<usize, DecodeError> {
    let first = *buf.get(*pos).ok_or(DecodeError::Truncated {
        needed: 1,
        remaining: 0,
    })?;
    *pos += 1;

    let len = if first < 0x80 {
        first as usize
    } else {
        if first == 0x80 {
            return Err(DecodeError::IndefiniteLength);
        }
        if first == 0xff {
            return Err(DecodeError::ReservedLength);
        }
        let n = (first & 0x7f) as usize;
        if n > MAX_LENGTH_OCTETS {
            return Err(DecodeError::UnsupportedLength(n));
        }
        let remaining = buf.len() - *pos;
        if n > remaining {
            return Err(DecodeError::Truncated {
                needed: n,
                remaining,
            });
        }
        let octets = &buf[*pos..*pos + n];
        *pos += n;
        if octets[0] == 0 {
            return Err(DecodeError::NonMinimalLength);
        }
        let value = octets.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        if value < 0x80 {
            return Err(DecodeError::NonMinimalLength);
        }
        usize::try_from(value).map_err(|_| DecodeError::IntegerOverflow(usize::BITS))?
    };

    let remaining = buf.len() - *pos;
    if len > remaining {
        return Err(DecodeError::Truncated {
            needed: len,
            remaining,
        });
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        write_length(&mut out, len);
        out
    }

    #[test]
    fn test_short_form() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(127), vec![0x7f]);
    }

    #[test]
    fn test_long_form_is_minimal() {
        assert_eq!(encoded(128), vec![0x81, 0x80]);
        assert_eq!(encoded(255), vec![0x81, 0xff]);
        assert_eq!(encoded(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encoded(65_536), vec![0x83, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_read_back() {
        for len in [0usize, 1, 127, 128, 300] {
            let mut buf = encoded(len);
            buf.extend(std::iter::repeat(0xaa).take(len));
            let mut pos = 0;
            assert_eq!(read_length(&buf, &mut pos).unwrap(), len);
            assert_eq!(buf.len() - pos, len);
        }
    }

    #[test]
    fn test_rejects_indefinite_and_reserved() {
        let mut pos = 0;
        assert_eq!(
            read_length(&[0x80], &mut pos),
            Err(DecodeError::IndefiniteLength)
        );
        let mut pos = 0;
        assert_eq!(
            read_length(&[0xff], &mut pos),
            Err(DecodeError::ReservedLength)
        );
    }

    #[test]
    fn test_rejects_non_minimal() {
        let mut pos = 0;
        assert_eq!(
            read_length(&[0x81, 0x05, 0, 0, 0, 0, 0], &mut pos),
            Err(DecodeError::NonMinimalLength)
        );
        let mut pos = 0;
        let mut buf = vec![0x82, 0x00, 0x80];
        buf.extend(std::iter::repeat(0).take(128));
        assert_eq!(
            read_length(&buf, &mut pos),
            Err(DecodeError::NonMinimalLength)
        );
    }

    #[test]
    fn test_rejects_overrun() {
        let mut pos = 0;
        assert_eq!(
            read_length(&[0x05, 0x01, 0x02], &mut pos),
            Err(DecodeError::Truncated {
                needed: 5,
                remaining: 2
            })
        );
        let mut pos = 0;
        assert_eq!(
            read_length(&[0x84, 0x01], &mut pos),
            Err(DecodeError::Truncated {
                needed: 4,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_rejects_too_many_length_octets() {
        let mut pos = 0;
        assert_eq!(
            read_length(&[0x89, 1, 1, 1, 1, 1, 1, 1, 1, 1], &mut pos),
            Err(DecodeError::UnsupportedLength(9))
        );
    }

    #[test]
    fn test_empty_buffer() {
        let mut pos = 0;
        assert!(matches!(
            read_length(&[], &mut pos),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
