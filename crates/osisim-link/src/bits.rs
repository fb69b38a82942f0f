//! Conversion between byte sequences and individual bits.
//!
//! Bits are modelled as `bool` and every byte expands to 8 of them,
//! most-significant bit first. `bits_to_bytes(&bytes_to_bits(b)) == b` for
//! every byte slice.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LinkError, Result};

/// Unpack bytes into bits, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first.
///
/// Fails with [`LinkError::Misaligned`] unless the bit count is a multiple of 8.
pub fn bits_to_bytes(bits: &[bool]) -> Result<Bytes> {
    if bits.len() % 8 != 0 {
        return Err(LinkError::Misaligned { len: bits.len() });
    }
    let mut out = BytesMut::with_capacity(bits.len() / 8);
    for chunk in bits.chunks_exact(8) {
        out.put_u8(pack_byte(chunk));
    }
    Ok(out.freeze())
}

fn pack_byte(chunk: &[bool]) -> u8 {
    chunk
        .iter()
        .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit))
}

/// Right-pad with zero bits up to the next byte boundary.
pub fn pad_to_byte(bits: &mut Vec<bool>) {
    let rem = bits.len() % 8;
    if rem != 0 {
        bits.resize(bits.len() + 8 - rem, false);
    }
}

/// Drop trailing bits that do not complete a byte.
pub fn truncate_to_byte(bits: &mut Vec<bool>) {
    bits.truncate(bits.len() / 8 * 8);
}

/// Render bits as a `0`/`1` string.
pub fn to_bit_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a `0`/`1` string. Whitespace and `_` separators are ignored.
pub fn parse_bit_string(input: &str) -> Result<Vec<bool>> {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(LinkError::config(format!(
                "invalid bit character {other:?} (expected 0 or 1)"
            ))),
        })
        .collect()
}

/// Text to bits, one byte per UTF-8 code unit.
pub fn text_to_bits(text: &str) -> Vec<bool> {
    bytes_to_bits(text.as_bytes())
}

/// Bits back to text.
///
/// A trailing partial byte is zero-padded, and only ASCII codes below 128 are
/// kept, so corrupted bytes never produce invalid UTF-8.
pub fn bits_to_text(bits: &[bool]) -> String {
    bits.chunks(8)
        .map(|chunk| pack_byte(chunk) << (8 - chunk.len()))
        .filter(|byte| byte.is_ascii())
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_bits_roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let bits = bytes_to_bits(&bytes);
        assert_eq!(bits.len(), 256 * 8);
        assert_eq!(bits_to_bytes(&bits).unwrap().as_ref(), bytes.as_slice());
    }

    #[test]
    fn test_msb_first() {
        let bits = bytes_to_bits(&[0x80, 0x01]);
        assert_eq!(to_bit_string(&bits), "1000000000000001");
    }

    #[test]
    fn test_misaligned_rejected() {
        let err = bits_to_bytes(&[true, false, true]).unwrap_err();
        assert_eq!(err, LinkError::Misaligned { len: 3 });
    }

    #[test]
    fn test_pad_and_truncate() {
        let mut bits = vec![true; 10];
        pad_to_byte(&mut bits);
        assert_eq!(bits.len(), 16);
        assert!(!bits[15]);

        let mut bits = vec![true; 21];
        truncate_to_byte(&mut bits);
        assert_eq!(bits.len(), 16);

        let mut aligned = vec![false; 8];
        pad_to_byte(&mut aligned);
        assert_eq!(aligned.len(), 8);
    }

    #[test]
    fn test_parse_bit_string() {
        assert_eq!(
            parse_bit_string("01 1_0").unwrap(),
            vec![false, true, true, false]
        );
        assert!(parse_bit_string("012").is_err());
    }

    #[test]
    fn test_text_conversion_filters_non_ascii() {
        let bits = text_to_bits("Hi");
        assert_eq!(bits_to_text(&bits), "Hi");

        let mut bits = bytes_to_bits(&[0xC8, b'A']);
        assert_eq!(bits_to_text(&bits), "A");

        // "A" = 01000001; a 7-bit tail is padded with a zero on the right.
        bits = parse_bit_string("0100000").unwrap();
        assert_eq!(bits_to_text(&bits), "@");
    }
}
