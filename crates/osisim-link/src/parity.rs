use crate::detector::{strip, ErrorDetector};
use crate::error::Result;

/// Even parity over the whole payload.
///
/// The trailer is a single bit, or a full byte whose low (last transmitted)
/// bit carries the parity when `to_byte` is set. Any odd number of flipped bits
/// is detected; an even number goes unnoticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parity {
    to_byte: bool,
}

impl Parity {
    /// Single-bit parity trailer.
    pub fn new() -> Self {
        Self { to_byte: false }
    }

    /// Byte-wide trailer, for byte-oriented framers.
    pub fn byte_wide() -> Self {
        Self { to_byte: true }
    }

    pub fn is_byte_wide(&self) -> bool {
        self.to_byte
    }
}

fn xor_reduce(bits: &[bool]) -> bool {
    bits.iter().fold(false, |acc, &b| acc ^ b)
}

impl ErrorDetector for Parity {
    fn name(&self) -> &'static str {
        "parity"
    }

    fn trailer_size(&self) -> usize {
        if self.to_byte {
            8
        } else {
            1
        }
    }

    fn add_trailer(&self, bits: &[bool]) -> Result<Vec<bool>> {
        let mut out = Vec::with_capacity(bits.len() + self.trailer_size());
        out.extend_from_slice(bits);
        out.resize(bits.len() + self.trailer_size() - 1, false);
        out.push(xor_reduce(bits));
        Ok(out)
    }

    fn check(&self, bits: &[bool]) -> Option<String> {
        if bits.len() < self.trailer_size() {
            return Some(format!(
                "no parity trailer: {} bits received, need at least {}",
                bits.len(),
                self.trailer_size()
            ));
        }
        if xor_reduce(bits) {
            return Some("calculated parity is 1, expected 0".to_string());
        }
        None
    }

    fn remove_trailer(&self, bits: &[bool]) -> Result<Vec<bool>> {
        strip(bits, self.trailer_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{bytes_to_bits, parse_bit_string};

    #[test]
    fn test_single_bit_trailer() {
        let parity = Parity::new();
        let framed = parity.add_trailer(&parse_bit_string("1011").unwrap()).unwrap();
        assert_eq!(framed, parse_bit_string("10111").unwrap());
        assert_eq!(parity.check(&framed), None);
        assert_eq!(
            parity.remove_trailer(&framed).unwrap(),
            parse_bit_string("1011").unwrap()
        );
    }

    #[test]
    fn test_byte_trailer_keeps_parity_in_low_bit() {
        let parity = Parity::byte_wide();
        let payload = bytes_to_bits(b"a");
        let framed = parity.add_trailer(&payload).unwrap();
        assert_eq!(framed.len(), 16);
        assert_eq!(&framed[8..15], &[false; 7]);
        assert!(framed[15]);
        assert_eq!(parity.check(&framed), None);
        assert_eq!(parity.remove_trailer(&framed).unwrap(), payload);
    }

    #[test]
    fn test_single_flip_detected() {
        let parity = Parity::new();
        let framed = parity.add_trailer(&bytes_to_bits(b"Hi")).unwrap();
        for i in 0..framed.len() {
            let mut corrupted = framed.clone();
            corrupted[i] = !corrupted[i];
            assert!(parity.check(&corrupted).is_some(), "flip at {i} missed");
        }
    }

    #[test]
    fn test_double_flip_goes_undetected() {
        let parity = Parity::new();
        let mut framed = parity.add_trailer(&bytes_to_bits(b"Hi")).unwrap();
        framed[0] = !framed[0];
        framed[5] = !framed[5];
        assert_eq!(parity.check(&framed), None);
    }

    #[test]
    fn test_empty_input() {
        let parity = Parity::new();
        assert!(parity.check(&[]).is_some());
        assert!(parity.remove_trailer(&[]).is_err());
        assert_eq!(parity.add_trailer(&[]).unwrap(), vec![false]);
    }
}
