use tracing::trace;

use crate::detector::{strip, ErrorDetector};
use crate::error::{LinkError, Result};

/// Default generator polynomial.
pub const DEFAULT_POLY: u64 = 0x8260_8EDB;

/// Default trailer size in bits.
pub const DEFAULT_TRAILER_SIZE: usize = 32;

/// Cyclic redundancy check computed as explicit bit-serial polynomial division.
///
/// The register is `trailer_size` bits wide. It is seeded from the first
/// `trailer_size` bits of the buffer; every following bit is shifted in after
/// XOR-ing the generator whenever the register's top bit is set, and one last
/// conditional XOR reduces the result. The trailer is the register value,
/// transmitted MSB first, so dividing payload plus trailer leaves zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc {
    poly: u64,
    trailer_size: usize,
}

impl Crc {
    /// Build a CRC detector.
    ///
    /// `trailer_size` must be 1..=64 and `poly` must fit in it with its top
    /// bit set, which keeps every intermediate register within the trailer width.
    pub fn new(poly: u64, trailer_size: usize) -> Result<Self> {
        if trailer_size == 0 || trailer_size > 64 {
            return Err(LinkError::config(format!(
                "CRC trailer size must be between 1 and 64 bits, got {trailer_size}"
            )));
        }
        if trailer_size < 64 && poly >> trailer_size != 0 {
            return Err(LinkError::config(format!(
                "CRC polynomial {poly:#x} does not fit in {trailer_size} bits"
            )));
        }
        if poly & top_bit(trailer_size) == 0 {
            return Err(LinkError::config(format!(
                "CRC polynomial {poly:#x} must have bit {} set",
                trailer_size - 1
            )));
        }
        Ok(Self { poly, trailer_size })
    }

    pub fn poly(&self) -> u64 {
        self.poly
    }

    /// Remainder of the bit-serial division of `bits` by the generator.
    pub fn remainder(&self, bits: &[bool]) -> u64 {
        let top = top_bit(self.trailer_size);
        let seed_len = self.trailer_size.min(bits.len());

        let mut register = bits[..seed_len]
            .iter()
            .fold(0u64, |acc, &b| (acc << 1) | u64::from(b));

        for &bit in &bits[seed_len..] {
            if register & top != 0 {
                register ^= self.poly;
            }
            register = (register << 1) | u64::from(bit);
        }
        if register & top != 0 {
            register ^= self.poly;
        }
        register
    }
}

impl Default for Crc {
    fn default() -> Self {
        Self {
            poly: DEFAULT_POLY,
            trailer_size: DEFAULT_TRAILER_SIZE,
        }
    }
}

fn top_bit(width: usize) -> u64 {
    1u64 << (width - 1)
}

impl ErrorDetector for Crc {
    fn name(&self) -> &'static str {
        "crc"
    }

    fn trailer_size(&self) -> usize {
        self.trailer_size
    }

    fn add_trailer(&self, bits: &[bool]) -> Result<Vec<bool>> {
        let mut out = Vec::with_capacity(bits.len() + self.trailer_size);
        out.extend_from_slice(bits);
        out.resize(bits.len() + self.trailer_size, false);

        let crc = self.remainder(&out);
        trace!(crc = format_args!("{crc:#x}"), payload_bits = bits.len(), "crc trailer");

        let trailer = &mut out[bits.len()..];
        for (i, slot) in trailer.iter_mut().enumerate() {
            let shift = self.trailer_size - 1 - i;
            *slot = (crc >> shift) & 1 == 1;
        }
        Ok(out)
    }

    fn check(&self, bits: &[bool]) -> Option<String> {
        if bits.len() < self.trailer_size {
            return Some(format!(
                "data must be at least {} bits long, got {}",
                self.trailer_size,
                bits.len()
            ));
        }
        match self.remainder(bits) {
            0 => None,
            crc => Some(format!("CRC is not equal to zero. CRC: {crc:b}b")),
        }
    }

    fn remove_trailer(&self, bits: &[bool]) -> Result<Vec<bool>> {
        strip(bits, self.trailer_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::bytes_to_bits;

    #[test]
    fn test_zero_payload_checks_clean() {
        let crc = Crc::default();
        let framed = crc.add_trailer(&bytes_to_bits(&[0, 0, 0, 0])).unwrap();
        assert_eq!(framed.len(), 64);
        assert_eq!(crc.check(&framed), None);
        assert!(framed[32..].iter().all(|b| !b));
    }

    #[test]
    fn test_roundtrip_various_payloads() {
        let crc = Crc::default();
        for payload in [&b""[..], b"H", b"Hi", b"hello, osisim!", &[0xFF; 40]] {
            let bits = bytes_to_bits(payload);
            let framed = crc.add_trailer(&bits).unwrap();
            assert_eq!(crc.check(&framed), None, "payload {payload:?}");
            assert_eq!(crc.remove_trailer(&framed).unwrap(), bits);
        }
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let crc = Crc::default();
        let framed = crc.add_trailer(&bytes_to_bits(b"Hello")).unwrap();
        for i in 0..framed.len() {
            let mut corrupted = framed.clone();
            corrupted[i] = !corrupted[i];
            assert!(crc.check(&corrupted).is_some(), "flip at {i} missed");
        }
    }

    #[test]
    fn test_small_crc8() {
        let crc = Crc::new(0x87, 8).unwrap();
        let framed = crc.add_trailer(&bytes_to_bits(b"abc")).unwrap();
        assert_eq!(framed.len(), 32);
        assert_eq!(crc.check(&framed), None);
    }

    #[test]
    fn test_short_input_reports_error() {
        let crc = Crc::default();
        assert!(crc.check(&[true; 8]).is_some());
        assert!(crc.remove_trailer(&[true; 8]).is_err());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(Crc::new(0x8260_8EDB, 0).is_err());
        assert!(Crc::new(0x8260_8EDB, 65).is_err());
        assert!(Crc::new(0x1_0000_0000, 32).is_err());
        assert!(Crc::new(0x0260_8EDB, 32).is_err());
        assert!(Crc::new(u64::MAX, 64).is_ok());
    }
}
