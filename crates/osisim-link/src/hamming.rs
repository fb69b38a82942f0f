use tracing::{debug, warn};

/// Hamming single-error-correcting code over an arbitrary-length bit sequence.
///
/// Positions are 1-indexed. Parity bits sit at every power-of-two position and
/// data bits fill the remaining positions in their original order. The parity
/// bit at `2^i` covers every position whose index has bit `i` set.
///
/// Only one flipped bit per codeword can be corrected. With two or more flips
/// the syndrome points at the wrong position and the "corrected" codeword is
/// wrong; callers that need stronger guarantees must pair this with a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hamming;

/// Outcome of [`Hamming::correct_errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// The syndrome was zero.
    Clean,
    /// The bit at this 1-indexed position was flipped.
    Flipped(usize),
    /// The syndrome pointed past the end of the codeword; nothing was changed.
    OutOfRange(usize),
}

impl Hamming {
    pub fn new() -> Self {
        Self
    }

    /// Minimum `r` such that `2^r >= data_len + r + 1`.
    pub fn parity_bits_for(data_len: usize) -> usize {
        let mut r = 0usize;
        while (1usize << r) < data_len + r + 1 {
            r += 1;
        }
        r
    }

    /// Interleave parity bits into `data`.
    pub fn add_error_detection(&self, data: &[bool]) -> Vec<bool> {
        let r = Self::parity_bits_for(data.len());
        let n = data.len() + r;
        let mut codeword = vec![false; n];

        let mut data_bits = data.iter();
        for (i, slot) in codeword.iter_mut().enumerate() {
            if !(i + 1).is_power_of_two() {
                if let Some(&bit) = data_bits.next() {
                    *slot = bit;
                }
            }
        }
        for i in 0..r {
            let position = 1usize << i;
            codeword[position - 1] = parity(&codeword, i);
        }
        debug!(data_bits = data.len(), parity_bits = r, "hamming encode");
        codeword
    }

    /// Extract the data bits (every non-power-of-two position), in order.
    pub fn remove_error_detection(&self, codeword: &[bool]) -> Vec<bool> {
        codeword
            .iter()
            .enumerate()
            .filter(|(i, _)| !(i + 1).is_power_of_two())
            .map(|(_, &bit)| bit)
            .collect()
    }

    /// Sum of `2^i` over every parity bit that disagrees with its recomputed value.
    pub fn syndrome(&self, codeword: &[bool]) -> usize {
        let mut syndrome = 0usize;
        let mut i = 0usize;
        while (1usize << i) <= codeword.len() {
            let position = 1usize << i;
            if codeword[position - 1] != parity(codeword, i) {
                syndrome += position;
            }
            i += 1;
        }
        syndrome
    }

    /// `true` if the syndrome is non-zero.
    pub fn check_errors(&self, codeword: &[bool]) -> bool {
        self.syndrome(codeword) != 0
    }

    /// Flip the bit the syndrome points at, returning the corrected codeword.
    pub fn correct_errors(&self, codeword: &[bool]) -> Vec<bool> {
        self.correct(codeword).0
    }

    /// Like [`Hamming::correct_errors`], but also reports what was done.
    pub fn correct(&self, codeword: &[bool]) -> (Vec<bool>, Correction) {
        let mut owned = codeword.to_vec();
        let correction = match self.syndrome(&owned) {
            0 => Correction::Clean,
            position if position <= owned.len() => {
                owned[position - 1] = !owned[position - 1];
                debug!(position, "hamming corrected single-bit error");
                Correction::Flipped(position)
            }
            position => {
                warn!(
                    position,
                    len = owned.len(),
                    "hamming syndrome points outside the codeword"
                );
                Correction::OutOfRange(position)
            }
        };
        (owned, correction)
    }
}

/// Parity over positions covered by `2^index`, excluding the parity position itself.
fn parity(codeword: &[bool], index: usize) -> bool {
    let mask = 1usize << index;
    codeword
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) & mask != 0 && i + 1 != mask)
        .fold(false, |acc, (_, &bit)| acc ^ bit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{bytes_to_bits, parse_bit_string, to_bit_string};

    #[test]
    fn test_parity_bit_count() {
        assert_eq!(Hamming::parity_bits_for(0), 0);
        assert_eq!(Hamming::parity_bits_for(1), 2);
        assert_eq!(Hamming::parity_bits_for(4), 3);
        assert_eq!(Hamming::parity_bits_for(11), 4);
        assert_eq!(Hamming::parity_bits_for(12), 5);
        assert_eq!(Hamming::parity_bits_for(16), 5);
    }

    #[test]
    fn test_hamming_7_4_layout() {
        // d = 1011 -> p1 p2 d1 p4 d2 d3 d4 = 0 1 1 0 0 1 1
        let codeword = Hamming.add_error_detection(&parse_bit_string("1011").unwrap());
        assert_eq!(to_bit_string(&codeword), "0110011");
        assert!(!Hamming.check_errors(&codeword));
    }

    #[test]
    fn test_roundtrip() {
        let data = bytes_to_bits(b"Hamming!");
        let codeword = Hamming.add_error_detection(&data);
        assert_eq!(codeword.len(), 64 + 7);
        assert_eq!(Hamming.remove_error_detection(&codeword), data);
    }

    #[test]
    fn test_single_flip_corrected_everywhere() {
        let data = bytes_to_bits(b"Hi");
        let codeword = Hamming.add_error_detection(&data);
        for i in 0..codeword.len() {
            let mut corrupted = codeword.clone();
            corrupted[i] = !corrupted[i];
            assert!(Hamming.check_errors(&corrupted));
            assert_eq!(Hamming.syndrome(&corrupted), i + 1);
            assert_eq!(Hamming.correct_errors(&corrupted), codeword);
        }
    }

    #[test]
    fn test_correct_reports_position() {
        let codeword = Hamming.add_error_detection(&bytes_to_bits(b"A"));
        let mut corrupted = codeword.clone();
        corrupted[4] = !corrupted[4];
        let (fixed, correction) = Hamming.correct(&corrupted);
        assert_eq!(fixed, codeword);
        assert_eq!(correction, Correction::Flipped(5));

        let (same, clean) = Hamming.correct(&codeword);
        assert_eq!(same, codeword);
        assert_eq!(clean, Correction::Clean);
    }

    #[test]
    fn test_double_flip_is_miscorrected() {
        let codeword = Hamming.add_error_detection(&bytes_to_bits(b"Hi"));
        let mut corrupted = codeword.clone();
        corrupted[2] = !corrupted[2];
        corrupted[4] = !corrupted[4];
        // Positions 3 and 5 give syndrome 3 ^ 5 = 6: position 6 is flipped instead.
        let fixed = Hamming.correct_errors(&corrupted);
        assert_ne!(fixed, codeword);
    }

    #[test]
    fn test_trailing_zero_padding_is_harmless() {
        let data = bytes_to_bits(b"ok");
        let mut codeword = Hamming.add_error_detection(&data);
        codeword.extend([false, false]);
        assert!(!Hamming.check_errors(&codeword));
        let recovered = Hamming.remove_error_detection(&codeword);
        assert_eq!(&recovered[..data.len()], data.as_slice());
    }

    #[test]
    fn test_empty() {
        assert!(Hamming.add_error_detection(&[]).is_empty());
        assert_eq!(Hamming.syndrome(&[]), 0);
    }
}
