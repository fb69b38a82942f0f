use tracing::trace;

use crate::detector::ErrorDetector;
use crate::error::{LinkError, Result};
use crate::framer::Framer;

/// Default sentinel: `01111110`.
pub const DEFAULT_FLAG_BITS: [bool; 8] = [false, true, true, true, true, true, true, false];

/// Bit-flag framer with bit stuffing.
///
/// Wire format: `FLAG [stuffed payload] FLAG`. Whenever the transmitted
/// stream (opening flag included) ends with the flag minus its last bit, a
/// stuffed bit equal to the inverse of the flag's last bit follows. With the
/// default sentinel this is the classic "insert a 1 after `0111111`" rule, so
/// the sentinel can never occur between the two boundaries.
#[derive(Debug)]
pub struct BitsFlag {
    flag: Vec<bool>,
    detector: Option<Box<dyn ErrorDetector>>,
}

impl BitsFlag {
    /// Create a framer with a custom sentinel.
    ///
    /// The sentinel must be at least 3 bits long and its prefix (all bits
    /// but the last) must not overlap itself, otherwise stuffing cannot keep
    /// the sentinel out of the payload.
    pub fn new(flag: Vec<bool>) -> Result<Self> {
        if flag.len() < 3 {
            return Err(LinkError::Configuration(format!(
                "flag must be at least 3 bits long, got {}",
                flag.len()
            )));
        }
        let prefix = &flag[..flag.len() - 1];
        if let Some(border) = (1..prefix.len()).find(|&k| prefix[..k] == prefix[prefix.len() - k..]) {
            return Err(LinkError::Configuration(format!(
                "flag prefix overlaps itself ({border}-bit border), stuffing would be ambiguous"
            )));
        }
        Ok(Self {
            flag,
            detector: None,
        })
    }

    /// Attach an error detector. Any trailer size works at bit granularity.
    pub fn with_detector(mut self, detector: Box<dyn ErrorDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn flag(&self) -> &[bool] {
        &self.flag
    }

    fn prefix(&self) -> &[bool] {
        &self.flag[..self.flag.len() - 1]
    }

    fn stuff_bit(&self) -> bool {
        !self.flag[self.flag.len() - 1]
    }

    fn find_flag(&self, bits: &[bool]) -> Option<usize> {
        bits.windows(self.flag.len())
            .position(|window| window == self.flag.as_slice())
    }
}

impl Default for BitsFlag {
    fn default() -> Self {
        Self {
            flag: DEFAULT_FLAG_BITS.to_vec(),
            detector: None,
        }
    }
}

impl Framer for BitsFlag {
    fn name(&self) -> &'static str {
        "bits-flag"
    }

    fn byte_oriented(&self) -> bool {
        false
    }

    fn detector(&self) -> Option<&dyn ErrorDetector> {
        self.detector.as_deref()
    }

    fn encapsulate(&self, payload: &[bool]) -> Result<Vec<bool>> {
        let prefix = self.prefix();
        let stuff = self.stuff_bit();
        let mut frame = Vec::with_capacity(payload.len() + payload.len() / 6 + 2 * self.flag.len());
        frame.extend_from_slice(&self.flag);

        let mut stuffed = 0usize;
        // The opening flag never ends with its own prefix (no border), so the
        // first check can only fire once payload bits are present.
        for &bit in payload {
            frame.push(bit);
            while frame.ends_with(prefix) {
                frame.push(stuff);
                stuffed += 1;
            }
        }
        frame.extend_from_slice(&self.flag);
        trace!(payload = payload.len(), stuffed, "bit stuffing");
        Ok(frame)
    }

    fn decapsulate(&self, frame: &[bool]) -> Result<Vec<bool>> {
        let n = self.flag.len();
        if frame.len() < 2 * n {
            return Err(LinkError::TooShort {
                len: frame.len(),
                min: 2 * n,
            });
        }
        let start = self.find_flag(frame).ok_or(LinkError::MissingOpeningFlag)? + n;
        let prefix = self.prefix();
        let stuff = self.stuff_bit();

        let mut dropped = vec![false; frame.len()];
        for i in start..frame.len() {
            if frame[i + 1 - n..i] != *prefix {
                continue;
            }
            if frame[i] == stuff {
                dropped[i] = true;
                continue;
            }
            // prefix + last flag bit: the closing flag spans frame[i + 1 - n..=i].
            let end = i + 1 - n;
            if end < start {
                return Err(LinkError::MissingClosingFlag);
            }
            let payload = (start..end)
                .filter(|&j| !dropped[j])
                .map(|j| frame[j])
                .collect();
            return Ok(payload);
        }
        Err(LinkError::MissingClosingFlag)
    }
}
