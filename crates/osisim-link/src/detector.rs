use std::fmt;

use crate::error::Result;

/// Appends, verifies and strips a fixed-size error-detection trailer.
pub trait ErrorDetector: fmt::Debug + Send + Sync {
    /// Short human-readable name ("parity", "crc").
    fn name(&self) -> &'static str;

    /// Size of the trailer in bits.
    fn trailer_size(&self) -> usize;

    /// Return `bits` followed by the trailer.
    fn add_trailer(&self, bits: &[bool]) -> Result<Vec<bool>>;

    /// Verify payload plus trailer.
    ///
    /// Returns `None` when no error is detected, otherwise a diagnostic message.
    fn check(&self, bits: &[bool]) -> Option<String>;

    /// Return `bits` without the trailer.
    fn remove_trailer(&self, bits: &[bool]) -> Result<Vec<bool>>;
}

/// Split off the trailing `trailer_size` bits, failing if there are fewer.
pub(crate) fn strip(bits: &[bool], trailer_size: usize) -> Result<Vec<bool>> {
    if bits.len() < trailer_size {
        return Err(crate::LinkError::TooShort {
            len: bits.len(),
            min: trailer_size,
        });
    }
    Ok(bits[..bits.len() - trailer_size].to_vec())
}
