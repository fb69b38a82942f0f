use std::fmt;

use tracing::debug;

use crate::detector::ErrorDetector;
use crate::error::{LinkError, Result};

/// Wraps a bit sequence into a self-delimited frame and reverses it.
///
/// Implementors provide the raw framing transform (`encapsulate` /
/// `decapsulate`); `frame_data` and `deframe_data` compose it with the
/// optional [`ErrorDetector`]: the trailer is appended before framing and
/// verified then stripped after deframing.
pub trait Framer: fmt::Debug + Send + Sync {
    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Whether the framing format works on whole bytes.
    ///
    /// Byte-oriented framers reject bit counts that are not a multiple of 8,
    /// which constrains the trailer size of an attached detector.
    fn byte_oriented(&self) -> bool;

    /// The attached error detector, if any.
    fn detector(&self) -> Option<&dyn ErrorDetector>;

    /// Apply the framing transform to `payload`.
    fn encapsulate(&self, payload: &[bool]) -> Result<Vec<bool>>;

    /// Remove the framing transform, returning the enclosed bits.
    fn decapsulate(&self, frame: &[bool]) -> Result<Vec<bool>>;

    /// Append the detector trailer (if any) and frame the result.
    fn frame_data(&self, payload: &[bool]) -> Result<Vec<bool>> {
        let frame = match self.detector() {
            Some(detector) => self.encapsulate(&detector.add_trailer(payload)?)?,
            None => self.encapsulate(payload)?,
        };
        debug!(
            framer = self.name(),
            payload_bits = payload.len(),
            frame_bits = frame.len(),
            "framed"
        );
        Ok(frame)
    }

    /// Deframe, then verify and strip the detector trailer (if any).
    ///
    /// A failed check is reported as [`LinkError::Integrity`] carrying the
    /// detector's diagnostic.
    fn deframe_data(&self, frame: &[bool]) -> Result<Vec<bool>> {
        let body = self.decapsulate(frame)?;
        match self.detector() {
            Some(detector) => {
                if let Some(message) = detector.check(&body) {
                    return Err(LinkError::Integrity(message));
                }
                detector.remove_trailer(&body)
            }
            None => Ok(body),
        }
    }
}

/// Validate that a detector's trailer keeps a byte-oriented framer aligned.
pub(crate) fn check_detector_alignment(
    framer: &'static str,
    detector: Option<&dyn ErrorDetector>,
) -> Result<()> {
    match detector {
        Some(d) if d.trailer_size() % 8 != 0 => Err(LinkError::Configuration(format!(
            "{framer} framing needs a byte-aligned trailer, {} trailer is {} bits",
            d.name(),
            d.trailer_size()
        ))),
        _ => Ok(()),
    }
}
