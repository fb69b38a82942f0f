use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::detector::ErrorDetector;
use crate::error::{LinkError, Result};
use crate::framer::{check_detector_alignment, Framer};

/// Default length prefix width in bytes.
pub const DEFAULT_COUNTER_SIZE: usize = 1;

/// Upper bound on a declared payload, whatever the counter width: 16 MiB.
pub const MAX_DECLARED_PAYLOAD: usize = 16 * 1024 * 1024;

/// What to do when the length prefix declares more bytes than were received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// Zero-pad the payload up to the declared length.
    #[default]
    ZeroPad,
    /// Fail with [`LinkError::DeclaredLengthOverrun`].
    Reject,
}

/// Character-counting framer.
///
/// Wire format:
/// ```text
/// ┌────────────────────────┬──────────────────────┐
/// │ Count (counter_size B, │ Payload              │
/// │ big-endian)            │ (Count bytes)        │
/// └────────────────────────┴──────────────────────┘
/// ```
#[derive(Debug)]
pub struct CharCounting {
    counter_size: usize,
    overrun: OverrunPolicy,
    detector: Option<Box<dyn ErrorDetector>>,
}

impl CharCounting {
    /// Create a framer with a `counter_size`-byte length prefix (1..=8).
    pub fn new(counter_size: usize) -> Result<Self> {
        if counter_size == 0 || counter_size > 8 {
            return Err(LinkError::Configuration(format!(
                "counter size must be between 1 and 8 bytes, got {counter_size}"
            )));
        }
        Ok(Self {
            counter_size,
            overrun: OverrunPolicy::default(),
            detector: None,
        })
    }

    /// Set the policy for declared lengths that exceed the received bytes.
    pub fn with_overrun_policy(mut self, overrun: OverrunPolicy) -> Self {
        self.overrun = overrun;
        self
    }

    /// Attach an error detector. Its trailer must be a whole number of bytes.
    pub fn with_detector(mut self, detector: Box<dyn ErrorDetector>) -> Result<Self> {
        check_detector_alignment(self.name(), Some(detector.as_ref()))?;
        self.detector = Some(detector);
        Ok(self)
    }

    pub fn counter_size(&self) -> usize {
        self.counter_size
    }

    /// Largest payload (in bytes) the counter can describe.
    pub fn max_payload(&self) -> usize {
        if self.counter_size >= std::mem::size_of::<usize>() {
            usize::MAX
        } else {
            (1usize << (8 * self.counter_size)) - 1
        }
    }
}

impl Default for CharCounting {
    fn default() -> Self {
        Self {
            counter_size: DEFAULT_COUNTER_SIZE,
            overrun: OverrunPolicy::default(),
            detector: None,
        }
    }
}

impl Framer for CharCounting {
    fn name(&self) -> &'static str {
        "char-counting"
    }

    fn byte_oriented(&self) -> bool {
        true
    }

    fn detector(&self) -> Option<&dyn ErrorDetector> {
        self.detector.as_deref()
    }

    fn encapsulate(&self, payload: &[bool]) -> Result<Vec<bool>> {
        let bytes = bits_to_bytes(payload)?;
        if bytes.len() > self.max_payload() {
            return Err(LinkError::PayloadTooLarge {
                size: bytes.len(),
                max: self.max_payload(),
            });
        }
        let mut frame = BytesMut::with_capacity(self.counter_size + bytes.len());
        frame.put_uint(bytes.len() as u64, self.counter_size);
        frame.put_slice(&bytes);
        Ok(bytes_to_bits(&frame))
    }

    fn decapsulate(&self, frame: &[bool]) -> Result<Vec<bool>> {
        let bytes = bits_to_bytes(frame)?;
        if bytes.len() < self.counter_size {
            return Err(LinkError::TooShort {
                len: frame.len(),
                min: self.counter_size * 8,
            });
        }

        let mut buf = bytes.as_ref();
        let declared = buf.get_uint(self.counter_size);
        let declared = usize::try_from(declared).unwrap_or(usize::MAX);
        let available = buf.remaining();

        if declared <= available {
            return Ok(bytes_to_bits(&buf[..declared]));
        }

        match self.overrun {
            OverrunPolicy::Reject => Err(LinkError::DeclaredLengthOverrun {
                declared,
                available,
            }),
            OverrunPolicy::ZeroPad if declared > MAX_DECLARED_PAYLOAD => {
                Err(LinkError::PayloadTooLarge {
                    size: declared,
                    max: MAX_DECLARED_PAYLOAD,
                })
            }
            OverrunPolicy::ZeroPad => {
                warn!(declared, available, "declared length overruns frame, zero-padding");
                let mut payload = buf.to_vec();
                payload.resize(declared, 0);
                Ok(bytes_to_bits(&payload))
            }
        }
    }
}
