use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::detector::ErrorDetector;
use crate::error::{LinkError, Result};
use crate::framer::{check_detector_alignment, Framer};

/// Default frame delimiter byte.
pub const DEFAULT_FLAG_BYTE: u8 = 0x7E;

/// Default escape byte.
pub const DEFAULT_ESCAPE_BYTE: u8 = 0x7D;

/// Byte-flag framer with escape-byte stuffing.
///
/// Wire format: `FLAG [escaped payload] FLAG`, where every payload byte equal
/// to `FLAG` or `ESC` is preceded by `ESC`.
#[derive(Debug)]
pub struct ByteFlag {
    flag: u8,
    escape: u8,
    detector: Option<Box<dyn ErrorDetector>>,
}

impl ByteFlag {
    /// Create a framer with custom flag and escape bytes, which must differ.
    pub fn new(flag: u8, escape: u8) -> Result<Self> {
        if flag == escape {
            return Err(LinkError::Configuration(format!(
                "flag byte and escape byte must differ (both {flag:#04x})"
            )));
        }
        Ok(Self {
            flag,
            escape,
            detector: None,
        })
    }

    /// Attach an error detector. Its trailer must be a whole number of bytes.
    pub fn with_detector(mut self, detector: Box<dyn ErrorDetector>) -> Result<Self> {
        check_detector_alignment(self.name(), Some(detector.as_ref()))?;
        self.detector = Some(detector);
        Ok(self)
    }

    pub fn flag(&self) -> u8 {
        self.flag
    }

    pub fn escape(&self) -> u8 {
        self.escape
    }
}

impl Default for ByteFlag {
    fn default() -> Self {
        Self {
            flag: DEFAULT_FLAG_BYTE,
            escape: DEFAULT_ESCAPE_BYTE,
            detector: None,
        }
    }
}

impl Framer for ByteFlag {
    fn name(&self) -> &'static str {
        "byte-flag"
    }

    fn byte_oriented(&self) -> bool {
        true
    }

    fn detector(&self) -> Option<&dyn ErrorDetector> {
        self.detector.as_deref()
    }

    fn encapsulate(&self, payload: &[bool]) -> Result<Vec<bool>> {
        let bytes = bits_to_bytes(payload)?;
        let mut frame = BytesMut::with_capacity(bytes.len() * 2 + 2);
        frame.put_u8(self.flag);
        for &byte in bytes.iter() {
            if byte == self.flag || byte == self.escape {
                frame.put_u8(self.escape);
            }
            frame.put_u8(byte);
        }
        frame.put_u8(self.flag);
        trace!(payload = bytes.len(), stuffed = frame.len() - bytes.len() - 2, "byte stuffing");
        Ok(bytes_to_bits(&frame))
    }

    fn decapsulate(&self, frame: &[bool]) -> Result<Vec<bool>> {
        let bytes = bits_to_bytes(frame)?;
        if bytes.len() < 2 {
            return Err(LinkError::TooShort {
                len: frame.len(),
                min: 16,
            });
        }

        let mut payload = Vec::with_capacity(bytes.len());
        let mut opened = false;
        let mut escaped = false;
        for &byte in bytes.iter() {
            if !opened {
                opened = byte == self.flag;
                continue;
            }
            if escaped {
                payload.push(byte);
                escaped = false;
            } else if byte == self.escape {
                escaped = true;
            } else if byte == self.flag {
                return Ok(bytes_to_bits(&payload));
            } else {
                payload.push(byte);
            }
        }

        if opened {
            Err(LinkError::MissingClosingFlag)
        } else {
            Err(LinkError::MissingOpeningFlag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parity::Parity;

    fn frame_bytes(framer: &ByteFlag, payload: &[u8]) -> Vec<u8> {
        let frame = framer.frame_data(&bytes_to_bits(payload)).unwrap();
        bits_to_bytes(&frame).unwrap().to_vec()
    }

    #[test]
    fn test_plain_payload() {
        let framer = ByteFlag::default();
        assert_eq!(frame_bytes(&framer, b"Hi"), vec![0x7E, 0x48, 0x69, 0x7E]);
    }

    #[test]
    fn test_escapes_flag_and_escape_bytes() {
        let framer = ByteFlag::default();
        let wire = frame_bytes(&framer, &[0x7E, 0x01, 0x7D]);
        assert_eq!(wire, vec![0x7E, 0x7D, 0x7E, 0x01, 0x7D, 0x7D, 0x7E]);

        let bits = bytes_to_bits(&wire);
        assert_eq!(
            framer.deframe_data(&bits).unwrap(),
            bytes_to_bits(&[0x7E, 0x01, 0x7D])
        );
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let framer = ByteFlag::default();
        let payload: Vec<u8> = (0..=255).collect();
        let frame = framer.frame_data(&bytes_to_bits(&payload)).unwrap();
        assert_eq!(framer.deframe_data(&frame).unwrap(), bytes_to_bits(&payload));
    }

    #[test]
    fn test_leading_garbage_discarded() {
        let framer = ByteFlag::default();
        let bits = bytes_to_bits(&[0x00, 0x13, 0x7E, 0x41, 0x7E, 0x55]);
        assert_eq!(framer.deframe_data(&bits).unwrap(), bytes_to_bits(b"A"));
    }

    #[test]
    fn test_empty_payload() {
        let framer = ByteFlag::default();
        assert_eq!(frame_bytes(&framer, &[]), vec![0x7E, 0x7E]);
        assert!(framer
            .deframe_data(&bytes_to_bits(&[0x7E, 0x7E]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_flags() {
        let framer = ByteFlag::default();
        assert_eq!(
            framer.deframe_data(&bytes_to_bits(&[0x41, 0x42])),
            Err(LinkError::MissingOpeningFlag)
        );
        assert_eq!(
            framer.deframe_data(&bytes_to_bits(&[0x7E, 0x41, 0x7D, 0x7E])),
            Err(LinkError::MissingClosingFlag)
        );
        assert!(matches!(
            framer.deframe_data(&bytes_to_bits(&[0x7E])),
            Err(LinkError::TooShort { .. })
        ));
    }

    #[test]
    fn test_custom_bytes() {
        let framer = ByteFlag::new(0xAA, 0xBB).unwrap();
        assert_eq!(
            frame_bytes(&framer, &[0xAA, 0x7E]),
            vec![0xAA, 0xBB, 0xAA, 0x7E, 0xAA]
        );
        assert!(ByteFlag::new(0x10, 0x10).is_err());
    }

    #[test]
    fn test_with_byte_parity() {
        let framer = ByteFlag::default()
            .with_detector(Box::new(Parity::byte_wide()))
            .unwrap();
        let payload = bytes_to_bits(&[0x7E, 0x7D, 0x42]);
        let frame = framer.frame_data(&payload).unwrap();
        assert_eq!(framer.deframe_data(&frame).unwrap(), payload);
    }
}
