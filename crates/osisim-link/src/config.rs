//! Serializable component descriptions.
//!
//! Each config is plain data with defaults; `build()` validates it and hands
//! back a freshly-owned component.

use serde::{Deserialize, Serialize};

use crate::bits::{parse_bit_string, to_bit_string};
use crate::bits_flag::{BitsFlag, DEFAULT_FLAG_BITS};
use crate::byte_flag::{ByteFlag, DEFAULT_ESCAPE_BYTE, DEFAULT_FLAG_BYTE};
use crate::char_counting::{CharCounting, OverrunPolicy, DEFAULT_COUNTER_SIZE};
use crate::crc::{Crc, DEFAULT_POLY, DEFAULT_TRAILER_SIZE};
use crate::detector::ErrorDetector;
use crate::error::{LinkError, Result};
use crate::framer::Framer;
use crate::hamming::Hamming;
use crate::parity::Parity;

/// Framing method.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FramerConfig {
    #[default]
    None,
    CharCounting {
        #[serde(default = "default_counter_size")]
        counter_size: usize,
        #[serde(default)]
        overrun: OverrunPolicy,
    },
    ByteFlag {
        #[serde(default = "default_flag_byte")]
        flag_byte: u32,
        #[serde(default = "default_escape_byte")]
        escape_byte: u32,
    },
    BitsFlag {
        #[serde(default = "default_flag_bits")]
        flag_bits: String,
    },
}

/// Error-detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorConfig {
    #[default]
    None,
    Parity {
        /// `None` picks the byte-wide trailer when the framer is byte-oriented.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_byte: Option<bool>,
    },
    Crc {
        #[serde(default = "default_poly")]
        poly: u64,
        #[serde(default = "default_trailer_size")]
        trailer_size: usize,
    },
}

/// Error-correction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectorConfig {
    #[default]
    None,
    Hamming,
}

fn default_counter_size() -> usize {
    DEFAULT_COUNTER_SIZE
}

fn default_flag_byte() -> u32 {
    u32::from(DEFAULT_FLAG_BYTE)
}

fn default_escape_byte() -> u32 {
    u32::from(DEFAULT_ESCAPE_BYTE)
}

fn default_flag_bits() -> String {
    to_bit_string(&DEFAULT_FLAG_BITS)
}

fn default_poly() -> u64 {
    DEFAULT_POLY
}

fn default_trailer_size() -> usize {
    DEFAULT_TRAILER_SIZE
}

fn byte_value(field: &str, value: u32) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| LinkError::config(format!("{field} must be a byte value (0-255), got {value}")))
}

impl FramerConfig {
    /// Default character-counting configuration.
    pub fn char_counting() -> Self {
        FramerConfig::CharCounting {
            counter_size: DEFAULT_COUNTER_SIZE,
            overrun: OverrunPolicy::default(),
        }
    }

    /// Default byte-flag configuration.
    pub fn byte_flag() -> Self {
        FramerConfig::ByteFlag {
            flag_byte: default_flag_byte(),
            escape_byte: default_escape_byte(),
        }
    }

    /// Default bit-flag configuration.
    pub fn bits_flag() -> Self {
        FramerConfig::BitsFlag {
            flag_bits: default_flag_bits(),
        }
    }

    /// Whether the configured framer works on whole bytes.
    pub fn byte_oriented(&self) -> bool {
        matches!(
            self,
            FramerConfig::CharCounting { .. } | FramerConfig::ByteFlag { .. }
        )
    }

    /// Build the framer with the detector described by `detection` attached.
    ///
    /// Returns `Ok(None)` when no framing is configured; the detector is then
    /// not built at all.
    pub fn build(&self, detection: &DetectorConfig) -> Result<Option<Box<dyn Framer>>> {
        let detector = || detection.build(self.byte_oriented());

        let framer: Box<dyn Framer> = match self {
            FramerConfig::None => return Ok(None),
            FramerConfig::CharCounting {
                counter_size,
                overrun,
            } => {
                let framer = CharCounting::new(*counter_size)?.with_overrun_policy(*overrun);
                match detector()? {
                    Some(d) => Box::new(framer.with_detector(d)?),
                    None => Box::new(framer),
                }
            }
            FramerConfig::ByteFlag {
                flag_byte,
                escape_byte,
            } => {
                let framer = ByteFlag::new(
                    byte_value("flag_byte", *flag_byte)?,
                    byte_value("escape_byte", *escape_byte)?,
                )?;
                match detector()? {
                    Some(d) => Box::new(framer.with_detector(d)?),
                    None => Box::new(framer),
                }
            }
            FramerConfig::BitsFlag { flag_bits } => {
                let framer = BitsFlag::new(parse_bit_string(flag_bits)?)?;
                match detector()? {
                    Some(d) => Box::new(framer.with_detector(d)),
                    None => Box::new(framer),
                }
            }
        };
        Ok(Some(framer))
    }
}

impl DetectorConfig {
    /// Default parity configuration (trailer width chosen from the framer).
    pub fn parity() -> Self {
        DetectorConfig::Parity { to_byte: None }
    }

    /// Default CRC configuration.
    pub fn crc() -> Self {
        DetectorConfig::Crc {
            poly: DEFAULT_POLY,
            trailer_size: DEFAULT_TRAILER_SIZE,
        }
    }

    /// Build the detector for a framer that is (or is not) byte-oriented.
    pub fn build(&self, byte_oriented: bool) -> Result<Option<Box<dyn ErrorDetector>>> {
        match *self {
            DetectorConfig::None => Ok(None),
            DetectorConfig::Parity { to_byte } => match to_byte {
                Some(false) if byte_oriented => Err(LinkError::config(
                    "single-bit parity cannot be used with a byte-oriented framer",
                )),
                Some(true) => Ok(Some(Box::new(Parity::byte_wide()))),
                Some(false) => Ok(Some(Box::new(Parity::new()))),
                None if byte_oriented => Ok(Some(Box::new(Parity::byte_wide()))),
                None => Ok(Some(Box::new(Parity::new()))),
            },
            DetectorConfig::Crc { poly, trailer_size } => {
                let crc = Crc::new(poly, trailer_size)?;
                if byte_oriented && trailer_size % 8 != 0 {
                    return Err(LinkError::config(format!(
                        "CRC trailer of {trailer_size} bits is not byte-aligned"
                    )));
                }
                Ok(Some(Box::new(crc)))
            }
        }
    }
}

impl CorrectorConfig {
    pub fn build(&self) -> Option<Hamming> {
        match self {
            CorrectorConfig::None => None,
            CorrectorConfig::Hamming => Some(Hamming::new()),
        }
    }
}
