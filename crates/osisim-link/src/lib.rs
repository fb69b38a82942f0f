//! Data-link layer for the osisim transmission pipeline.
//!
//! Everything here works on bit sequences (`bool` per bit, MSB first):
//! - Framers delimit a payload so the receiver can find it again: character
//!   counting, byte flags with escape stuffing, bit flags with bit stuffing
//! - Error detectors append a parity or CRC trailer that the deframer checks
//! - Hamming coding corrects a single flipped bit per codeword
//!
//! Component configs in [`config`] are plain serde data that `build()` into
//! boxed trait objects.

pub mod bits;
pub mod bits_flag;
pub mod byte_flag;
pub mod char_counting;
pub mod config;
pub mod crc;
pub mod detector;
pub mod error;
pub mod framer;
pub mod hamming;
pub mod parity;

pub use bits::{
    bits_to_bytes, bits_to_text, bytes_to_bits, pad_to_byte, parse_bit_string, text_to_bits,
    to_bit_string, truncate_to_byte,
};
pub use bits_flag::{BitsFlag, DEFAULT_FLAG_BITS};
pub use byte_flag::{ByteFlag, DEFAULT_ESCAPE_BYTE, DEFAULT_FLAG_BYTE};
pub use char_counting::{CharCounting, OverrunPolicy, DEFAULT_COUNTER_SIZE, MAX_DECLARED_PAYLOAD};
pub use config::{CorrectorConfig, DetectorConfig, FramerConfig};
pub use crc::{Crc, DEFAULT_POLY, DEFAULT_TRAILER_SIZE};
pub use detector::ErrorDetector;
pub use error::{ErrorKind, LinkError, Result};
pub use framer::Framer;
pub use hamming::{Correction, Hamming};
pub use parity::Parity;
