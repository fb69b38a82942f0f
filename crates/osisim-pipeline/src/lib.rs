//! Send/receive orchestration for osisim.
//!
//! A [`Pipeline`] owns one framer (with its optional error detector), an
//! optional Hamming corrector, one modulator and one noise channel:
//!
//! ```text
//! payload → bits → frame (+trailer) → Hamming → modulate → channel
//! channel → demodulate → Hamming → deframe → check trailer → payload
//! ```
//!
//! Receive-side failures are reported as data in [`Reception`], not as errors.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{PipelineConfig, DEFAULT_MAX_FRAME_SIZE};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, ReceiveStatus, Reception, Stage, Transmission};
