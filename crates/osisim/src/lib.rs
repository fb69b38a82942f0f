//! osisim: a teaching model of the bottom two OSI layers.
//!
//! A payload is framed (character counting, byte stuffing or bit stuffing),
//! optionally protected by a parity or CRC trailer and a Hamming code,
//! modulated onto a sampled waveform, passed through an additive Gaussian
//! noise channel, and recovered on the other side.
//!
//! ```no_run
//! use osisim::pipeline::PipelineConfig;
//! use osisim::link::FramerConfig;
//!
//! let config = PipelineConfig {
//!     framing: FramerConfig::bits_flag(),
//!     ..PipelineConfig::default()
//! };
//! let mut pipeline = config.build()?;
//! let (_sent, received) = pipeline.transmit(b"Hi")?;
//! println!("{}", received.status);
//! # Ok::<(), osisim::pipeline::PipelineError>(())
//! ```

pub use osisim_link as link;
pub use osisim_phy as phy;
pub use osisim_pipeline as pipeline;
