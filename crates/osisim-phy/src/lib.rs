//! Physical layer for the osisim transmission pipeline.
//!
//! Turns bits into sampled waveforms and back:
//! - Line codes ([`digital`]): NRZ, bipolar AMI and Manchester
//! - Carrier modulation ([`carrier`]): ASK, FSK, BPSK and 8-QAM
//! - An additive Gaussian noise [`Channel`] between the two ends
//!
//! Demodulators work on whole bit (or symbol) periods and silently drop a
//! trailing partial period.

pub mod carrier;
pub mod channel;
pub mod config;
pub mod digital;
pub mod error;
pub mod modulator;

pub use carrier::{Ask, Fsk, Psk, Qam8};
pub use channel::{Channel, DEFAULT_SNR, DEFAULT_STD_DEV};
pub use config::{ChannelConfig, ModulationConfig, ModulationScheme};
pub use digital::{Bipolar, Manchester, Nrz};
pub use error::{PhyError, Result};
pub use modulator::{time_axis, CarrierModulator, DigitalModulator, Modem, Timing};
