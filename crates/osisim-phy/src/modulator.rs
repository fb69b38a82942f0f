use std::fmt;

use crate::error::{PhyError, Result};

/// Line coder: maps bits straight onto baseband amplitude levels.
pub trait DigitalModulator: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Samples emitted per bit, `floor(sample_rate / bit_rate)`.
    fn samples_per_bit(&self) -> usize;

    fn sample_rate(&self) -> f64;

    fn modulate(&self, bits: &[bool]) -> Vec<f64>;

    /// Recover bits from whole bit periods; a trailing partial period is dropped.
    fn demodulate(&self, waveform: &[f64]) -> Vec<bool>;

    /// Sample instants in seconds for a waveform of `len` samples.
    fn time_axis(&self, len: usize) -> Vec<f64> {
        time_axis(self.sample_rate(), len)
    }
}

/// Modulates a sinusoidal carrier's amplitude, frequency or phase.
pub trait CarrierModulator: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn carrier_frequency(&self) -> f64;

    fn sample_rate(&self) -> f64;

    /// Bits carried by one symbol.
    fn bits_per_symbol(&self) -> usize;

    /// Samples emitted per symbol.
    fn samples_per_symbol(&self) -> usize;

    fn modulate(&self, bits: &[bool]) -> Vec<f64>;

    /// Recover bits from whole symbols; a trailing partial symbol is dropped.
    fn demodulate(&self, waveform: &[f64]) -> Vec<bool>;

    fn time_axis(&self, len: usize) -> Vec<f64> {
        time_axis(self.sample_rate(), len)
    }
}

/// Either kind of modulator. A pipeline uses exactly one.
#[derive(Debug)]
pub enum Modem {
    Digital(Box<dyn DigitalModulator>),
    Carrier(Box<dyn CarrierModulator>),
}

impl Modem {
    pub fn name(&self) -> &'static str {
        match self {
            Modem::Digital(m) => m.name(),
            Modem::Carrier(m) => m.name(),
        }
    }

    pub fn bits_per_symbol(&self) -> usize {
        match self {
            Modem::Digital(_) => 1,
            Modem::Carrier(m) => m.bits_per_symbol(),
        }
    }

    pub fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        match self {
            Modem::Digital(m) => m.modulate(bits),
            Modem::Carrier(m) => m.modulate(bits),
        }
    }

    pub fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        match self {
            Modem::Digital(m) => m.demodulate(waveform),
            Modem::Carrier(m) => m.demodulate(waveform),
        }
    }

    pub fn time_axis(&self, len: usize) -> Vec<f64> {
        match self {
            Modem::Digital(m) => m.time_axis(len),
            Modem::Carrier(m) => m.time_axis(len),
        }
    }
}

/// `n / sample_rate` for `n` in `0..len`.
pub fn time_axis(sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len).map(|n| n as f64 / sample_rate).collect()
}

/// Bit timing shared by every modulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub bit_rate: f64,
    pub sample_rate: f64,
    pub samples_per_bit: usize,
}

impl Timing {
    /// Validate both rates and derive `samples_per_bit`, which must reach `min_samples`.
    pub fn new(bit_rate: f64, sample_rate: f64, min_samples: usize) -> Result<Self> {
        positive("bit_rate", bit_rate)?;
        positive("sample_rate", sample_rate)?;
        let samples_per_bit = (sample_rate / bit_rate).floor() as usize;
        if samples_per_bit < min_samples.max(1) {
            return Err(PhyError::Configuration(format!(
                "sample_rate {sample_rate} / bit_rate {bit_rate} gives {samples_per_bit} samples per bit, need at least {}",
                min_samples.max(1)
            )));
        }
        Ok(Self {
            bit_rate,
            sample_rate,
            samples_per_bit,
        })
    }

    /// Reject frequencies that are not strictly inside `(0, Nyquist)`.
    pub fn check_frequency(&self, name: &'static str, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PhyError::InvalidFrequency {
                name,
                value,
                reason: "must be positive and finite".into(),
            });
        }
        let nyquist = self.sample_rate / 2.0;
        if value >= nyquist {
            return Err(PhyError::InvalidFrequency {
                name,
                value,
                reason: format!("must be below the Nyquist frequency ({nyquist} Hz)"),
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PhyError::InvalidRate { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_bit_floors() {
        let timing = Timing::new(300.0, 1000.0, 1).unwrap();
        assert_eq!(timing.samples_per_bit, 3);
    }

    #[test]
    fn test_rates_validated() {
        assert!(matches!(
            Timing::new(0.0, 1000.0, 1),
            Err(PhyError::InvalidRate { name: "bit_rate", .. })
        ));
        assert!(matches!(
            Timing::new(100.0, f64::NAN, 1),
            Err(PhyError::InvalidRate { name: "sample_rate", .. })
        ));
        assert!(matches!(
            Timing::new(2000.0, 1000.0, 1),
            Err(PhyError::Configuration(_))
        ));
        assert!(Timing::new(1000.0, 1000.0, 2).is_err());
    }

    #[test]
    fn test_nyquist_limit() {
        let timing = Timing::new(100.0, 10_000.0, 1).unwrap();
        assert!(timing.check_frequency("carrier_frequency", 4_999.0).is_ok());
        assert!(timing.check_frequency("carrier_frequency", 5_000.0).is_err());
        assert!(timing.check_frequency("carrier_frequency", 0.0).is_err());
    }

    #[test]
    fn test_time_axis() {
        assert_eq!(time_axis(4.0, 3), vec![0.0, 0.25, 0.5]);
    }
}
