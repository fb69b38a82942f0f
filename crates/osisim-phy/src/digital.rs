//! Baseband line codes.

use crate::error::Result;
use crate::modulator::{DigitalModulator, Timing};

fn energy(window: &[f64]) -> f64 {
    window.iter().map(|s| s * s).sum()
}

/// Polar non-return-to-zero: 0 → -1, 1 → +1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nrz {
    timing: Timing,
}

impl Nrz {
    pub fn new(bit_rate: f64, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            timing: Timing::new(bit_rate, sample_rate, 1)?,
        })
    }
}

impl DigitalModulator for Nrz {
    fn name(&self) -> &'static str {
        "nrz"
    }

    fn samples_per_bit(&self) -> usize {
        self.timing.samples_per_bit
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let spb = self.timing.samples_per_bit;
        bits.iter()
            .flat_map(|&bit| std::iter::repeat(if bit { 1.0 } else { -1.0 }).take(spb))
            .collect()
    }

    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        let spb = self.timing.samples_per_bit;
        waveform
            .chunks_exact(spb)
            .map(|window| window.iter().sum::<f64>() / spb as f64 > 0.0)
            .collect()
    }
}

/// Alternate mark inversion: 0 → 0, successive 1s alternate +1 / -1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bipolar {
    timing: Timing,
}

impl Bipolar {
    pub fn new(bit_rate: f64, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            timing: Timing::new(bit_rate, sample_rate, 1)?,
        })
    }
}

impl DigitalModulator for Bipolar {
    fn name(&self) -> &'static str {
        "bipolar"
    }

    fn samples_per_bit(&self) -> usize {
        self.timing.samples_per_bit
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let spb = self.timing.samples_per_bit;
        let mut waveform = Vec::with_capacity(bits.len() * spb);
        let mut mark = 1.0;
        for &bit in bits {
            let level = if bit {
                let level = mark;
                mark = -mark;
                level
            } else {
                0.0
            };
            waveform.extend(std::iter::repeat(level).take(spb));
        }
        waveform
    }

    /// A window whose energy exceeds half the samples per bit is a mark.
    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        let spb = self.timing.samples_per_bit;
        let threshold = spb as f64 / 2.0;
        waveform
            .chunks_exact(spb)
            .map(|window| energy(window) > threshold)
            .collect()
    }
}

/// Manchester: 0 → low then high, 1 → high then low (levels 0 and 1).
///
/// The first half of each bit lasts `samples_per_bit / 2` samples and the
/// second half takes the rest, so odd `samples_per_bit` still yields exactly
/// `samples_per_bit` samples per bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manchester {
    timing: Timing,
}

impl Manchester {
    /// Needs at least two samples per bit.
    pub fn new(bit_rate: f64, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            timing: Timing::new(bit_rate, sample_rate, 2)?,
        })
    }

    fn halves(&self) -> (usize, usize) {
        let spb = self.timing.samples_per_bit;
        (spb / 2, spb - spb / 2)
    }
}

impl DigitalModulator for Manchester {
    fn name(&self) -> &'static str {
        "manchester"
    }

    fn samples_per_bit(&self) -> usize {
        self.timing.samples_per_bit
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let (first, second) = self.halves();
        let mut waveform = Vec::with_capacity(bits.len() * (first + second));
        for &bit in bits {
            let (a, b) = if bit { (1.0, 0.0) } else { (0.0, 1.0) };
            waveform.extend(std::iter::repeat(a).take(first));
            waveform.extend(std::iter::repeat(b).take(second));
        }
        waveform
    }

    /// Compares the mean energy of both halves: a louder first half is a 1.
    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        let (first, second) = self.halves();
        waveform
            .chunks_exact(first + second)
            .map(|window| {
                let (a, b) = window.split_at(first);
                energy(a) / first as f64 > energy(b) / second as f64
            })
            .collect()
    }
}
