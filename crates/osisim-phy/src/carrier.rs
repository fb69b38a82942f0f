//! Carrier modulation: ASK, FSK, PSK and 8-QAM.
//!
//! ASK, FSK and PSK evaluate the carrier on a global time axis (`n / fs` for
//! sample `n` of the whole waveform), so references used by the demodulators
//! are built over the same sample indices as the window they test. 8-QAM
//! restarts local time at every symbol.

use std::f64::consts::{PI, TAU};

use tracing::trace;

use crate::error::{PhyError, Result};
use crate::modulator::{CarrierModulator, Timing};

/// Two consecutive samples of a tone below Nyquist are never both zero, so
/// every bit window carries reference energy.
const MIN_SAMPLES_PER_BIT: usize = 2;

fn energy(window: &[f64]) -> f64 {
    window.iter().map(|s| s * s).sum()
}

/// Correlation of `window` with `reference`, normalised by the reference norm.
fn correlate(window: &[f64], reference: &[f64]) -> f64 {
    let dot: f64 = window.iter().zip(reference).map(|(x, r)| x * r).sum();
    let norm = energy(reference).sqrt();
    if norm > 0.0 {
        dot / norm
    } else {
        0.0
    }
}

/// `sin(2π f n / fs + phase)` for `n` in `range`.
fn tone(frequency: f64, sample_rate: f64, phase: f64, range: std::ops::Range<usize>) -> Vec<f64> {
    range
        .map(|n| (TAU * frequency * n as f64 / sample_rate + phase).sin())
        .collect()
}

/// Amplitude-shift keying: bit amplitude (0 or 1) times a sine carrier.
///
/// Demodulation compares each bit's energy with the mean energy over all
/// bits, clamped into `[0.25, 0.75]` of the energy a full-amplitude carrier
/// has in that window, so uniform payloads decode too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ask {
    timing: Timing,
    carrier: f64,
}

impl Ask {
    pub fn new(carrier_frequency: f64, bit_rate: f64, sample_rate: f64) -> Result<Self> {
        let timing = Timing::new(bit_rate, sample_rate, MIN_SAMPLES_PER_BIT)?;
        timing.check_frequency("carrier_frequency", carrier_frequency)?;
        Ok(Self {
            timing,
            carrier: carrier_frequency,
        })
    }
}

impl CarrierModulator for Ask {
    fn name(&self) -> &'static str {
        "ask"
    }

    fn carrier_frequency(&self) -> f64 {
        self.carrier
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn bits_per_symbol(&self) -> usize {
        1
    }

    fn samples_per_symbol(&self) -> usize {
        self.timing.samples_per_bit
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let spb = self.timing.samples_per_bit;
        let carrier = tone(self.carrier, self.timing.sample_rate, 0.0, 0..bits.len() * spb);
        carrier
            .iter()
            .enumerate()
            .map(|(n, s)| if bits[n / spb] { *s } else { 0.0 })
            .collect()
    }

    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        let spb = self.timing.samples_per_bit;
        let energies: Vec<f64> = waveform.chunks_exact(spb).map(energy).collect();
        if energies.is_empty() {
            return Vec::new();
        }
        let mean = energies.iter().sum::<f64>() / energies.len() as f64;

        energies
            .iter()
            .enumerate()
            .map(|(k, &e)| {
                let reference = energy(&tone(
                    self.carrier,
                    self.timing.sample_rate,
                    0.0,
                    k * spb..(k + 1) * spb,
                ));
                let threshold = mean.clamp(0.25 * reference, 0.75 * reference);
                trace!(window = k, energy = e, threshold, "ask decision");
                e > threshold
            })
            .collect()
    }
}

/// Frequency-shift keying: 0 → `f0`, 1 → `f0 + delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fsk {
    timing: Timing,
    carrier: f64,
    delta: f64,
}

impl Fsk {
    /// `delta` is the offset of the "1" tone; both tones must lie below Nyquist.
    pub fn new(carrier_frequency: f64, delta: f64, bit_rate: f64, sample_rate: f64) -> Result<Self> {
        let timing = Timing::new(bit_rate, sample_rate, MIN_SAMPLES_PER_BIT)?;
        timing.check_frequency("carrier_frequency", carrier_frequency)?;
        if delta == 0.0 || !delta.is_finite() {
            return Err(PhyError::InvalidFrequency {
                name: "delta_frequency",
                value: delta,
                reason: "must be non-zero and finite".into(),
            });
        }
        timing.check_frequency("carrier_frequency + delta_frequency", carrier_frequency + delta)?;
        Ok(Self {
            timing,
            carrier: carrier_frequency,
            delta,
        })
    }

    fn frequency(&self, bit: bool) -> f64 {
        if bit {
            self.carrier + self.delta
        } else {
            self.carrier
        }
    }
}

impl CarrierModulator for Fsk {
    fn name(&self) -> &'static str {
        "fsk"
    }

    fn carrier_frequency(&self) -> f64 {
        self.carrier
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn bits_per_symbol(&self) -> usize {
        1
    }

    fn samples_per_symbol(&self) -> usize {
        self.timing.samples_per_bit
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let spb = self.timing.samples_per_bit;
        bits.iter()
            .enumerate()
            .flat_map(|(k, &bit)| {
                tone(self.frequency(bit), self.timing.sample_rate, 0.0, k * spb..(k + 1) * spb)
            })
            .collect()
    }

    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        let spb = self.timing.samples_per_bit;
        let fs = self.timing.sample_rate;
        waveform
            .chunks_exact(spb)
            .enumerate()
            .map(|(k, window)| {
                let range = k * spb..(k + 1) * spb;
                let zero = correlate(window, &tone(self.frequency(false), fs, 0.0, range.clone()));
                let one = correlate(window, &tone(self.frequency(true), fs, 0.0, range));
                one > zero
            })
            .collect()
    }
}

/// Binary phase-shift keying: 0 → phase 0, 1 → phase π.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Psk {
    timing: Timing,
    carrier: f64,
}

impl Psk {
    pub fn new(carrier_frequency: f64, bit_rate: f64, sample_rate: f64) -> Result<Self> {
        let timing = Timing::new(bit_rate, sample_rate, MIN_SAMPLES_PER_BIT)?;
        timing.check_frequency("carrier_frequency", carrier_frequency)?;
        Ok(Self {
            timing,
            carrier: carrier_frequency,
        })
    }
}

impl CarrierModulator for Psk {
    fn name(&self) -> &'static str {
        "psk"
    }

    fn carrier_frequency(&self) -> f64 {
        self.carrier
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn bits_per_symbol(&self) -> usize {
        1
    }

    fn samples_per_symbol(&self) -> usize {
        self.timing.samples_per_bit
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let spb = self.timing.samples_per_bit;
        bits.iter()
            .enumerate()
            .flat_map(|(k, &bit)| {
                let phase = if bit { PI } else { 0.0 };
                tone(self.carrier, self.timing.sample_rate, phase, k * spb..(k + 1) * spb)
            })
            .collect()
    }

    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        let spb = self.timing.samples_per_bit;
        let fs = self.timing.sample_rate;
        waveform
            .chunks_exact(spb)
            .enumerate()
            .map(|(k, window)| {
                let range = k * spb..(k + 1) * spb;
                let zero = correlate(window, &tone(self.carrier, fs, 0.0, range.clone()));
                let one = correlate(window, &tone(self.carrier, fs, PI, range));
                one > zero
            })
            .collect()
    }
}

/// 8-QAM constellation size.
const QAM8_POINTS: usize = 8;

/// 8-ary QAM: 3 bits (MSB first) select phase `k·π/4` of a unit cosine held
/// for three bit periods.
///
/// The input is zero-padded to a multiple of 3 bits, so demodulated output can
/// carry up to two extra trailing zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Qam8 {
    timing: Timing,
    carrier: f64,
    references: Vec<Vec<f64>>,
}

impl Qam8 {
    pub fn new(carrier_frequency: f64, bit_rate: f64, sample_rate: f64) -> Result<Self> {
        let timing = Timing::new(bit_rate, sample_rate, MIN_SAMPLES_PER_BIT)?;
        timing.check_frequency("carrier_frequency", carrier_frequency)?;
        let len = 3 * timing.samples_per_bit;
        let references = (0..QAM8_POINTS)
            .map(|k| {
                // cos(x) = sin(x + π/2)
                tone(
                    carrier_frequency,
                    sample_rate,
                    k as f64 * PI / 4.0 + PI / 2.0,
                    0..len,
                )
            })
            .collect();
        Ok(Self {
            timing,
            carrier: carrier_frequency,
            references,
        })
    }

    /// Constellation point with the highest correlation; ties keep the lowest index.
    fn detect(&self, segment: &[f64]) -> usize {
        let mut best = 0;
        let mut best_score = correlate(segment, &self.references[0]);
        for (k, reference) in self.references.iter().enumerate().skip(1) {
            let score = correlate(segment, reference);
            if score > best_score {
                best = k;
                best_score = score;
            }
        }
        best
    }
}

impl CarrierModulator for Qam8 {
    fn name(&self) -> &'static str {
        "qam8"
    }

    fn carrier_frequency(&self) -> f64 {
        self.carrier
    }

    fn sample_rate(&self) -> f64 {
        self.timing.sample_rate
    }

    fn bits_per_symbol(&self) -> usize {
        3
    }

    fn samples_per_symbol(&self) -> usize {
        3 * self.timing.samples_per_bit
    }

    fn modulate(&self, bits: &[bool]) -> Vec<f64> {
        let mut padded = bits.to_vec();
        padded.resize(bits.len().div_ceil(3) * 3, false);
        padded
            .chunks_exact(3)
            .flat_map(|symbol| {
                let k = symbol
                    .iter()
                    .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit));
                self.references[k].iter().copied()
            })
            .collect()
    }

    fn demodulate(&self, waveform: &[f64]) -> Vec<bool> {
        waveform
            .chunks_exact(self.samples_per_symbol())
            .flat_map(|segment| {
                let k = self.detect(segment);
                trace!(symbol = k, "qam8 decision");
                [k & 0b100 != 0, k & 0b010 != 0, k & 0b001 != 0]
            })
            .collect()
    }
}
