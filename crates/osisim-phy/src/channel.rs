use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::error::{PhyError, Result};

/// Default signal-to-noise ratio.
pub const DEFAULT_SNR: f64 = 10.0;

/// Default standard deviation of the injected Gaussian noise.
pub const DEFAULT_STD_DEV: f64 = 0.4;

/// Additive white Gaussian noise channel.
///
/// `send` stores the waveform with `N(0, std_dev) / snr` added to every
/// sample; `receive` hands back a copy of the stored waveform. The channel is
/// owned by one sender/receiver pair: it holds a single transmission at a time.
#[derive(Debug)]
pub struct Channel {
    snr: f64,
    std_dev: f64,
    noise: Normal<f64>,
    rng: StdRng,
    waveform: Vec<f64>,
}

impl Channel {
    /// Build a channel. `snr` must be strictly positive (infinity disables
    /// noise); `seed` makes the noise reproducible.
    pub fn new(snr: f64, std_dev: f64, seed: Option<u64>) -> Result<Self> {
        if snr.is_nan() || snr <= 0.0 {
            return Err(PhyError::InvalidSnr(snr));
        }
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(PhyError::InvalidNoise(std_dev));
        }
        let noise = Normal::new(0.0, std_dev).map_err(|_| PhyError::InvalidNoise(std_dev))?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            snr,
            std_dev,
            noise,
            rng,
            waveform: Vec::new(),
        })
    }

    pub fn snr(&self) -> f64 {
        self.snr
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Add noise to `waveform` and store it, replacing any previous transmission.
    pub fn send(&mut self, waveform: &[f64]) {
        let scale = self.snr.recip();
        let noise = &self.noise;
        let rng = &mut self.rng;
        self.waveform = waveform
            .iter()
            .map(|sample| sample + noise.sample(rng) * scale)
            .collect();
        debug!(samples = waveform.len(), snr = self.snr, "channel transmission");
    }

    /// The last transmitted waveform, empty if nothing was sent yet.
    pub fn receive(&self) -> Vec<f64> {
        self.waveform.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_before_send_is_empty() {
        let channel = Channel::new(10.0, 0.4, Some(1)).unwrap();
        assert!(channel.receive().is_empty());
    }

    #[test]
    fn test_infinite_snr_is_transparent() {
        let mut channel = Channel::new(f64::INFINITY, 0.4, Some(7)).unwrap();
        let waveform = vec![1.0, -1.0, 0.5, 0.0];
        channel.send(&waveform);
        assert_eq!(channel.receive(), waveform);
    }

    #[test]
    fn test_zero_std_dev_is_transparent() {
        let mut channel = Channel::new(1.0, 0.0, Some(7)).unwrap();
        channel.send(&[0.25; 16]);
        assert_eq!(channel.receive(), vec![0.25; 16]);
    }

    #[test]
    fn test_noise_scaled_by_snr() {
        let input = vec![0.0; 20_000];
        let spread = |snr: f64| {
            let mut channel = Channel::new(snr, 1.0, Some(42)).unwrap();
            channel.send(&input);
            let out = channel.receive();
            (out.iter().map(|s| s * s).sum::<f64>() / out.len() as f64).sqrt()
        };
        let loud = spread(1.0);
        let quiet = spread(10.0);
        assert!((loud - 1.0).abs() < 0.05, "rms {loud}");
        assert!((quiet - 0.1).abs() < 0.005, "rms {quiet}");
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = Channel::new(2.0, 0.4, Some(99)).unwrap();
        let mut b = Channel::new(2.0, 0.4, Some(99)).unwrap();
        a.send(&[1.0; 32]);
        b.send(&[1.0; 32]);
        assert_eq!(a.receive(), b.receive());
    }

    #[test]
    fn test_send_replaces_previous_waveform() {
        let mut channel = Channel::new(f64::INFINITY, 0.4, None).unwrap();
        channel.send(&[1.0; 8]);
        channel.send(&[2.0; 3]);
        assert_eq!(channel.receive(), vec![2.0; 3]);
    }

    #[test]
    fn test_parameters_validated() {
        assert!(matches!(Channel::new(0.0, 0.4, None), Err(PhyError::InvalidSnr(_))));
        assert!(matches!(Channel::new(-3.0, 0.4, None), Err(PhyError::InvalidSnr(_))));
        assert!(matches!(
            Channel::new(10.0, -0.1, None),
            Err(PhyError::InvalidNoise(_))
        ));
        assert!(matches!(
            Channel::new(10.0, f64::INFINITY, None),
            Err(PhyError::InvalidNoise(_))
        ));
    }
}
