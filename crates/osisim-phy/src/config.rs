use serde::{Deserialize, Serialize};

use crate::carrier::{Ask, Fsk, Psk, Qam8};
use crate::channel::{Channel, DEFAULT_SNR, DEFAULT_STD_DEV};
use crate::digital::{Bipolar, Manchester, Nrz};
use crate::error::Result;
use crate::modulator::Modem;

/// Modulation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationScheme {
    #[default]
    Nrz,
    Bipolar,
    Manchester,
    Ask,
    Fsk,
    Psk,
    Qam8,
}

impl ModulationScheme {
    pub const ALL: [ModulationScheme; 7] = [
        ModulationScheme::Nrz,
        ModulationScheme::Bipolar,
        ModulationScheme::Manchester,
        ModulationScheme::Ask,
        ModulationScheme::Fsk,
        ModulationScheme::Psk,
        ModulationScheme::Qam8,
    ];

    /// Whether the scheme modulates a carrier (as opposed to line coding).
    pub fn uses_carrier(self) -> bool {
        matches!(
            self,
            ModulationScheme::Ask
                | ModulationScheme::Fsk
                | ModulationScheme::Psk
                | ModulationScheme::Qam8
        )
    }
}

/// Modulator parameters. Line codes ignore the carrier fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulationConfig {
    pub scheme: ModulationScheme,
    pub bit_rate: f64,
    pub sample_rate: f64,
    pub carrier_frequency: f64,
    /// FSK offset of the "1" tone; defaults to `carrier_frequency`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_frequency: Option<f64>,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self {
            scheme: ModulationScheme::default(),
            bit_rate: 1000.0,
            sample_rate: 10_000.0,
            carrier_frequency: 1000.0,
            delta_frequency: None,
        }
    }
}

impl ModulationConfig {
    pub fn with_scheme(scheme: ModulationScheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    pub fn build(&self) -> Result<Modem> {
        let Self {
            scheme,
            bit_rate,
            sample_rate,
            carrier_frequency: fc,
            delta_frequency,
        } = *self;
        let modem = match scheme {
            ModulationScheme::Nrz => Modem::Digital(Box::new(Nrz::new(bit_rate, sample_rate)?)),
            ModulationScheme::Bipolar => {
                Modem::Digital(Box::new(Bipolar::new(bit_rate, sample_rate)?))
            }
            ModulationScheme::Manchester => {
                Modem::Digital(Box::new(Manchester::new(bit_rate, sample_rate)?))
            }
            ModulationScheme::Ask => Modem::Carrier(Box::new(Ask::new(fc, bit_rate, sample_rate)?)),
            ModulationScheme::Fsk => Modem::Carrier(Box::new(Fsk::new(
                fc,
                delta_frequency.unwrap_or(fc),
                bit_rate,
                sample_rate,
            )?)),
            ModulationScheme::Psk => Modem::Carrier(Box::new(Psk::new(fc, bit_rate, sample_rate)?)),
            ModulationScheme::Qam8 => {
                Modem::Carrier(Box::new(Qam8::new(fc, bit_rate, sample_rate)?))
            }
        };
        Ok(modem)
    }
}

/// Noise channel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub snr: f64,
    pub std_dev: f64,
    /// Fixed RNG seed for reproducible noise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            snr: DEFAULT_SNR,
            std_dev: DEFAULT_STD_DEV,
            seed: None,
        }
    }
}

impl ChannelConfig {
    /// A channel that adds no noise.
    pub fn noiseless() -> Self {
        Self {
            std_dev: 0.0,
            ..Self::default()
        }
    }

    pub fn build(&self) -> Result<Channel> {
        Channel::new(self.snr, self.std_dev, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhyError;

    #[test]
    fn test_every_scheme_builds_with_defaults() {
        for scheme in ModulationScheme::ALL {
            let modem = ModulationConfig::with_scheme(scheme).build().unwrap();
            assert_eq!(matches!(modem, Modem::Carrier(_)), scheme.uses_carrier());
            let expected = if scheme == ModulationScheme::Qam8 { 3 } else { 1 };
            assert_eq!(modem.bits_per_symbol(), expected);
        }
    }

    #[test]
    fn test_fsk_delta_defaults_to_carrier() {
        let config = ModulationConfig {
            delta_frequency: None,
            carrier_frequency: 2_600.0,
            ..ModulationConfig::with_scheme(ModulationScheme::Fsk)
        };
        // 2600 + 2600 is above Nyquist for 10 kHz sampling.
        assert!(matches!(
            config.build(),
            Err(PhyError::InvalidFrequency { .. })
        ));
        let config = ModulationConfig {
            delta_frequency: Some(1_000.0),
            ..config
        };
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ModulationConfig =
            serde_json::from_str(r#"{"scheme":"qam8","bit_rate":500}"#).unwrap();
        assert_eq!(config.scheme, ModulationScheme::Qam8);
        assert_eq!(config.bit_rate, 500.0);
        assert_eq!(config.sample_rate, 10_000.0);

        let channel: ChannelConfig = serde_json::from_str(r#"{"seed":3}"#).unwrap();
        assert_eq!(channel.snr, DEFAULT_SNR);
        assert_eq!(channel.seed, Some(3));
    }

    #[test]
    fn test_channel_config_validated() {
        let config = ChannelConfig {
            snr: 0.0,
            ..ChannelConfig::default()
        };
        assert!(config.build().is_err());
        assert!(ChannelConfig::noiseless().build().is_ok());
    }
}
