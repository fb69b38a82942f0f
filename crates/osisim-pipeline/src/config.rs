use std::path::Path;

use osisim_link::{CorrectorConfig, DetectorConfig, FramerConfig};
use osisim_phy::{ChannelConfig, ModulationConfig};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::pipeline::Pipeline;

/// Default cap on the payload bytes sent in one frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64;

/// Complete description of a transmission pipeline.
///
/// Every field is optional in JSON and falls back to its default:
/// ```json
/// {
///   "max_frame_size": 64,
///   "framing": { "kind": "char_counting", "counter_size": 1 },
///   "detection": { "kind": "crc" },
///   "correction": { "kind": "hamming" },
///   "modulation": { "scheme": "psk", "carrier_frequency": 1000 },
///   "channel": { "snr": 10, "std_dev": 0.4, "seed": 7 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Payload bytes beyond this are dropped before framing.
    pub max_frame_size: usize,
    pub framing: FramerConfig,
    pub detection: DetectorConfig,
    pub correction: CorrectorConfig,
    pub modulation: ModulationConfig,
    pub channel: ChannelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            framing: FramerConfig::default(),
            detection: DetectorConfig::default(),
            correction: CorrectorConfig::default(),
            modulation: ModulationConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every component and their combination without keeping them.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 {
            return Err(PipelineError::Configuration(
                "max_frame_size must be at least 1 byte".into(),
            ));
        }

        let framer = self.framing.build(&self.detection)?;
        if let (FramerConfig::CharCounting { counter_size, .. }, Some(framer)) =
            (&self.framing, framer.as_ref())
        {
            let trailer_bytes = framer.detector().map_or(0, |d| d.trailer_size() / 8);
            let needed = self.max_frame_size as u128 + trailer_bytes as u128;
            let capacity = (1u128 << (8 * *counter_size as u32)) - 1;
            if needed > capacity {
                return Err(PipelineError::Configuration(format!(
                    "a {counter_size}-byte counter describes at most {capacity} bytes, \
                     max_frame_size {} plus a {trailer_bytes}-byte trailer needs {needed}",
                    self.max_frame_size
                )));
            }
        }

        self.modulation.build()?;
        self.channel.build()?;
        Ok(())
    }

    pub fn build(&self) -> Result<Pipeline> {
        Pipeline::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osisim_link::OverrunPolicy;
    use osisim_phy::ModulationScheme;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_frame_size, 64);
        assert_eq!(config.framing, FramerConfig::None);
        assert_eq!(config.modulation.scheme, ModulationScheme::Nrz);
        assert_eq!(config.channel.snr, 10.0);
        assert_eq!(config.channel.std_dev, 0.4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(
            PipelineConfig::from_json_str("{}").unwrap(),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_full_document() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "max_frame_size": 16,
                "framing": {"kind": "char_counting", "counter_size": 2, "overrun": "reject"},
                "detection": {"kind": "parity"},
                "correction": {"kind": "hamming"},
                "modulation": {"scheme": "fsk", "delta_frequency": 500},
                "channel": {"snr": 100, "seed": 5}
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_frame_size, 16);
        assert_eq!(
            config.framing,
            FramerConfig::CharCounting {
                counter_size: 2,
                overrun: OverrunPolicy::Reject
            }
        );
        assert_eq!(config.detection, DetectorConfig::Parity { to_byte: None });
        assert_eq!(config.correction, CorrectorConfig::Hamming);
        assert_eq!(config.modulation.delta_frequency, Some(500.0));
        assert_eq!(config.channel.seed, Some(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PipelineConfig {
            framing: FramerConfig::bits_flag(),
            detection: DetectorConfig::crc(),
            ..PipelineConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"framing": {"kind": "smoke_signals"}}"#),
            Err(PipelineError::Json(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_file("/nonexistent/osisim.json"),
            Err(PipelineError::Io { .. })
        ));
    }

    #[test]
    fn test_counter_capacity_checked() {
        let config = PipelineConfig {
            max_frame_size: 254,
            framing: FramerConfig::char_counting(),
            detection: DetectorConfig::crc(),
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());

        let config = PipelineConfig {
            max_frame_size: 251,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_huge_frame_size_is_configuration_error() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "max_frame_size": 18446744073709551615,
                "framing": {"kind": "char_counting", "counter_size": 8},
                "detection": {"kind": "crc"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_frame_size, usize::MAX);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_component_errors_surface() {
        let config = PipelineConfig {
            framing: FramerConfig::byte_flag(),
            detection: DetectorConfig::Parity {
                to_byte: Some(false),
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Link(_))));

        let mut config = PipelineConfig::default();
        config.modulation.sample_rate = 500.0;
        assert!(matches!(config.validate(), Err(PipelineError::Phy(_))));

        let config = PipelineConfig {
            max_frame_size: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration(_))
        ));
    }
}
