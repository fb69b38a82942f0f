use clap::{Args, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use osisim_link::{CorrectorConfig, DetectorConfig, FramerConfig};
use osisim_phy::ModulationScheme;
use osisim_pipeline::PipelineConfig;

use crate::exit::{pipeline_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod config;
pub mod deframe;
pub mod frame;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one payload through the whole pipeline and report every stage.
    Run(RunArgs),
    /// Frame a payload and print the resulting bits.
    Frame(FrameArgs),
    /// Deframe a bit string and print the payload.
    Deframe(DeframeArgs),
    /// Print the effective pipeline configuration.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Frame(args) => frame::run(args, format),
        Command::Deframe(args) => deframe::run(args, format),
        Command::Config(args) => config::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FramingKind {
    None,
    CharCounting,
    ByteFlag,
    BitsFlag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DetectionKind {
    None,
    Parity,
    Crc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CorrectionKind {
    None,
    Hamming,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scheme {
    Nrz,
    Bipolar,
    Manchester,
    Ask,
    Fsk,
    Psk,
    Qam8,
}

impl From<Scheme> for ModulationScheme {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Nrz => ModulationScheme::Nrz,
            Scheme::Bipolar => ModulationScheme::Bipolar,
            Scheme::Manchester => ModulationScheme::Manchester,
            Scheme::Ask => ModulationScheme::Ask,
            Scheme::Fsk => ModulationScheme::Fsk,
            Scheme::Psk => ModulationScheme::Psk,
            Scheme::Qam8 => ModulationScheme::Qam8,
        }
    }
}

/// Accept decimal or `0x`-prefixed hexadecimal integers.
pub fn parse_int(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid integer: {input}"))
}

fn parse_u32(input: &str) -> Result<u32, String> {
    let value = parse_int(input)?;
    u32::try_from(value).map_err(|_| format!("value out of range: {input}"))
}

/// Framing and error-detection options.
#[derive(Args, Debug, Default)]
pub struct LinkArgs {
    /// Framing method.
    #[arg(long, value_enum)]
    pub framing: Option<FramingKind>,
    /// Error-detection trailer appended inside the frame.
    #[arg(long, value_enum)]
    pub detection: Option<DetectionKind>,
    /// Length prefix width in bytes (char-counting).
    #[arg(long, value_name = "BYTES")]
    pub counter_size: Option<usize>,
    /// Flag byte, decimal or 0x-hex (byte-flag).
    #[arg(long, value_name = "BYTE", value_parser = parse_u32)]
    pub flag_byte: Option<u32>,
    /// Escape byte, decimal or 0x-hex (byte-flag).
    #[arg(long, value_name = "BYTE", value_parser = parse_u32)]
    pub escape_byte: Option<u32>,
    /// Flag sentinel as a bit string (bits-flag).
    #[arg(long, value_name = "BITS")]
    pub flag_bits: Option<String>,
    /// Use a 1-bit (false) or 8-bit (true) parity trailer.
    #[arg(long, value_name = "BOOL")]
    pub parity_to_byte: Option<bool>,
    /// CRC generator polynomial, decimal or 0x-hex.
    #[arg(long, value_name = "POLY", value_parser = parse_int)]
    pub poly: Option<u64>,
    /// CRC trailer width in bits.
    #[arg(long, value_name = "BITS")]
    pub trailer_size: Option<usize>,
}

impl LinkArgs {
    pub fn apply(&self, config: &mut PipelineConfig) -> CliResult<()> {
        if let Some(kind) = self.framing {
            config.framing = match kind {
                FramingKind::None => FramerConfig::None,
                FramingKind::CharCounting => FramerConfig::char_counting(),
                FramingKind::ByteFlag => FramerConfig::byte_flag(),
                FramingKind::BitsFlag => FramerConfig::bits_flag(),
            };
        }
        if let Some(kind) = self.detection {
            config.detection = match kind {
                DetectionKind::None => DetectorConfig::None,
                DetectionKind::Parity => DetectorConfig::parity(),
                DetectionKind::Crc => DetectorConfig::crc(),
            };
        }

        match &mut config.framing {
            FramerConfig::CharCounting { counter_size, .. } => {
                if let Some(value) = self.counter_size {
                    *counter_size = value;
                }
            }
            FramerConfig::ByteFlag {
                flag_byte,
                escape_byte,
            } => {
                if let Some(value) = self.flag_byte {
                    *flag_byte = value;
                }
                if let Some(value) = self.escape_byte {
                    *escape_byte = value;
                }
            }
            FramerConfig::BitsFlag { flag_bits } => {
                if let Some(value) = &self.flag_bits {
                    *flag_bits = value.clone();
                }
            }
            FramerConfig::None => {}
        }
        if self.counter_size.is_some()
            && !matches!(config.framing, FramerConfig::CharCounting { .. })
        {
            return Err(misplaced("--counter-size", "char-counting framing"));
        }
        if (self.flag_byte.is_some() || self.escape_byte.is_some())
            && !matches!(config.framing, FramerConfig::ByteFlag { .. })
        {
            return Err(misplaced("--flag-byte/--escape-byte", "byte-flag framing"));
        }
        if self.flag_bits.is_some() && !matches!(config.framing, FramerConfig::BitsFlag { .. }) {
            return Err(misplaced("--flag-bits", "bits-flag framing"));
        }

        match &mut config.detection {
            DetectorConfig::Parity { to_byte } => {
                if self.parity_to_byte.is_some() {
                    *to_byte = self.parity_to_byte;
                }
            }
            DetectorConfig::Crc { poly, trailer_size } => {
                if let Some(value) = self.poly {
                    *poly = value;
                }
                if let Some(value) = self.trailer_size {
                    *trailer_size = value;
                }
            }
            DetectorConfig::None => {}
        }
        if self.parity_to_byte.is_some()
            && !matches!(config.detection, DetectorConfig::Parity { .. })
        {
            return Err(misplaced("--parity-to-byte", "parity detection"));
        }
        if (self.poly.is_some() || self.trailer_size.is_some())
            && !matches!(config.detection, DetectorConfig::Crc { .. })
        {
            return Err(misplaced("--poly/--trailer-size", "crc detection"));
        }
        Ok(())
    }
}

fn misplaced(flag: &str, applies_to: &str) -> CliError {
    CliError::new(USAGE, format!("{flag} only applies to {applies_to}"))
}

/// Correction, modulation and channel options.
#[derive(Args, Debug, Default)]
pub struct PhyArgs {
    /// Forward error correction.
    #[arg(long, value_enum)]
    pub correction: Option<CorrectionKind>,
    /// Modulation scheme.
    #[arg(long, value_enum)]
    pub modulation: Option<Scheme>,
    /// Bits per second.
    #[arg(long, value_name = "HZ")]
    pub bit_rate: Option<f64>,
    /// Samples per second.
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<f64>,
    /// Carrier frequency for ASK, FSK, PSK and 8-QAM.
    #[arg(long, value_name = "HZ")]
    pub carrier_frequency: Option<f64>,
    /// FSK offset of the "1" tone (defaults to the carrier frequency).
    #[arg(long, value_name = "HZ")]
    pub delta_frequency: Option<f64>,
    /// Signal-to-noise ratio; noise is divided by it.
    #[arg(long)]
    pub snr: Option<f64>,
    /// Standard deviation of the channel noise.
    #[arg(long)]
    pub std_dev: Option<f64>,
    /// Seed the noise generator for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Payload bytes beyond this limit are dropped.
    #[arg(long, value_name = "BYTES")]
    pub max_frame_size: Option<usize>,
}

impl PhyArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(kind) = self.correction {
            config.correction = match kind {
                CorrectionKind::None => CorrectorConfig::None,
                CorrectionKind::Hamming => CorrectorConfig::Hamming,
            };
        }
        let modulation = &mut config.modulation;
        if let Some(scheme) = self.modulation {
            modulation.scheme = scheme.into();
        }
        if let Some(value) = self.bit_rate {
            modulation.bit_rate = value;
        }
        if let Some(value) = self.sample_rate {
            modulation.sample_rate = value;
        }
        if let Some(value) = self.carrier_frequency {
            modulation.carrier_frequency = value;
        }
        if self.delta_frequency.is_some() {
            modulation.delta_frequency = self.delta_frequency;
        }
        let channel = &mut config.channel;
        if let Some(value) = self.snr {
            channel.snr = value;
        }
        if let Some(value) = self.std_dev {
            channel.std_dev = value;
        }
        if self.seed.is_some() {
            channel.seed = self.seed;
        }
        if let Some(value) = self.max_frame_size {
            config.max_frame_size = value;
        }
    }
}

/// Load `--config` (or defaults) and apply command-line overrides.
pub fn resolve_config(
    path: Option<&Path>,
    link: &LinkArgs,
    phy: Option<&PhyArgs>,
) -> CliResult<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .map_err(|err| pipeline_error("failed to load configuration", err))?,
        None => PipelineConfig::default(),
    };
    link.apply(&mut config)?;
    if let Some(phy) = phy {
        phy.apply(&mut config);
    }
    config
        .validate()
        .map_err(|err| pipeline_error("invalid configuration", err))?;
    Ok(config)
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Text payload.
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,
    /// Read the payload from a file.
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
    /// JSON pipeline configuration; flags below override it.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub link: LinkArgs,
    #[command(flatten)]
    pub phy: PhyArgs,
    /// Write `time,sent,received` samples as CSV.
    #[arg(long, value_name = "PATH")]
    pub waveform_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Text payload.
    #[arg(long, conflicts_with_all = ["hex", "bits"])]
    pub text: Option<String>,
    /// Payload as hex bytes (whitespace allowed).
    #[arg(long, conflicts_with_all = ["text", "bits"])]
    pub hex: Option<String>,
    /// Payload as a bit string (any length for bits-flag framing).
    #[arg(long, conflicts_with_all = ["text", "hex"])]
    pub bits: Option<String>,
    /// JSON configuration supplying the framing and detection.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeframeArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Received frame as a bit string.
    #[arg(long)]
    pub bits: String,
    /// JSON configuration supplying the framing and detection.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// JSON configuration to load.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub link: LinkArgs,
    #[command(flatten)]
    pub phy: PhyArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_accepts_hex_and_decimal() {
        assert_eq!(parse_int("0x7E"), Ok(0x7E));
        assert_eq!(parse_int("126"), Ok(126));
        assert_eq!(parse_int("0x82608EDB"), Ok(0x8260_8EDB));
        assert!(parse_int("seven").is_err());
    }

    #[test]
    fn link_args_select_and_tune_components() {
        let args = LinkArgs {
            framing: Some(FramingKind::ByteFlag),
            detection: Some(DetectionKind::Crc),
            flag_byte: Some(0xAA),
            trailer_size: Some(16),
            poly: Some(0x8005),
            ..LinkArgs::default()
        };
        let mut config = PipelineConfig::default();
        args.apply(&mut config).unwrap();
        assert_eq!(
            config.framing,
            FramerConfig::ByteFlag {
                flag_byte: 0xAA,
                escape_byte: 0x7D
            }
        );
        assert_eq!(
            config.detection,
            DetectorConfig::Crc {
                poly: 0x8005,
                trailer_size: 16
            }
        );
    }

    #[test]
    fn link_args_reject_misplaced_options() {
        let args = LinkArgs {
            framing: Some(FramingKind::BitsFlag),
            counter_size: Some(2),
            ..LinkArgs::default()
        };
        let err = args.apply(&mut PipelineConfig::default()).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn phy_args_override_config() {
        let args = PhyArgs {
            modulation: Some(Scheme::Qam8),
            snr: Some(1000.0),
            seed: Some(9),
            ..PhyArgs::default()
        };
        let mut config = PipelineConfig::default();
        args.apply(&mut config);
        assert_eq!(config.modulation.scheme, ModulationScheme::Qam8);
        assert_eq!(config.channel.snr, 1000.0);
        assert_eq!(config.channel.seed, Some(9));
    }
}
