use osisim_link::{
    bits_to_bytes, bytes_to_bits, parse_bit_string, text_to_bits, to_bit_string, Framer,
};
use osisim_pipeline::PipelineConfig;
use serde::Serialize;
use tracing::debug;

use crate::cmd::{resolve_config, FrameArgs};
use crate::exit::{link_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{hex, print_report, OutputFormat, Row};

#[derive(Serialize)]
struct FrameReport {
    framing: &'static str,
    detection: Option<&'static str>,
    payload_bits: usize,
    frame_bits: usize,
    frame: String,
    /// Only present when the frame is a whole number of bytes.
    frame_hex: Option<String>,
}

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let config = resolve_config(args.config.as_deref(), &args.link, None)?;
    let framer = build_framer(&config)?;

    let payload = match (&args.text, &args.hex, &args.bits) {
        (Some(text), _, _) => text_to_bits(text),
        (_, Some(digits), _) => bytes_to_bits(&parse_hex(digits)?),
        (_, _, Some(bits)) => {
            parse_bit_string(bits).map_err(|err| link_error("invalid --bits", err))?
        }
        _ => {
            return Err(CliError::new(
                USAGE,
                "one of --text, --hex or --bits is required",
            ))
        }
    };

    let frame = framer
        .frame_data(&payload)
        .map_err(|err| link_error("framing failed", err))?;
    debug!(framer = framer.name(), frame_bits = frame.len(), "frame built");

    let packed = bits_to_bytes(&frame).ok();
    let report = FrameReport {
        framing: framer.name(),
        detection: framer.detector().map(|d| d.name()),
        payload_bits: payload.len(),
        frame_bits: frame.len(),
        frame: to_bit_string(&frame),
        frame_hex: packed.as_deref().map(hex),
    };

    let mut rows: Vec<Row> = vec![
        ("framing", report.framing.to_string()),
        ("detection", report.detection.unwrap_or("None").to_string()),
        ("payload bits", report.payload_bits.to_string()),
        ("frame", report.frame.clone()),
    ];
    if let Some(frame_hex) = &report.frame_hex {
        rows.push(("frame hex", frame_hex.clone()));
    }
    let raw = match &packed {
        Some(bytes) => bytes.to_vec(),
        None => report.frame.clone().into_bytes(),
    };
    print_report(&report, &rows, &raw, format);
    Ok(SUCCESS)
}

/// The framer described by `config`, which must name one.
pub(crate) fn build_framer(config: &PipelineConfig) -> CliResult<Box<dyn Framer>> {
    config
        .framing
        .build(&config.detection)
        .map_err(|err| link_error("invalid configuration", err))?
        .ok_or_else(|| CliError::new(USAGE, "no framing configured (use --framing)"))
}

/// Hex digits to bytes; whitespace and an optional `0x` prefix are ignored.
fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let digits: Vec<char> = trimmed
        .strip_prefix("0x")
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "--hex needs an even number of digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let text: String = pair.iter().collect();
            u8::from_str_radix(&text, 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte: {text}")))
        })
        .collect()
}
