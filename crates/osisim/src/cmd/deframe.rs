use osisim_link::{
    bits_to_bytes, bits_to_text, pad_to_byte, parse_bit_string, to_bit_string, ErrorKind,
    LinkError,
};
use serde::Serialize;

use crate::cmd::frame::build_framer;
use crate::cmd::{resolve_config, DeframeArgs};
use crate::exit::{link_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{hex, print_report, OutputFormat, Row};

#[derive(Serialize)]
struct DeframeReport {
    framing: &'static str,
    frame_bits: usize,
    payload: String,
    payload_hex: String,
    payload_text: String,
}

pub fn run(args: DeframeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = resolve_config(args.config.as_deref(), &args.link, None)?;
    let framer = build_framer(&config)?;
    let frame = parse_bit_string(&args.bits).map_err(|err| link_error("invalid --bits", err))?;

    let payload = framer.deframe_data(&frame).map_err(receive_error)?;

    let mut padded = payload.clone();
    pad_to_byte(&mut padded);
    let bytes = bits_to_bytes(&padded).map_err(|err| link_error("internal error", err))?;

    let report = DeframeReport {
        framing: framer.name(),
        frame_bits: frame.len(),
        payload: to_bit_string(&payload),
        payload_hex: hex(&bytes),
        payload_text: bits_to_text(&payload),
    };
    let rows: Vec<Row> = vec![
        ("framing", report.framing.to_string()),
        ("payload", report.payload.clone()),
        ("payload hex", report.payload_hex.clone()),
        ("payload text", report.payload_text.clone()),
    ];
    print_report(&report, &rows, &bytes, format);
    Ok(SUCCESS)
}

/// Receiver-side failures are reported the way the pipeline reports them.
fn receive_error(err: LinkError) -> CliError {
    match err {
        LinkError::Integrity(message) => {
            CliError::new(DATA_INVALID, format!("Error detected: {message}"))
        }
        err if err.kind() == ErrorKind::Configuration => link_error("deframing failed", err),
        err => CliError::new(DATA_INVALID, format!("Deframing error: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn receive_errors_use_pipeline_wording() {
        let err = receive_error(LinkError::MissingClosingFlag);
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(
            err.message,
            "Deframing error: frame does not contain a closing flag"
        );

        let err = receive_error(LinkError::Integrity("parity mismatch".into()));
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.message, "Error detected: parity mismatch");

        assert_eq!(
            receive_error(LinkError::Configuration("bad".into())).code,
            USAGE
        );
    }
}
