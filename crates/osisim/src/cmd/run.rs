use std::fmt::Write as _;
use std::path::Path;

use osisim_link::{bits_to_text, to_bit_string, Correction};
use osisim_pipeline::{Reception, Stage, Transmission};
use serde::Serialize;
use tracing::info;

use crate::cmd::{resolve_config, RunArgs};
use crate::exit::{io_error, pipeline_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{hex, payload_preview, print_report, OutputFormat, Row};

/// A stage as reported: `null` when skipped, a bit string, or the failure.
#[derive(Serialize)]
#[serde(untagged)]
enum StageReport {
    Bits(String),
    Failed {
        error: String,
        fallback: Option<String>,
    },
}

impl StageReport {
    fn from_stage(stage: &Stage) -> Option<Self> {
        match stage {
            Stage::Skipped => None,
            Stage::Done(bits) => Some(Self::Bits(to_bit_string(bits))),
            Stage::Failed { message, fallback } => Some(Self::Failed {
                error: message.clone(),
                fallback: fallback.as_deref().map(to_bit_string),
            }),
        }
    }
}

#[derive(Serialize)]
struct RunReport {
    payload: String,
    payload_hex: String,
    data_bits: String,
    framed: Option<StageReport>,
    encoded: Option<StageReport>,
    modulation: &'static str,
    samples: usize,
    demodulated: String,
    decoded: Option<StageReport>,
    correction: Option<String>,
    deframed: Option<StageReport>,
    checked: Option<StageReport>,
    received_bits: Option<String>,
    received_text: Option<String>,
    received_hex: Option<String>,
    status: String,
    delivered: bool,
}

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = match (&args.text, &args.file) {
        (Some(text), _) => text.clone().into_bytes(),
        (None, Some(path)) => std::fs::read(path)
            .map_err(|err| io_error(&format!("failed to read {}", path.display()), err))?,
        (None, None) => return Err(CliError::new(USAGE, "one of --text or --file is required")),
    };

    let config = resolve_config(args.config.as_deref(), &args.link, Some(&args.phy))?;
    let mut pipeline = config
        .build()
        .map_err(|err| pipeline_error("invalid configuration", err))?;
    let (sent, received) = pipeline
        .transmit(&payload)
        .map_err(|err| pipeline_error("transmission failed", err))?;
    info!(
        payload = sent.payload.len(),
        samples = sent.waveform.len(),
        status = %received.status,
        "transmission complete"
    );

    if let Some(path) = &args.waveform_out {
        let time = pipeline.time_axis(sent.waveform.len());
        write_waveform(path, &time, &sent.waveform, &received.waveform)?;
    }

    let report = build_report(&sent, &received, pipeline.modem().name());
    let rows = report_rows(&sent, &received, &report);
    let raw = received.payload.clone().unwrap_or_default();
    print_report(&report, &rows, &raw, format);

    if received.status.is_delivered() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn build_report(sent: &Transmission, received: &Reception, modulation: &'static str) -> RunReport {
    RunReport {
        payload: payload_preview(&sent.payload),
        payload_hex: hex(&sent.payload),
        data_bits: to_bit_string(&sent.data_bits),
        framed: StageReport::from_stage(&sent.framed),
        encoded: StageReport::from_stage(&sent.encoded),
        modulation,
        samples: sent.waveform.len(),
        demodulated: to_bit_string(&received.demodulated),
        decoded: StageReport::from_stage(&received.decoded),
        correction: received.correction.map(describe_correction),
        deframed: StageReport::from_stage(&received.deframed),
        checked: StageReport::from_stage(&received.checked),
        received_bits: received.bits.as_deref().map(to_bit_string),
        received_text: received.bits.as_deref().map(bits_to_text),
        received_hex: received.payload.as_deref().map(hex),
        status: received.status.to_string(),
        delivered: received.status.is_delivered(),
    }
}

fn report_rows(sent: &Transmission, received: &Reception, report: &RunReport) -> Vec<Row> {
    let mut rows: Vec<Row> = vec![
        ("payload", report.payload.clone()),
        ("data bits", report.data_bits.clone()),
        ("framed", sent.framed.to_string()),
        ("hamming encoded", sent.encoded.to_string()),
        ("modulation", report.modulation.to_string()),
        ("samples", report.samples.to_string()),
        ("demodulated", report.demodulated.clone()),
        ("hamming decoded", received.decoded.to_string()),
    ];
    if let Some(correction) = &report.correction {
        rows.push(("correction", correction.clone()));
    }
    rows.push(("deframed", received.deframed.to_string()));
    rows.push(("checked", received.checked.to_string()));
    rows.push((
        "received",
        report.received_text.clone().unwrap_or_else(|| "None".into()),
    ));
    rows.push(("status", report.status.clone()));
    rows
}

fn describe_correction(correction: Correction) -> String {
    match correction {
        Correction::Clean => "clean".to_string(),
        Correction::Flipped(position) => format!("flipped bit {position}"),
        Correction::OutOfRange(syndrome) => format!("syndrome {syndrome} out of range"),
    }
}

/// Write `time,sent,received` rows; the shorter waveform leaves blanks.
fn write_waveform(path: &Path, time: &[f64], sent: &[f64], received: &[f64]) -> CliResult<()> {
    let mut csv = String::from("time,sent,received\n");
    for (i, t) in time.iter().enumerate() {
        let _ = write!(csv, "{t}");
        for series in [sent, received] {
            match series.get(i) {
                Some(value) => {
                    let _ = write!(csv, ",{value}");
                }
                None => csv.push(','),
            }
        }
        csv.push('\n');
    }
    std::fs::write(path, csv)
        .map_err(|err| io_error(&format!("failed to write {}", path.display()), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_report_shapes() {
        assert!(StageReport::from_stage(&Stage::Skipped).is_none());

        let done = StageReport::from_stage(&Stage::Done(vec![true, false])).unwrap();
        assert_eq!(serde_json::to_value(&done).unwrap(), serde_json::json!("10"));

        let failed = StageReport::from_stage(&Stage::Failed {
            message: "CRC is not equal to zero".into(),
            fallback: Some(vec![false, true]),
        })
        .unwrap();
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"error": "CRC is not equal to zero", "fallback": "01"})
        );
    }

    #[test]
    fn correction_descriptions() {
        assert_eq!(describe_correction(Correction::Clean), "clean");
        assert_eq!(describe_correction(Correction::Flipped(13)), "flipped bit 13");
    }

    #[test]
    fn waveform_csv_layout() {
        let dir = std::env::temp_dir().join(format!("osisim-wave-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("wave.csv");
        write_waveform(&path, &[0.0, 0.5], &[1.0, -1.0], &[0.75]).unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv, "time,sent,received\n0,1,0.75\n0.5,-1,\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
