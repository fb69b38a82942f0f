use std::fmt;

use osisim_link::{
    bits_to_bytes, bytes_to_bits, pad_to_byte, to_bit_string, truncate_to_byte, Correction,
    DetectorConfig, FramerConfig, Framer, Hamming,
};
use osisim_phy::{Channel, Modem};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::Result;

/// Outcome of one optional processing stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The stage is not configured.
    Skipped,
    /// The stage produced these bits.
    Done(Vec<bool>),
    /// The stage failed; `fallback` holds best-effort bits when there are any.
    Failed {
        message: String,
        fallback: Option<Vec<bool>>,
    },
}

impl Stage {
    /// The bits this stage handed on, if any.
    pub fn bits(&self) -> Option<&[bool]> {
        match self {
            Stage::Skipped => None,
            Stage::Done(bits) => Some(bits),
            Stage::Failed { fallback, .. } => fallback.as_deref(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Stage::Failed { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Skipped => f.write_str("None"),
            Stage::Done(bits) => f.write_str(&to_bit_string(bits)),
            Stage::Failed { message, .. } => f.write_str(message),
        }
    }
}

/// What happened to a received frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveStatus {
    /// The payload passed every configured stage.
    Delivered,
    /// The framer could not delimit the frame; later stages did not run.
    DeframeFailed(String),
    /// The error detector rejected the frame; the payload is best effort.
    IntegrityFailed(String),
}

impl ReceiveStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ReceiveStatus::Delivered)
    }
}

impl fmt::Display for ReceiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiveStatus::Delivered => f.write_str("delivered"),
            ReceiveStatus::DeframeFailed(msg) => write!(f, "Deframing error: {msg}"),
            ReceiveStatus::IntegrityFailed(msg) => write!(f, "Error detected: {msg}"),
        }
    }
}

/// Sender-side report.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    /// Payload bytes actually sent, after the frame size limit.
    pub payload: Vec<u8>,
    pub data_bits: Vec<bool>,
    /// Frame including the detector trailer.
    pub framed: Stage,
    /// Hamming codeword of the frame.
    pub encoded: Stage,
    pub waveform: Vec<f64>,
}

impl Transmission {
    /// Bits handed to the modulator.
    pub fn line_bits(&self) -> &[bool] {
        self.encoded
            .bits()
            .or_else(|| self.framed.bits())
            .unwrap_or(&self.data_bits)
    }
}

/// Receiver-side report.
#[derive(Debug, Clone, PartialEq)]
pub struct Reception {
    /// Waveform as it came out of the channel.
    pub waveform: Vec<f64>,
    pub demodulated: Vec<bool>,
    /// Data bits after Hamming correction.
    pub decoded: Stage,
    pub correction: Option<Correction>,
    /// Frame body (payload plus trailer) after deframing.
    pub deframed: Stage,
    /// Payload after the detector check and trailer removal.
    pub checked: Stage,
    /// Final payload bits; `None` when deframing failed.
    pub bits: Option<Vec<bool>>,
    /// `bits` packed into bytes, a trailing partial byte zero-padded.
    pub payload: Option<Vec<u8>>,
    pub status: ReceiveStatus,
}

/// One configured sender, channel and receiver.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    framer: Option<Box<dyn Framer>>,
    corrector: Option<Hamming>,
    modem: Modem,
    channel: Channel,
}

impl Pipeline {
    /// Validate `config` and build every component.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let framer = config.framing.build(&config.detection)?;
        if framer.is_none() && config.detection != DetectorConfig::None {
            warn!("error detection is configured without framing and will not be used");
        }
        let corrector = config.correction.build();
        let modem = config.modulation.build()?;
        let channel = config.channel.build()?;
        debug!(
            framer = framer.as_ref().map(|f| f.name()),
            detector = framer.as_ref().and_then(|f| f.detector()).map(|d| d.name()),
            hamming = corrector.is_some(),
            modem = modem.name(),
            "pipeline configured"
        );
        Ok(Self {
            config,
            framer,
            corrector,
            modem,
            channel,
        })
    }

    /// A pipeline with default configuration and the given framing.
    pub fn with_framing(framing: FramerConfig) -> Result<Self> {
        Self::new(PipelineConfig {
            framing,
            ..PipelineConfig::default()
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replace every component. On error the current pipeline is left unchanged.
    pub fn reconfigure(&mut self, config: PipelineConfig) -> Result<()> {
        *self = Self::new(config)?;
        Ok(())
    }

    pub fn modem(&self) -> &Modem {
        &self.modem
    }

    /// Sample instants for a waveform of `len` samples.
    pub fn time_axis(&self, len: usize) -> Vec<f64> {
        self.modem.time_axis(len)
    }

    /// Frame, encode and modulate `payload`, then push it into the channel.
    pub fn send(&mut self, payload: &[u8]) -> Result<Transmission> {
        let limit = self.config.max_frame_size;
        if payload.len() > limit {
            debug!(len = payload.len(), limit, "payload truncated to max frame size");
        }
        let payload = payload[..payload.len().min(limit)].to_vec();
        let data_bits = bytes_to_bits(&payload);

        let framed = match &self.framer {
            Some(framer) => Stage::Done(framer.frame_data(&data_bits)?),
            None => Stage::Skipped,
        };
        let frame = framed.bits().unwrap_or(&data_bits);

        let encoded = match &self.corrector {
            Some(hamming) => Stage::Done(hamming.add_error_detection(frame)),
            None => Stage::Skipped,
        };
        let line = encoded.bits().unwrap_or(frame);

        let waveform = self.modem.modulate(line);
        debug!(
            payload = payload.len(),
            line_bits = line.len(),
            samples = waveform.len(),
            "modulated"
        );
        self.channel.send(&waveform);

        Ok(Transmission {
            payload,
            data_bits,
            framed,
            encoded,
            waveform,
        })
    }

    /// Pull the last transmission out of the channel and decode it.
    pub fn receive(&self) -> Reception {
        self.decode(self.channel.receive())
    }

    /// Send then receive, as one round trip.
    pub fn transmit(&mut self, payload: &[u8]) -> Result<(Transmission, Reception)> {
        let sent = self.send(payload)?;
        Ok((sent, self.receive()))
    }

    /// Run the receiver chain over an arbitrary waveform.
    pub fn decode(&self, waveform: Vec<f64>) -> Reception {
        let demodulated = self.modem.demodulate(&waveform);

        let (decoded, correction) = match &self.corrector {
            Some(hamming) => {
                let (codeword, correction) = hamming.correct(&demodulated);
                (
                    Stage::Done(hamming.remove_error_detection(&codeword)),
                    Some(correction),
                )
            }
            None => (Stage::Skipped, None),
        };

        let mut bits = decoded.bits().unwrap_or(&demodulated).to_vec();
        if self.framer.as_ref().is_none_or(|f| f.byte_oriented()) {
            truncate_to_byte(&mut bits);
        }

        let mut reception = Reception {
            waveform,
            demodulated: demodulated.clone(),
            decoded,
            correction,
            deframed: Stage::Skipped,
            checked: Stage::Skipped,
            bits: None,
            payload: None,
            status: ReceiveStatus::Delivered,
        };

        let Some(framer) = &self.framer else {
            reception.payload = Some(pack(&bits));
            reception.bits = Some(bits);
            return reception;
        };

        let body = match framer.decapsulate(&bits) {
            Ok(body) => body,
            Err(err) => {
                let message = err.to_string();
                warn!(framer = framer.name(), error = %message, "deframing failed");
                reception.deframed = Stage::Failed {
                    message: message.clone(),
                    fallback: None,
                };
                reception.status = ReceiveStatus::DeframeFailed(message);
                return reception;
            }
        };
        reception.deframed = Stage::Done(body.clone());

        let result = match framer.detector() {
            Some(detector) => {
                let verdict = match detector.check(&body) {
                    Some(message) => Err(message),
                    None => detector.remove_trailer(&body).map_err(|e| e.to_string()),
                };
                match verdict {
                    Ok(payload) => {
                        reception.checked = Stage::Done(payload.clone());
                        payload
                    }
                    Err(message) => {
                        warn!(detector = detector.name(), error = %message, "integrity check failed");
                        let fallback = detector.remove_trailer(&body).unwrap_or_else(|_| body.clone());
                        reception.checked = Stage::Failed {
                            message: message.clone(),
                            fallback: Some(fallback.clone()),
                        };
                        reception.status = ReceiveStatus::IntegrityFailed(message);
                        fallback
                    }
                }
            }
            None => body,
        };

        reception.payload = Some(pack(&result));
        reception.bits = Some(result);
        reception
    }
}

fn pack(bits: &[bool]) -> Vec<u8> {
    let mut bits = bits.to_vec();
    pad_to_byte(&mut bits);
    bits_to_bytes(&bits).map(|b| b.to_vec()).unwrap_or_default()
}
