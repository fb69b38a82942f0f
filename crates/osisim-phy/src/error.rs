/// Errors raised while constructing physical-layer components.
///
/// Modulation, demodulation and channel transfer cannot fail once a
/// component exists; every variant here is a configuration problem.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhyError {
    /// A rate is zero, negative, or not finite.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    /// A frequency is outside `(0, sample_rate / 2)`.
    #[error("{name} of {value} Hz is invalid: {reason}")]
    InvalidFrequency {
        name: &'static str,
        value: f64,
        reason: String,
    },

    /// The signal-to-noise ratio is not strictly positive.
    #[error("SNR must be strictly positive, got {0}")]
    InvalidSnr(f64),

    /// The noise standard deviation is negative or not finite.
    #[error("noise standard deviation must be finite and non-negative, got {0}")]
    InvalidNoise(f64),

    /// Any other invalid parameter combination.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PhyError>;
