/// Coarse classification of link-layer failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or undelimited input: missing markers, bad length, misalignment.
    Format,
    /// An error detector reported a non-zero syndrome.
    Integrity,
    /// A component was constructed with invalid parameters.
    Configuration,
}

/// Errors that can occur while framing, deframing or checking bit sequences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// A byte-oriented operation received a bit count that is not a multiple of 8.
    #[error("bit sequence length {len} is not a multiple of 8")]
    Misaligned { len: usize },

    /// The input is shorter than the fixed overhead of the framing format.
    #[error("frame too short ({len} bits, need at least {min})")]
    TooShort { len: usize, min: usize },

    /// No opening flag was found in the received bits.
    #[error("frame does not contain an opening flag")]
    MissingOpeningFlag,

    /// The opening flag was found but nothing terminates the frame.
    #[error("frame does not contain a closing flag")]
    MissingClosingFlag,

    /// The payload does not fit the length prefix.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The length prefix declares more bytes than the frame carries.
    #[error("declared length {declared} exceeds the {available} bytes available")]
    DeclaredLengthOverrun { declared: usize, available: usize },

    /// The error detector rejected the received bits.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Invalid constructor parameters.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl LinkError {
    /// Which family of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::Integrity(_) => ErrorKind::Integrity,
            LinkError::Configuration(_) => ErrorKind::Configuration,
            _ => ErrorKind::Format,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        LinkError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(LinkError::MissingOpeningFlag.kind(), ErrorKind::Format);
        assert_eq!(LinkError::Misaligned { len: 3 }.kind(), ErrorKind::Format);
        assert_eq!(
            LinkError::Integrity("parity".into()).kind(),
            ErrorKind::Integrity
        );
        assert_eq!(LinkError::config("bad").kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_integrity_message_carries_detector_text() {
        let err = LinkError::Integrity("CRC is not zero".into());
        assert_eq!(err.to_string(), "integrity check failed: CRC is not zero");
    }
}
