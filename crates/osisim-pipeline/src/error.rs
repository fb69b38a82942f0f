use std::path::PathBuf;

use osisim_link::{ErrorKind, LinkError};
use osisim_phy::PhyError;

/// Errors that can occur while configuring or driving a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A link-layer component rejected its parameters or its input.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// A physical-layer component rejected its parameters.
    #[error(transparent)]
    Phy(#[from] PhyError),

    /// The components are individually valid but do not fit together.
    #[error("invalid pipeline configuration: {0}")]
    Configuration(String),

    /// A configuration document is not valid JSON for [`crate::PipelineConfig`].
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// `true` for errors caused by bad parameters rather than bad data.
    pub fn is_configuration(&self) -> bool {
        match self {
            PipelineError::Link(e) => e.kind() == ErrorKind::Configuration,
            PipelineError::Phy(_) | PipelineError::Configuration(_) | PipelineError::Json(_) => {
                true
            }
            PipelineError::Io { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
