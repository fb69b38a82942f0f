use std::fmt;
use std::io;

use osisim_link::{ErrorKind, LinkError};
use osisim_pipeline::PipelineError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
/// The received data failed deframing or an integrity check.
pub const DATA_INVALID: i32 = 60;
/// Bad flags or an invalid configuration.
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn link_error(context: &str, err: LinkError) -> CliError {
    let code = match err.kind() {
        ErrorKind::Configuration => USAGE,
        ErrorKind::Format | ErrorKind::Integrity => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn pipeline_error(context: &str, err: PipelineError) -> CliError {
    match err {
        PipelineError::Link(err) => link_error(context, err),
        PipelineError::Io { source, path } => {
            io_error(&format!("{context}: {}", path.display()), source)
        }
        other if other.is_configuration() => CliError::new(USAGE, format!("{context}: {other}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
