//! Error type shared by the playground core, service and server.

use std::fmt;

/// All errors that can occur while serving the playground.
#[derive(Debug)]
pub enum PlaygroundError {
    /// A request or configuration value is out of range.
    Configuration(String),
    /// The operation needs more data points than are available.
    InsufficientData(String),
    /// A point id does not exist in the store.
    NotFound { id: u64 },
    /// Training diverged to a non-finite loss.
    Numerical { epoch: usize, loss: f64 },
    /// Training exceeded its time budget.
    Timeout { epoch: usize, limit_secs: f64 },
    /// Training was cancelled from outside.
    Cancelled { epoch: usize },
    /// An underlying I/O error.
    Io(std::io::Error),
    /// A request body could not be decoded or a response encoded.
    Serialization(serde_json::Error),
}

impl PlaygroundError {
    /// Machine-readable kind used in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::InsufficientData(_) => "insufficient_data",
            Self::NotFound { .. } => "not_found",
            Self::Numerical { .. } => "numerical_error",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "invalid_body",
        }
    }

    /// HTTP status code the error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) => 400,
            Self::InsufficientData(_) => 422,
            Self::NotFound { .. } => 404,
            Self::Numerical { .. } => 500,
            Self::Timeout { .. } => 503,
            Self::Cancelled { .. } => 503,
            Self::Io(_) => 500,
            Self::Serialization(_) => 400,
        }
    }
}

impl fmt::Display for PlaygroundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::InsufficientData(msg) => write!(f, "insufficient data: {msg}"),
            Self::NotFound { id } => write!(f, "point with id {id} not found"),
            Self::Numerical { epoch, loss } => {
                write!(f, "training diverged at epoch {epoch} (loss = {loss})")
            }
            Self::Timeout { epoch, limit_secs } => {
                write!(f, "training timed out after {limit_secs}s at epoch {epoch}")
            }
            Self::Cancelled { epoch } => write!(f, "training cancelled at epoch {epoch}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Serialization(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl std::error::Error for PlaygroundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlaygroundError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PlaygroundError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;
