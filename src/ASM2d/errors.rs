use std::io;
use thiserror::Error;

/// Errors of the configuration layer. The numerical core never returns them: convergence
/// problems are reported through `SolverOutcome` and the multi-zone result instead.
#[derive(Debug, Error)]
pub enum ASMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Unknown state component: {0}")]
    UnknownComponent(String),
    #[error("Unknown zone type: {0} (expected anaerobic, anoxic or aerobic)")]
    UnknownZoneType(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse task file: {0}")]
    SerdeError(#[from] serde_json::Error),
}
