use thiserror::Error;

/// Stride tracker error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration field cannot change after construction: {0}")]
    ImmutableConfig(&'static str),

    #[error("Failed to acquire {0} lock")]
    LockPoisoned(&'static str),

    #[error("Fusion worker stopped")]
    WorkerStopped,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for fallible fusion operations
pub type FusionResult<T> = Result<T, FusionError>;

impl From<std::io::Error> for FusionError {
    fn from(err: std::io::Error) -> Self {
        FusionError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FusionError {
    fn from(err: serde_json::Error) -> Self {
        FusionError::Parse(err.to_string())
    }
}
