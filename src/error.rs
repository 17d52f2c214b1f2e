use thiserror::Error;

/// Errors produced by network construction, training and persistence.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Input or target length does not match the configured layer sizes.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Storage failure while saving or loading, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
