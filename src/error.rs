use std::path::PathBuf;

use thiserror::Error;

/// Common error type for snmplog components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink '{path}' error: {source}")]
    Sink {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias using snmplog's Error.
pub type Result<T> = std::result::Result<T, Error>;
