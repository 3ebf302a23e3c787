//! Error types for the Lumasonic toolkit

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum LsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Invalid thread mode: {0}")]
    InvalidThreadMode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Result type alias
pub type LsResult<T> = Result<T, LsError>;
