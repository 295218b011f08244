use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Missing required header field: {0}")]
    MissingField(String),

    #[error("Invalid value '{value}' for header field '{field}'")]
    InvalidField { field: String, value: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Header declares no sampletimes breakpoints")]
    EmptySampleTimes,
}

pub type Result<T> = std::result::Result<T, LayError>;
