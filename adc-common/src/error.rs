//! Common error types for ADC

use thiserror::Error;

/// Common result type for ADC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the converter
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error (fatal)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input content, e.g. unexpected header or unparseable line (fatal)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio payload could not be decoded
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio could not be encoded or written
    #[error("Audio encode error: {0}")]
    Encode(String),

    /// Annotation value not supported by the record's data type
    #[error("Unsupported annotation type: {0}")]
    InvalidAnnotationType(String),

    /// Data type code not present in the registry
    #[error("Unsupported data type: {0}")]
    UnknownDataType(String),

    /// Stage used before initialize() was called
    #[error("Not initialized: {0}")]
    NotInitialized(String),
}
