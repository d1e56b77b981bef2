//! Error handling module for towebm

use thiserror::Error;

/// Main error type for engine, configuration and I/O operations
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Encoder process could not be started
    #[error("Failed to start encoder: {message}")]
    EncoderSpawn { message: String },

    /// Configuration could not be read or written
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Output file naming error
    #[error("Failed to prepare output file: {message}")]
    OutputError { message: String },

    /// Diagnostic pattern compilation error
    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for towebm operations
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;
