// Domain errors - Error types for the domain layer

use std::fmt;

use crate::error::EncodeError;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// File not found
    FileNotFound(String),
    /// Encoder binary missing
    EncoderMissing(String),
    /// Probe could not run
    ProbeFailed(String),
    /// File system operation failed
    FsFail(String),
    /// Configuration could not be loaded
    ConfigError(String),
    /// Job state machine violation
    InvalidTransition(String),
    /// Processing error
    ProcessingError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            DomainError::EncoderMissing(msg) => write!(f, "Encoder missing: {}", msg),
            DomainError::ProbeFailed(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::InvalidTransition(msg) => write!(f, "Invalid state transition: {}", msg),
            DomainError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<EncodeError> for DomainError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::EncoderSpawn { message } => DomainError::ProcessingError(message),
            EncodeError::Config { message } => DomainError::ConfigError(message),
            EncodeError::TomlError(e) => DomainError::ConfigError(e.to_string()),
            EncodeError::OutputError { message } => DomainError::FsFail(message),
            EncodeError::IoError(e) => DomainError::FsFail(e.to_string()),
            EncodeError::PatternError(e) => DomainError::ProcessingError(e.to_string()),
        }
    }
}
