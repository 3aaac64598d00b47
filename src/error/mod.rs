//! Error handling module for Scrubcut

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for library-level Scrubcut operations
#[derive(Error, Debug)]
pub enum ScrubcutError {
    /// Session, job or adapter error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("Failed to render configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// Encoder output could not be decoded
    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ScrubcutError> for DomainError {
    fn from(error: ScrubcutError) -> Self {
        match error {
            ScrubcutError::Domain(domain) => domain,
            ScrubcutError::ConfigParse(e) => DomainError::ConfigInvalid(e.to_string()),
            ScrubcutError::ConfigRender(e) => DomainError::ConfigInvalid(e.to_string()),
            ScrubcutError::Json(e) => DomainError::ProbeFailed(e.to_string()),
            ScrubcutError::IoError(e) => DomainError::FsFail(e.to_string()),
        }
    }
}

/// Result type alias for Scrubcut operations
pub type ScrubcutResult<T> = std::result::Result<T, ScrubcutError>;
