//! Error types for the API

use thiserror::Error;

/// Error type for reconciliation requests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid configuration or scoring profile
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed request input; the whole request is rejected before any
    /// matching or aggregation runs
    #[error("invalid input: {0}")]
    InvalidInput(#[from] crate::domain::DomainError),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, Error>;
