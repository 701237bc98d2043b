//! Error types for carnival-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using carnival-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in carnival-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No authenticated session
    #[error("Authentication required")]
    AuthRequired,

    /// Note absent or owned by another identity; the two are never distinguished
    #[error("Note not found")]
    NotFoundOrForbidden,

    /// Backend rejected the request or returned an unusable payload
    #[error("Backend error: {0}")]
    Backend(String),

    /// Transport failure talking to the backend
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Auth provider error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error is a transient backend failure (network or query)
    /// rather than an authorization outcome.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Backend(_) | Self::Http(_) | Self::Serialization(_) => true,
            Self::Auth(error) => error.is_transient(),
            _ => false,
        }
    }
}
