//! Error types for the Blinko clipper.

use thiserror::Error;

/// Result type alias using the clipper's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for clipper operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Required endpoint or credential is missing; the user must fix settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input violates an invariant (blank name, deleting the last template).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A remote call answered with a non-success HTTP status.
    #[error("Remote API returned {status}: {message}")]
    RemoteApi { status: u16, message: String },

    /// A remote call succeeded but the body had an unexpected shape.
    #[error("Unexpected response format: {0}")]
    ResponseFormat(String),

    /// A configured endpoint could not be parsed as a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP/network request failed before a status was received
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The settings store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by a remote API failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}
