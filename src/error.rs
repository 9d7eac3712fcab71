//! Crate-level error type
//!
//! Server-surface errors. Component-level failures (room table, queues)
//! use [`crate::registry::RegistryError`] and are wrapped here when they
//! cross the server boundary.

use crate::registry::RegistryError;

/// Error type for server operations
#[derive(Debug)]
pub enum Error {
    /// I/O error from the underlying socket or listener
    Io(std::io::Error),
    /// WebSocket protocol error
    WebSocket(tokio_tungstenite::tungstenite::Error),
    /// Registry or room table error
    Registry(RegistryError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::WebSocket(e) => Some(e),
            Error::Registry(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(err)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Error::Registry(err)
    }
}

/// Result alias for server operations
pub type Result<T> = std::result::Result<T, Error>;
