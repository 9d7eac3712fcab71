//! Registry error types
//!
//! Shared error taxonomy for registry, room table, relay, and queue
//! operations.

use super::connection::ConnectionId;

/// Error type for registry and relay operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Room name rejected (empty or over the configured length bound)
    InvalidRoomName(String),
    /// Connection attempted a relay before joining a room
    NotInRoom(ConnectionId),
    /// Connection is not present in the registry
    ConnectionNotFound(ConnectionId),
    /// Outbound queue has been torn down
    QueueClosed,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::InvalidRoomName(name) => {
                write!(f, "Invalid room name: {:?}", name)
            }
            RegistryError::NotInRoom(id) => {
                write!(f, "Connection {} is not in a room", id)
            }
            RegistryError::ConnectionNotFound(id) => {
                write!(f, "Connection not found: {}", id)
            }
            RegistryError::QueueClosed => write!(f, "Outbound queue closed"),
        }
    }
}

impl std::error::Error for RegistryError {}
