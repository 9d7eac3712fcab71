//! Connection registry implementation
//!
//! The central registry of live connections. Registration allocates the
//! connection's identity and outbound queue; unregistration closes the
//! queue and is safe to invoke concurrently with in-flight relays targeting
//! the connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::config::RegistryConfig;
use super::connection::{ConnectionEntry, ConnectionId};

/// Central registry for all live connections
///
/// Thread-safe via `RwLock`; mutation is atomic with respect to concurrent
/// lookups from the relay's fan-out path.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<ConnectionEntry>>>,

    /// Next connection id to allocate
    next_id: AtomicU64,

    config: RegistryConfig,
}

impl ConnectionRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new connection
    ///
    /// Allocates a fresh id and an outbound queue. Always succeeds.
    pub async fn register(&self) -> Arc<ConnectionEntry> {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(ConnectionEntry::new(
            id,
            self.config.outbound_queue_capacity,
        ));

        let mut connections = self.connections.write().await;
        connections.insert(id, Arc::clone(&entry));

        tracing::info!(conn = %id, total = connections.len(), "Connection registered");

        entry
    }

    /// Unregister a connection
    ///
    /// Idempotent: a no-op if the connection is already absent. Closes the
    /// connection's outbound queue, unblocking its drain task. Callers must
    /// remove room membership first (the session manager does) so the room
    /// table never holds a member the registry does not know.
    pub async fn unregister(&self, id: ConnectionId) {
        let removed = {
            let mut connections = self.connections.write().await;
            connections.remove(&id)
        };

        if let Some(entry) = removed {
            entry.mark_dead();
            entry.queue().close().await;
            tracing::info!(conn = %id, "Connection unregistered");
        }
    }

    /// Look up a connection by id
    pub async fn lookup(&self, id: ConnectionId) -> Option<Arc<ConnectionEntry>> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Number of registered connections
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_allocates_unique_ids() {
        let registry = ConnectionRegistry::new();

        let a = registry.register().await;
        let b = registry.register().await;

        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_lookup() {
        let registry = ConnectionRegistry::new();

        let entry = registry.register().await;
        let found = registry.lookup(entry.id()).await;
        assert!(found.is_some());

        assert!(registry.lookup(ConnectionId::new(999)).await.is_none());
    }

    #[tokio::test]
    async fn test_unregister_closes_queue() {
        let registry = ConnectionRegistry::new();

        let entry = registry.register().await;
        registry.unregister(entry.id()).await;

        assert!(registry.lookup(entry.id()).await.is_none());
        assert!(!entry.is_alive());
        assert!(entry.queue().is_closed().await);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();

        let entry = registry.register().await;
        registry.unregister(entry.id()).await;
        registry.unregister(entry.id()).await;

        assert!(registry.is_empty().await);
    }
}
