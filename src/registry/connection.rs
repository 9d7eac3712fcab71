//! Connection identity and per-connection registry entry

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::queue::OutboundQueue;
use crate::stats::SessionCounters;

/// Opaque unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create an id from a raw value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry for a single live connection in the registry
///
/// Owned by the [`ConnectionRegistry`](super::ConnectionRegistry) and shared
/// with the connection's tasks behind `Arc`. Room membership is tracked by
/// the room table, not here; the entry holds only transport-side state.
pub struct ConnectionEntry {
    id: ConnectionId,

    /// Outbound queue drained by the connection's transmit task
    queue: Arc<OutboundQueue>,

    /// Cleared when the connection is unregistered
    alive: AtomicBool,

    connected_at: Instant,

    /// Per-session traffic counters
    pub counters: SessionCounters,
}

impl ConnectionEntry {
    pub(super) fn new(id: ConnectionId, queue_capacity: usize) -> Self {
        Self {
            id,
            queue: Arc::new(OutboundQueue::new(queue_capacity)),
            alive: AtomicBool::new(true),
            connected_at: Instant::now(),
            counters: SessionCounters::new(),
        }
    }

    /// Connection id
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The connection's outbound queue
    pub fn queue(&self) -> &Arc<OutboundQueue> {
        &self.queue
    }

    /// Whether the connection is still registered
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub(super) fn mark_dead(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Time since the connection registered
    pub fn uptime(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }

    /// Current session statistics
    pub fn stats(&self) -> crate::stats::SessionStats {
        let mut stats = self.counters.snapshot();
        stats.duration = self.connected_at.elapsed();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn test_entry_liveness() {
        let entry = ConnectionEntry::new(ConnectionId::new(1), 8);

        assert!(entry.is_alive());
        entry.mark_dead();
        assert!(!entry.is_alive());
    }
}
