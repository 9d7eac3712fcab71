//! Statistics and counters for relay sessions

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Per-session traffic counters
///
/// Shared between the inbound and drain tasks of a connection, so all
/// fields are atomic. Snapshot with [`SessionCounters::snapshot`].
#[derive(Debug, Default)]
pub struct SessionCounters {
    frames_in: AtomicU64,
    bytes_in: AtomicU64,
    frames_out: AtomicU64,
    bytes_out: AtomicU64,
}

impl SessionCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inbound frame of `bytes` payload bytes
    pub fn record_inbound(&self, bytes: usize) {
        self.frames_in.fetch_add(1, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record an outbound frame of `bytes` payload bytes
    pub fn record_outbound(&self, bytes: usize) {
        self.frames_out.fetch_add(1, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            frames_in: self.frames_in.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            frames_out: self.frames_out.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            duration: Duration::ZERO,
        }
    }
}

/// Session-level statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Frames received from the connection
    pub frames_in: u64,
    /// Payload bytes received from the connection
    pub bytes_in: u64,
    /// Frames transmitted to the connection
    pub frames_out: u64,
    /// Payload bytes transmitted to the connection
    pub bytes_out: u64,
    /// Connection duration
    pub duration: Duration,
}

/// Relay-wide counters
#[derive(Debug, Default)]
pub struct RelayStats {
    frames_relayed: AtomicU64,
    enqueues: AtomicU64,
    drops_closed: AtomicU64,
    media_before_join: AtomicU64,
}

impl RelayStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a relayed frame reaching `targets` queues
    pub fn record_relay(&self, targets: usize) {
        self.frames_relayed.fetch_add(1, Ordering::Relaxed);
        self.enqueues.fetch_add(targets as u64, Ordering::Relaxed);
    }

    /// Record a frame dropped because its target's queue was closed
    pub fn record_drop_closed(&self) {
        self.drops_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a media event from a connection not in any room
    pub fn record_media_before_join(&self) {
        self.media_before_join.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            frames_relayed: self.frames_relayed.load(Ordering::Relaxed),
            enqueues: self.enqueues.load(Ordering::Relaxed),
            drops_closed: self.drops_closed.load(Ordering::Relaxed),
            media_before_join: self.media_before_join.load(Ordering::Relaxed),
        }
    }
}

/// Relay-wide statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct RelayStatsSnapshot {
    /// Frames accepted by the relay (fan-out attempts)
    pub frames_relayed: u64,
    /// Total per-target enqueues across all fan-outs
    pub enqueues: u64,
    /// Frames dropped at a closed target queue
    pub drops_closed: u64,
    /// Media events dropped because the sender had not joined a room
    pub media_before_join: u64,
}
