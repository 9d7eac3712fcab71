//! Best-effort frame fan-out
//!
//! Given a frame from a connection, the relay resolves that connection's
//! room and enqueues a clone of the frame on every other member's outbound
//! queue. It never waits for any target: a full queue evicts its own oldest
//! frame, a closed queue drops the frame, and neither condition fails the
//! sender or affects any other target.

use std::sync::Arc;

use crate::registry::{ConnectionId, ConnectionRegistry, RegistryError};
use crate::room::RoomTable;
use crate::stats::RelayStats;

use super::frame::Frame;

/// Fan-out relay over the room table
pub struct FrameRelay {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTable>,
    stats: Arc<RelayStats>,
}

impl FrameRelay {
    /// Create a relay over the given registry and room table
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomTable>,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            registry,
            rooms,
            stats,
        }
    }

    /// Relay a frame from `origin` to the other members of its room
    ///
    /// Returns the number of target queues the frame was enqueued to, or
    /// [`RegistryError::NotInRoom`] if the origin has not joined a room.
    /// The target set is snapshotted at the moment of sending; the frame is
    /// never delivered back to its origin.
    ///
    /// Frames from one connection are enqueued to each target in arrival
    /// order: the per-connection inbound task calls this sequentially, and
    /// insertion into each queue happens under that queue's lock.
    pub async fn relay(&self, origin: ConnectionId, frame: Frame) -> Result<usize, RegistryError> {
        let (room, targets) = self
            .rooms
            .relay_targets(origin)
            .await
            .ok_or(RegistryError::NotInRoom(origin))?;

        let mut delivered = 0;
        for target in targets {
            // A target may unregister between the snapshot and delivery;
            // both the missing entry and the closed queue are silent drops.
            let Some(entry) = self.registry.lookup(target).await else {
                continue;
            };

            match entry.queue().enqueue(frame.clone()).await {
                Ok(()) => delivered += 1,
                Err(RegistryError::QueueClosed) => {
                    self.stats.record_drop_closed();
                    tracing::debug!(
                        conn = %origin,
                        target = %target,
                        room = %room,
                        "Frame dropped at closed queue"
                    );
                }
                Err(e) => {
                    tracing::debug!(target = %target, error = %e, "Enqueue failed");
                }
            }
        }

        self.stats.record_relay(delivered);
        tracing::trace!(
            conn = %origin,
            room = %room,
            kind = ?frame.kind,
            targets = delivered,
            "Frame relayed"
        );

        Ok(delivered)
    }

    /// Relay-wide statistics
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }
}
