//! Session lifecycle orchestration
//!
//! The manager owns the registry, room table, and relay, and drives every
//! connection transition: connect, join, media relay, disconnect. A
//! connection's relay eligibility follows
//! `Connected -> Joined(room) -> Connected | Disconnected`; membership in
//! the room table is what distinguishes `Joined` from roomless `Connected`,
//! and presence in the registry is what distinguishes both from
//! `Disconnected`.

use std::sync::Arc;

use crate::registry::{
    ConnectionEntry, ConnectionId, ConnectionRegistry, RegistryConfig, RegistryError,
};
use crate::relay::{Frame, FrameRelay};
use crate::room::RoomTable;
use crate::stats::RelayStats;

/// Status text broadcast to a room when a member joins
pub const JOINED_STATUS: &str = "Someone joined!";

/// Coordinates connection lifecycle across registry, rooms, and relay
pub struct SessionManager {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTable>,
    relay: FrameRelay,
    stats: Arc<RelayStats>,
}

impl SessionManager {
    /// Create a manager with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a manager with custom registry configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::with_config(config.clone()));
        let rooms = Arc::new(RoomTable::new(Arc::clone(&registry), config));
        let stats = Arc::new(RelayStats::new());
        let relay = FrameRelay::new(
            Arc::clone(&registry),
            Arc::clone(&rooms),
            Arc::clone(&stats),
        );

        Self {
            registry,
            rooms,
            relay,
            stats,
        }
    }

    /// The connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The room table
    pub fn rooms(&self) -> &Arc<RoomTable> {
        &self.rooms
    }

    /// Relay-wide statistics
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Handle a new transport handshake
    pub async fn on_connect(&self) -> Arc<ConnectionEntry> {
        let entry = self.registry.register().await;
        tracing::info!(conn = %entry.id(), "User connected");
        entry
    }

    /// Handle a join request
    ///
    /// On success, notifies the room's existing members with a status event
    /// (the joiner is the origin, so the fan-out excludes it). Returns the
    /// room's member count including the joiner.
    pub async fn on_join_room(
        &self,
        id: ConnectionId,
        room: &str,
    ) -> Result<usize, RegistryError> {
        let members = self.rooms.join(id, room).await?;
        tracing::info!(conn = %id, room = room, members = members, "Joined room");

        // Best-effort like any relay; NotInRoom can only happen if a
        // concurrent disconnect already tore the membership down again.
        if let Err(e) = self.relay.relay(id, Frame::status(id, JOINED_STATUS)).await {
            tracing::debug!(conn = %id, error = %e, "Join status not delivered");
        }

        Ok(members)
    }

    /// Handle a media event: relay the frame to the sender's room
    ///
    /// A frame from a connection that has not joined a room is dropped and
    /// logged, never surfaced to other clients.
    pub async fn on_media(&self, id: ConnectionId, frame: Frame) {
        match self.relay.relay(id, frame).await {
            Ok(_) => {}
            Err(RegistryError::NotInRoom(_)) => {
                self.stats.record_media_before_join();
                tracing::debug!(conn = %id, "Media event before join, dropped");
            }
            Err(e) => {
                tracing::debug!(conn = %id, error = %e, "Relay failed");
            }
        }
    }

    /// Handle a disconnect, explicit or detected
    ///
    /// Leaves the current room (deleting it if emptied), unregisters the
    /// connection, and closes its outbound queue, unblocking the drain
    /// task. Idempotent, so transport errors and heartbeat timeouts may
    /// race an explicit close.
    pub async fn on_disconnect(&self, id: ConnectionId) {
        if let Some(room) = self.rooms.leave(id).await {
            tracing::debug!(conn = %id, room = %room, "Left room");
        }
        self.registry.unregister(id).await;
        tracing::info!(conn = %id, "User disconnected");
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::protocol::ServerMessage;
    use crate::relay::FrameKind;

    #[tokio::test]
    async fn test_meeting1_scenario() {
        // A and B join "meeting1"; A sends F1; only B receives it. Then B
        // disconnects; A's F2 reaches nobody.
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        let b = manager.on_connect().await;
        manager.on_join_room(a.id(), "meeting1").await.unwrap();
        manager.on_join_room(b.id(), "meeting1").await.unwrap();

        // A, already a member, was notified of B's join; drain that first
        let joined = a.queue().dequeue().await.unwrap();
        assert_eq!(joined.kind, FrameKind::Status);

        let f1 = Frame::video(a.id(), Bytes::from_static(b"F1"));
        manager.on_media(a.id(), f1.clone()).await;

        assert_eq!(b.queue().dequeue().await.unwrap(), f1);
        assert!(a.queue().is_empty().await);

        manager.on_disconnect(b.id()).await;
        manager
            .on_media(a.id(), Frame::video(a.id(), Bytes::from_static(b"F2")))
            .await;

        // Room holds only A now; members-except-A is empty
        assert!(a.queue().is_empty().await);
        assert_eq!(manager.stats().snapshot().enqueues, 2); // status + F1 only
    }

    #[tokio::test]
    async fn test_join_notifies_existing_members_only() {
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        let b = manager.on_connect().await;

        manager.on_join_room(a.id(), "meeting1").await.unwrap();
        let members = manager.on_join_room(b.id(), "meeting1").await.unwrap();
        assert_eq!(members, 2);

        // A (already present) is notified; B (the joiner) is not
        let msg = ServerMessage::from(&a.queue().dequeue().await.unwrap());
        assert_eq!(
            msg,
            ServerMessage::Status {
                msg: JOINED_STATUS.to_string()
            }
        );
        assert!(b.queue().is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_room_name_keeps_prior_state() {
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        manager.on_join_room(a.id(), "ok").await.unwrap();

        let result = manager.on_join_room(a.id(), "").await;
        assert!(matches!(result, Err(RegistryError::InvalidRoomName(_))));
        assert_eq!(manager.rooms().room_of(a.id()).await.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_switching_rooms_moves_membership() {
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        let b = manager.on_connect().await;
        manager.on_join_room(a.id(), "q").await.unwrap();
        manager.on_join_room(b.id(), "r").await.unwrap();

        manager.on_join_room(a.id(), "r").await.unwrap();

        assert_eq!(manager.rooms().member_count("q").await, 0);
        assert_eq!(manager.rooms().member_count("r").await, 2);
        assert_eq!(manager.rooms().room_count().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_excludes_from_future_relay() {
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        let b = manager.on_connect().await;
        let c = manager.on_connect().await;
        for entry in [&a, &b, &c] {
            manager.on_join_room(entry.id(), "r").await.unwrap();
        }
        // Drain the one join notification B received (C joining)
        let _ = b.queue().dequeue().await.unwrap();

        manager.on_disconnect(c.id()).await;
        manager
            .on_media(a.id(), Frame::video(a.id(), Bytes::from_static(b"F")))
            .await;

        // C is gone from the room and from the registry; B still receives
        assert!(manager.registry().lookup(c.id()).await.is_none());
        assert!(!manager
            .rooms()
            .members_except("r", a.id())
            .await
            .contains(&c.id()));
        assert!(c.queue().is_closed().await);
        assert_eq!(b.queue().dequeue().await.unwrap().payload, "F");
    }

    #[tokio::test]
    async fn test_media_before_join_is_counted_and_dropped() {
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        manager
            .on_media(a.id(), Frame::video(a.id(), Bytes::from_static(b"F")))
            .await;

        assert_eq!(manager.stats().snapshot().media_before_join, 1);
        assert_eq!(manager.stats().snapshot().frames_relayed, 0);
    }

    #[tokio::test]
    async fn test_disconnect_unblocks_drain() {
        let manager = SessionManager::new();

        let a = manager.on_connect().await;
        let queue = Arc::clone(a.queue());
        let drain = tokio::spawn(async move { queue.dequeue().await });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        manager.on_disconnect(a.id()).await;

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), drain)
            .await
            .expect("drain should wake on disconnect")
            .unwrap();
        assert!(matches!(result, Err(RegistryError::QueueClosed)));
    }
}
