//! Room table implementation
//!
//! Maps room names to member sets and each connection to its current room.
//! A connection belongs to at most one room: joining a new room implicitly
//! leaves the prior one, which keeps fan-out bounded by a single room's
//! membership. Rooms are created lazily on first join and deleted when the
//! last member leaves, so room existence is exactly `members.len() > 0`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::registry::{ConnectionId, ConnectionRegistry, RegistryConfig, RegistryError};

/// Forward and reverse membership maps, mutated together under one lock
#[derive(Default)]
struct Membership {
    /// Room name to member set
    rooms: HashMap<String, HashSet<ConnectionId>>,
    /// Connection to its current room
    current: HashMap<ConnectionId, String>,
}

impl Membership {
    fn remove_member(&mut self, room: &str, id: ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(&id);
            if members.is_empty() {
                self.rooms.remove(room);
                tracing::debug!(room = room, "Room deleted (last member left)");
            }
        }
    }
}

/// Table of rooms and their members
///
/// All mutations take the single write lock, so `join`, `leave`, and the
/// relay's membership snapshots are mutually exclusive.
pub struct RoomTable {
    membership: RwLock<Membership>,
    registry: Arc<ConnectionRegistry>,
    config: RegistryConfig,
}

impl RoomTable {
    /// Create a room table backed by the given connection registry
    pub fn new(registry: Arc<ConnectionRegistry>, config: RegistryConfig) -> Self {
        Self {
            membership: RwLock::new(Membership::default()),
            registry,
            config,
        }
    }

    /// Join a room, implicitly leaving the current one
    ///
    /// Creates the room if absent and returns the updated member count.
    /// Fails with [`RegistryError::InvalidRoomName`] for an empty or
    /// over-long name and [`RegistryError::ConnectionNotFound`] for an
    /// unregistered connection; in both cases prior membership is untouched.
    pub async fn join(&self, id: ConnectionId, name: &str) -> Result<usize, RegistryError> {
        if name.is_empty() || name.len() > self.config.max_room_name_len {
            return Err(RegistryError::InvalidRoomName(name.to_string()));
        }
        if self.registry.lookup(id).await.is_none() {
            return Err(RegistryError::ConnectionNotFound(id));
        }

        let mut membership = self.membership.write().await;

        match membership.current.get(&id).cloned() {
            Some(prev) if prev == name => {}
            Some(prev) => {
                membership.remove_member(&prev, id);
                tracing::debug!(conn = %id, room = %prev, "Implicit leave on room switch");
                membership.current.insert(id, name.to_string());
            }
            None => {
                membership.current.insert(id, name.to_string());
            }
        }

        let members = membership.rooms.entry(name.to_string()).or_default();
        members.insert(id);
        Ok(members.len())
    }

    /// Leave the current room, if any
    ///
    /// Deletes the room if it becomes empty. Returns the left room's name,
    /// or `None` if the connection was in no room.
    pub async fn leave(&self, id: ConnectionId) -> Option<String> {
        let mut membership = self.membership.write().await;

        let room = membership.current.remove(&id)?;
        membership.remove_member(&room, id);
        Some(room)
    }

    /// Current members of a room, minus one excluded connection
    ///
    /// Returns an empty set if the room does not exist: a relay to a
    /// vanished room is a no-op, not a failure.
    pub async fn members_except(&self, name: &str, exclude: ConnectionId) -> Vec<ConnectionId> {
        let membership = self.membership.read().await;

        membership
            .rooms
            .get(name)
            .map(|members| members.iter().copied().filter(|m| *m != exclude).collect())
            .unwrap_or_default()
    }

    /// Fan-out targets for a frame from `origin`: its room plus the other
    /// members, snapshotted under one lock acquisition
    ///
    /// `None` if the origin is in no room.
    pub async fn relay_targets(
        &self,
        origin: ConnectionId,
    ) -> Option<(String, Vec<ConnectionId>)> {
        let membership = self.membership.read().await;

        let room = membership.current.get(&origin)?.clone();
        let targets = membership
            .rooms
            .get(&room)
            .map(|members| members.iter().copied().filter(|m| *m != origin).collect())
            .unwrap_or_default();
        Some((room, targets))
    }

    /// The room a connection is currently in, if any
    pub async fn room_of(&self, id: ConnectionId) -> Option<String> {
        self.membership.read().await.current.get(&id).cloned()
    }

    /// Member count of a room (0 if it does not exist)
    pub async fn member_count(&self, name: &str) -> usize {
        self.membership
            .read()
            .await
            .rooms
            .get(name)
            .map_or(0, HashSet::len)
    }

    /// Number of live rooms
    pub async fn room_count(&self) -> usize {
        self.membership.read().await.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fixture() -> (Arc<ConnectionRegistry>, RoomTable) {
        let registry = Arc::new(ConnectionRegistry::new());
        let table = RoomTable::new(Arc::clone(&registry), RegistryConfig::default());
        (registry, table)
    }

    #[tokio::test]
    async fn test_join_creates_room() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();

        let count = table.join(a, "meeting1").await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(table.room_of(a).await.as_deref(), Some("meeting1"));
        assert_eq!(table.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_join_rejects_invalid_names() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();

        assert!(matches!(
            table.join(a, "").await,
            Err(RegistryError::InvalidRoomName(_))
        ));

        let long = "x".repeat(RegistryConfig::default().max_room_name_len + 1);
        assert!(matches!(
            table.join(a, &long).await,
            Err(RegistryError::InvalidRoomName(_))
        ));

        // Prior (empty) membership untouched
        assert!(table.room_of(a).await.is_none());
        assert_eq!(table.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_rejected_join_keeps_prior_room() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();

        table.join(a, "meeting1").await.unwrap();
        assert!(table.join(a, "").await.is_err());

        assert_eq!(table.room_of(a).await.as_deref(), Some("meeting1"));
    }

    #[tokio::test]
    async fn test_join_requires_registered_connection() {
        let (_registry, table) = fixture().await;

        let result = table.join(ConnectionId::new(999), "meeting1").await;
        assert!(matches!(result, Err(RegistryError::ConnectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_join_switches_rooms() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();

        table.join(a, "q").await.unwrap();
        table.join(a, "r").await.unwrap();

        // Membership moved, and the emptied room is gone
        assert_eq!(table.room_of(a).await.as_deref(), Some("r"));
        assert_eq!(table.member_count("q").await, 0);
        assert_eq!(table.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_single_room_invariant_under_churn() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();
        let b = registry.register().await.id();

        for name in ["r1", "r2", "r3", "r1", "r2"] {
            table.join(a, name).await.unwrap();
            table.join(b, name).await.unwrap();

            // At most one room holds each connection
            let mut holding_a = 0;
            for room in ["r1", "r2", "r3"] {
                if table.members_except(room, b).await.contains(&a) {
                    holding_a += 1;
                }
            }
            assert_eq!(holding_a, 1);
        }

        table.leave(a).await;
        table.leave(b).await;
        assert_eq!(table.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_leave_deletes_empty_room() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();
        let b = registry.register().await.id();

        table.join(a, "meeting1").await.unwrap();
        table.join(b, "meeting1").await.unwrap();

        assert_eq!(table.leave(a).await.as_deref(), Some("meeting1"));
        assert_eq!(table.room_count().await, 1);

        assert_eq!(table.leave(b).await.as_deref(), Some("meeting1"));
        assert_eq!(table.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_leave_without_room_is_noop() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();

        assert!(table.leave(a).await.is_none());
    }

    #[tokio::test]
    async fn test_members_except() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();
        let b = registry.register().await.id();
        let c = registry.register().await.id();

        table.join(a, "meeting1").await.unwrap();
        table.join(b, "meeting1").await.unwrap();
        table.join(c, "meeting1").await.unwrap();

        let mut others = table.members_except("meeting1", a).await;
        others.sort();
        assert_eq!(others, vec![b, c]);

        // Vanished room is an empty set, not an error
        assert!(table.members_except("nope", a).await.is_empty());
    }

    #[tokio::test]
    async fn test_room_names_are_case_sensitive() {
        let (registry, table) = fixture().await;
        let a = registry.register().await.id();
        let b = registry.register().await.id();

        table.join(a, "Meeting").await.unwrap();
        table.join(b, "meeting").await.unwrap();

        assert_eq!(table.room_count().await, 2);
        assert!(table.members_except("Meeting", b).await.contains(&a));
        assert!(!table.members_except("meeting", a).await.contains(&a));
    }
}
