//! Realtime room store
//!
//! [`RoomStore`] is the seam to whatever hosts room records (a hosted
//! database with change feeds in production). The contract is small:
//!
//! - every write goes through [`RoomStore::update`] as a [`RoomPatch`]
//! - every accepted write bumps the record's `version`
//! - every accepted write is pushed to all current subscribers of the room
//!
//! [`MemoryRoomStore`] implements it in-process with `tokio` channels. Two
//! coordinators sharing one `MemoryRoomStore` behave like two clients
//! talking to the same backend.

use crate::core::error::{StoreError, StoreResult};
use crate::networking::protocol::{RoomPatch, RoomRecord, RoomStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Stream of merged room records
pub type RoomUpdates = mpsc::UnboundedReceiver<RoomRecord>;

/// Handle returned by [`RoomStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Storage and change feed for room records
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Create a room hosted by `host` with `clock_seconds` per side
    async fn create_room(&self, host: &str, clock_seconds: u32) -> StoreResult<RoomRecord>;

    async fn fetch(&self, room_id: &str) -> StoreResult<Option<RoomRecord>>;

    /// Seat `guest` in the room's empty guest seat and start the game
    async fn claim_guest(&self, room_id: &str, guest: &str) -> StoreResult<RoomRecord>;

    /// Merge `patch` into the room and broadcast the result
    async fn update(&self, room_id: &str, patch: RoomPatch) -> StoreResult<RoomRecord>;

    /// Receive every record written to the room from now on
    async fn subscribe(&self, room_id: &str) -> StoreResult<(SubscriptionId, RoomUpdates)>;

    async fn unsubscribe(&self, room_id: &str, id: SubscriptionId) -> StoreResult<()>;
}

struct RoomEntry {
    record: RoomRecord,
    subscribers: HashMap<SubscriptionId, mpsc::UnboundedSender<RoomRecord>>,
}

impl RoomEntry {
    fn broadcast(&mut self) {
        let record = &self.record;
        self.subscribers
            .retain(|_, sender| sender.send(record.clone()).is_ok());
    }
}

/// In-process room store
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: Mutex<HashMap<String, RoomEntry>>,
    next_subscription: AtomicU64,
    offline: AtomicBool,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of live subscriptions on a room
    pub fn subscriber_count(&self, room_id: &str) -> usize {
        self.rooms
            .lock()
            .get(room_id)
            .map_or(0, |entry| entry.subscribers.len())
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("room store is offline".into()));
        }
        Ok(())
    }

    fn generate_code() -> String {
        let mut rng = rand::rng();
        (0..6)
            .map(|_| rng.random_range(b'A'..=b'Z') as char)
            .collect()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn create_room(&self, host: &str, clock_seconds: u32) -> StoreResult<RoomRecord> {
        self.check_online()?;
        let mut rooms = self.rooms.lock();

        let mut code = Self::generate_code();
        while rooms.contains_key(&code) {
            code = Self::generate_code();
        }

        let record = RoomRecord::new(code.clone(), host, clock_seconds);
        rooms.insert(
            code.clone(),
            RoomEntry {
                record: record.clone(),
                subscribers: HashMap::new(),
            },
        );
        info!("[ROOM] Created room {} for {}", code, host);
        Ok(record)
    }

    async fn fetch(&self, room_id: &str) -> StoreResult<Option<RoomRecord>> {
        self.check_online()?;
        Ok(self
            .rooms
            .lock()
            .get(room_id)
            .map(|entry| entry.record.clone()))
    }

    async fn claim_guest(&self, room_id: &str, guest: &str) -> StoreResult<RoomRecord> {
        self.check_online()?;
        let mut rooms = self.rooms.lock();
        let entry = rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::NotFound(room_id.to_string()))?;

        match entry.record.guest.as_deref() {
            Some(current) if current == guest => return Ok(entry.record.clone()),
            Some(_) => return Err(StoreError::RoomFull(room_id.to_string())),
            None if entry.record.host == guest => return Ok(entry.record.clone()),
            None => {}
        }

        entry.record.guest = Some(guest.to_string());
        if entry.record.status == RoomStatus::Waiting {
            entry.record.status = RoomStatus::Playing;
        }
        entry.record.version += 1;
        entry.broadcast();

        info!("[ROOM] {} joined room {}", guest, room_id);
        Ok(entry.record.clone())
    }

    async fn update(&self, room_id: &str, patch: RoomPatch) -> StoreResult<RoomRecord> {
        self.check_online()?;
        let mut rooms = self.rooms.lock();
        let entry = rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::NotFound(room_id.to_string()))?;

        entry.record.apply(patch);
        entry.broadcast();
        debug!(
            "[ROOM] Room {} updated to version {}",
            room_id, entry.record.version
        );
        Ok(entry.record.clone())
    }

    async fn subscribe(&self, room_id: &str) -> StoreResult<(SubscriptionId, RoomUpdates)> {
        self.check_online()?;
        let mut rooms = self.rooms.lock();
        let entry = rooms
            .get_mut(room_id)
            .ok_or_else(|| StoreError::NotFound(room_id.to_string()))?;

        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();
        entry.subscribers.insert(id, sender);
        Ok((id, receiver))
    }

    async fn unsubscribe(&self, room_id: &str, id: SubscriptionId) -> StoreResult<()> {
        self.check_online()?;
        if let Some(entry) = self.rooms.lock().get_mut(room_id) {
            entry.subscribers.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_room_codes_are_six_uppercase_letters() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice", 600).await.unwrap();
        assert_eq!(room.id.len(), 6);
        assert!(room.id.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_claim_guest_starts_game() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice", 600).await.unwrap();

        let claimed = store.claim_guest(&room.id, "bob").await.unwrap();
        assert_eq!(claimed.guest.as_deref(), Some("bob"));
        assert_eq!(claimed.status, RoomStatus::Playing);
        assert_eq!(claimed.version, room.version + 1);

        let again = store.claim_guest(&room.id, "bob").await.unwrap();
        assert_eq!(again.version, claimed.version);
    }

    #[tokio::test]
    async fn test_third_player_is_rejected() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice", 600).await.unwrap();
        store.claim_guest(&room.id, "bob").await.unwrap();

        let err = store.claim_guest(&room.id, "carol").await.unwrap_err();
        assert!(matches!(err, StoreError::RoomFull(_)));
    }

    #[tokio::test]
    async fn test_updates_reach_subscribers_in_version_order() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice", 600).await.unwrap();
        let (_, mut updates) = store.subscribe(&room.id).await.unwrap();

        store.claim_guest(&room.id, "bob").await.unwrap();
        store
            .update(
                &room.id,
                RoomPatch {
                    paused: Some(true),
                    ..RoomPatch::default()
                },
            )
            .await
            .unwrap();

        let first = updates.recv().await.unwrap();
        let second = updates.recv().await.unwrap();
        assert!(first.version < second.version);
        assert!(second.paused);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = MemoryRoomStore::new();
        let room = store.create_room("alice", 600).await.unwrap();
        let (id, mut updates) = store.subscribe(&room.id).await.unwrap();
        assert_eq!(store.subscriber_count(&room.id), 1);

        store.unsubscribe(&room.id, id).await.unwrap();
        assert_eq!(store.subscriber_count(&room.id), 0);
        store.update(&room.id, RoomPatch::default()).await.unwrap();
        assert!(updates.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_room() {
        let store = MemoryRoomStore::new();
        assert_eq!(store.fetch("NOPE").await.unwrap(), None);
        assert!(matches!(
            store.update("NOPE", RoomPatch::default()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_store() {
        let store = MemoryRoomStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.create_room("alice", 600).await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
