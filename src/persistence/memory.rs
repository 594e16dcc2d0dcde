//! In-memory saved-game store

use crate::core::error::{StoreError, StoreResult};
use crate::persistence::{GameStore, SavedGame};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Saved games held in a process-local map
///
/// Can be switched offline to exercise store-failure paths.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    games: Mutex<HashMap<(String, u8), SavedGame>>,
    offline: AtomicBool,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.games.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.lock().is_empty()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn load(&self, user_id: &str, level: u8) -> StoreResult<Option<SavedGame>> {
        self.check_online()?;
        Ok(self.games.lock().get(&(user_id.to_string(), level)).cloned())
    }

    async fn save(&self, user_id: &str, level: u8, game: &SavedGame) -> StoreResult<()> {
        self.check_online()?;
        self.games
            .lock()
            .insert((user_id.to_string(), level), game.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str, level: u8) -> StoreResult<()> {
        self.check_online()?;
        self.games.lock().remove(&(user_id.to_string(), level));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::PieceColor;
    use chess_engine::Board;

    #[tokio::test]
    async fn test_slots_are_per_level() {
        let store = MemoryGameStore::new();
        let game = SavedGame::capture(&Board::new(), 3, PieceColor::White);

        store.save("alice", 3, &game).await.unwrap();
        assert_eq!(store.load("alice", 3).await.unwrap(), Some(game));
        assert_eq!(store.load("alice", 4).await.unwrap(), None);
        assert_eq!(store.load("bob", 3).await.unwrap(), None);

        store.delete("alice", 3).await.unwrap();
        assert!(store.is_empty());
        store.delete("alice", 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = MemoryGameStore::new();
        store.set_offline(true);
        let err = store.load("alice", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
