//! SQLite saved-game store
//!
//! One row per `(user_id, level)` slot. The game itself is stored as a JSON
//! payload so the table does not have to change when [`SavedGame`] grows a
//! field.

use crate::core::error::StoreResult;
use crate::persistence::{GameStore, SavedGame};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS saved_games (
        user_id  TEXT    NOT NULL,
        level    INTEGER NOT NULL,
        payload  TEXT    NOT NULL,
        saved_at TEXT    NOT NULL,
        PRIMARY KEY (user_id, level)
    )";

/// Saved games in a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteGameStore {
    pool: SqlitePool,
}

impl SqliteGameStore {
    /// Open (creating if needed) the database at `url` and ensure the schema
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every connection to an in-memory database sees its own database.
        let max_connections = if url.contains(":memory:") { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("[STORE] Saved games database ready at {}", url);
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl GameStore for SqliteGameStore {
    async fn load(&self, user_id: &str, level: u8) -> StoreResult<Option<SavedGame>> {
        let row = sqlx::query("SELECT payload FROM saved_games WHERE user_id = ? AND level = ?")
            .bind(user_id)
            .bind(i64::from(level))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload")?;
        Ok(Some(serde_json::from_str(&payload)?))
    }

    async fn save(&self, user_id: &str, level: u8, game: &SavedGame) -> StoreResult<()> {
        let payload = serde_json::to_string(game)?;
        sqlx::query(
            "INSERT INTO saved_games (user_id, level, payload, saved_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id, level) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at",
        )
        .bind(user_id)
        .bind(i64::from(level))
        .bind(payload)
        .bind(game.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("[STORE] Saved game for {} at level {}", user_id, level);
        Ok(())
    }

    async fn delete(&self, user_id: &str, level: u8) -> StoreResult<()> {
        sqlx::query("DELETE FROM saved_games WHERE user_id = ? AND level = ?")
            .bind(user_id)
            .bind(i64::from(level))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::PieceColor;
    use chess_engine::Board;

    #[tokio::test]
    async fn test_sqlite_save_load_delete() {
        let store = SqliteGameStore::connect("sqlite::memory:").await.unwrap();
        let board = Board::from_uci_moves(["e2e4", "c7c5"]).unwrap();
        let game = SavedGame::capture(&board, 5, PieceColor::White);

        assert_eq!(store.load("alice", 5).await.unwrap(), None);

        store.save("alice", 5, &game).await.unwrap();
        let loaded = store.load("alice", 5).await.unwrap().unwrap();
        assert_eq!(loaded, game);

        store.delete("alice", 5).await.unwrap();
        assert_eq!(store.load("alice", 5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_save_overwrites_slot() {
        let store = SqliteGameStore::connect("sqlite::memory:").await.unwrap();
        let first = SavedGame::capture(&Board::new(), 1, PieceColor::White);
        let board = Board::from_uci_moves(["g1f3"]).unwrap();
        let second = SavedGame::capture(&board, 1, PieceColor::Black);

        store.save("bob", 1, &first).await.unwrap();
        store.save("bob", 1, &second).await.unwrap();

        let loaded = store.load("bob", 1).await.unwrap().unwrap();
        assert_eq!(loaded.player_color, PieceColor::Black);
        assert_eq!(loaded.moves, vec!["g1f3"]);
    }
}
