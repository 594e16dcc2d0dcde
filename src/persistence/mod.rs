//! Saved solo games
//!
//! A solo game in progress can be saved and resumed later. Saves are keyed
//! by `(user_id, level)`: each difficulty level has its own slot, and
//! starting a game at a level resumes that slot if it exists.
//!
//! - [`MemoryGameStore`] - process-local store used by tests and the
//!   offline CLI
//! - [`SqliteGameStore`] - `sqlx` SQLite store used by the CLI

pub mod memory;
pub mod sqlite;

pub use memory::MemoryGameStore;
pub use sqlite::SqliteGameStore;

use crate::core::error::StoreResult;
use crate::game::types::{restore_board, PieceColor};
use async_trait::async_trait;
use chess_engine::{Board, ChessEngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a solo game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    /// Difficulty level the game was played at
    pub level: u8,
    /// Color the human played
    pub player_color: PieceColor,
    /// Position at save time
    pub fen: String,
    /// Moves from the starting position, UCI text
    pub moves: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl SavedGame {
    /// Capture the current state of a board
    pub fn capture(board: &Board, level: u8, player_color: PieceColor) -> Self {
        Self {
            level,
            player_color,
            fen: board.to_fen(),
            moves: board.uci_history(),
            saved_at: Utc::now(),
        }
    }

    /// Rebuild the saved board
    pub fn restore(&self) -> ChessEngineResult<Board> {
        restore_board(&self.moves, &self.fen)
    }
}

/// Storage for saved solo games
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Load the save for `user_id` at `level`, if any
    async fn load(&self, user_id: &str, level: u8) -> StoreResult<Option<SavedGame>>;

    /// Create or overwrite the save for `user_id` at `level`
    async fn save(&self, user_id: &str, level: u8, game: &SavedGame) -> StoreResult<()>;

    /// Remove the save for `user_id` at `level`; missing saves are not an error
    async fn delete(&self, user_id: &str, level: u8) -> StoreResult<()>;
}
