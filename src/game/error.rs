//! Error types for game module
//!
//! Errors a session coordinator returns to the caller. None of them leave
//! the session in a half-applied state: a rejected move changes nothing,
//! and a store failure never rolls back a move that was already played
//! locally.

use crate::core::error::StoreError;
use chess_engine::ChessEngineError;

/// Errors that can occur in session operations
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Move is not legal in the current position
    #[error("Illegal move: {mv}")]
    IllegalMove { mv: String },

    /// Local player tried to move on the opponent's turn
    #[error("It is not your turn")]
    NotYourTurn,

    /// Game already reached a terminal state
    #[error("The game is already over")]
    SessionFinished,

    /// No game in progress (still connecting or waiting for an opponent)
    #[error("No game is in progress")]
    SessionNotActive,

    /// Game is paused or counting down to resume
    #[error("The game is paused")]
    Paused,

    /// Room id does not exist
    #[error("Room {room_id} not found")]
    RoomNotFound { room_id: String },

    /// Both seats of the room are taken
    #[error("Room {room_id} is full")]
    RoomFull { room_id: String },

    /// Store call failed; local state was kept
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// Engine rejected a position or move text
    #[error(transparent)]
    Engine(#[from] ChessEngineError),
}

impl From<StoreError> for GameError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(room_id) => GameError::RoomNotFound { room_id },
            StoreError::RoomFull(room_id) => GameError::RoomFull { room_id },
            other => GameError::StoreUnavailable(other),
        }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_room_errors() {
        assert!(matches!(
            GameError::from(StoreError::NotFound("ABCDEF".into())),
            GameError::RoomNotFound { room_id } if room_id == "ABCDEF"
        ));
        assert!(matches!(
            GameError::from(StoreError::RoomFull("ABCDEF".into())),
            GameError::RoomFull { .. }
        ));
        assert!(matches!(
            GameError::from(StoreError::Unavailable("offline".into())),
            GameError::StoreUnavailable(_)
        ));
    }
}
