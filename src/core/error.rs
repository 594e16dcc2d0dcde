//! Error types for core module
//!
//! Provides error types for configuration loading and for the external
//! stores (saved games and realtime rooms).

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Environment variable present but not parseable
    #[error("Invalid value '{value}' for {key}")]
    InvalidSetting { key: String, value: String },
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors returned by the persistence and realtime stores
///
/// All of these are recoverable from the session's point of view: local
/// game state is never rolled back because a store call failed.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Room id does not exist
    #[error("Room {0} not found")]
    NotFound(String),

    /// Both seats of the room are taken
    #[error("Room {0} is full")]
    RoomFull(String),

    /// Store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored payload could not be (de)serialized
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite backend error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
