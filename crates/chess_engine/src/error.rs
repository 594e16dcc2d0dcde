//! Error types for chess engine
//!
//! Covers the ways callers can hand the engine bad input: unparseable
//! positions, malformed move text and moves that are not legal in the
//! current position.

use thiserror::Error;

/// Errors that can occur in the chess engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessEngineError {
    /// FEN string could not be parsed or describes an impossible position
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Move text is not in UCI long algebraic form
    #[error("Invalid move notation '{text}'")]
    InvalidMoveText { text: String },

    /// Move is well formed but not legal in the current position
    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
