//! Chess engine for the casual chess client
//!
//! Wraps the `shakmaty` rules engine behind a small [`Board`] adapter and
//! implements the AI opponent on top of it:
//!
//! - [`board`] - position, legal moves, apply/undo, FEN and move history
//! - [`evaluation`] - static material evaluation (white positive)
//! - [`search`] - depth-bounded minimax with alpha-beta pruning
//! - [`difficulty`] - difficulty level to search depth mapping
//!
//! The engine never holds global state. Every search works on the `Board`
//! value handed to it and leaves it exactly as it found it.

pub mod board;
pub mod constants;
pub mod difficulty;
pub mod error;
pub mod evaluation;
pub mod search;
pub mod types;

pub use board::{Board, GameStatus};
pub use difficulty::{depth_for, select_move, select_move_for, Difficulty};
pub use error::{ChessEngineError, ChessEngineResult};
pub use evaluation::evaluate;
pub use search::{best_move, minimax_best_move};
pub use types::{Move, SearchResult};

pub use shakmaty::{Color, Role, Square};
