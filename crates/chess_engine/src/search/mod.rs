//! Depth-bounded adversarial search
//!
//! This module implements the AI search using:
//! - Minimax with alpha-beta pruning over `shakmaty` legal moves
//! - A plain minimax reference search with identical tie-breaking
//!
//! Scores are always from white's point of view. `maximizing` is true when
//! the side whose move is being chosen wants the score to go up (white).
//!
//! ## Tie-breaking
//!
//! Moves are tried in the order the rules library generates them, and a
//! later move only replaces the running best when it is strictly better.
//! Among equal moves the first one generated wins, which keeps the AI
//! deterministic and lets tests pin down exact replies.
//!
//! ## Module Organization
//!
//! - `alphabeta` - Pruned search used by the AI
//! - `minimax` - Unpruned reference search, used to validate pruning

mod alphabeta;
mod minimax;

pub use alphabeta::{alphabeta, best_move};
pub use minimax::{minimax, minimax_best_move};
