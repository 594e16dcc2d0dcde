//! Difficulty levels for the AI opponent
//!
//! Difficulty is a number from 1 to 10 chosen in the game menu. Strength
//! comes only from search depth, so each pair of levels shares a depth:
//!
//! | Level | Depth (plies) |
//! |-------|---------------|
//! | 1-2   | 1             |
//! | 3-4   | 2             |
//! | 5-6   | 3             |
//! | 7-8   | 4             |
//! | 9-10  | 5             |
//!
//! Levels outside 1..=10 are clamped rather than rejected; a saved game or
//! config value from an older client should still start a game.

use crate::board::Board;
use crate::constants::{MAX_LEVEL, MIN_LEVEL};
use crate::search::best_move;
use crate::types::SearchResult;
use shakmaty::Color;
use std::fmt;

/// Validated difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

impl Difficulty {
    /// Create a difficulty, clamping into 1..=10
    pub fn new(level: u8) -> Self {
        Self(level.clamp(MIN_LEVEL, MAX_LEVEL))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Search depth in plies
    pub fn depth(self) -> u8 {
        self.0.div_ceil(2)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(MIN_LEVEL)
    }
}

impl From<u8> for Difficulty {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} (depth {})", self.0, self.depth())
    }
}

/// Search depth for a difficulty level
pub fn depth_for(level: u8) -> u8 {
    Difficulty::new(level).depth()
}

/// Choose the AI's move
///
/// The AI maximizes when it plays white. The board is searched in place and
/// handed back unchanged.
pub fn select_move(board: &mut Board, level: u8, ai_maximizing: bool) -> SearchResult {
    best_move(board, depth_for(level), ai_maximizing)
}

/// Convenience wrapper deriving the maximizing flag from the AI's color
pub fn select_move_for(board: &mut Board, level: u8, ai_color: Color) -> SearchResult {
    select_move(board, level, ai_color == Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_table() {
        let expected = [1, 1, 2, 2, 3, 3, 4, 4, 5, 5];
        for (index, depth) in expected.iter().enumerate() {
            let level = index as u8 + 1;
            assert_eq!(depth_for(level), *depth, "level {level}");
        }
    }

    #[test]
    fn test_depth_is_non_decreasing() {
        //! Raising the level never makes the AI search shallower
        for level in MIN_LEVEL..MAX_LEVEL {
            assert!(depth_for(level) <= depth_for(level + 1));
        }
    }

    #[test]
    fn test_out_of_range_levels_clamp() {
        assert_eq!(Difficulty::new(0).level(), 1);
        assert_eq!(Difficulty::new(42).level(), 10);
        assert_eq!(depth_for(0), 1);
        assert_eq!(depth_for(200), 5);
    }

    #[test]
    fn test_select_move_from_start() {
        let mut board = Board::new();
        let result = select_move_for(&mut board, 1, Color::White);
        assert!(result.best_move.is_some());
        assert_eq!(board.ply_count(), 0);
    }
}
