//! Engine constants
//!
//! ## Piece Values
//!
//! Material is measured in centipawns. The table is symmetric: a black piece
//! is worth exactly the negation of the same white piece, so the start
//! position evaluates to 0.
//!
//! | Piece  | Value  |
//! |--------|--------|
//! | Pawn   | 100    |
//! | Knight | 320    |
//! | Bishop | 330    |
//! | Rook   | 500    |
//! | Queen  | 900    |
//! | King   | 20000  |
//!
//! The king value is large enough that no amount of other material can
//! outweigh it, but evaluation only ever sees both kings on the board.

pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;
pub const KING_VALUE: i32 = 20_000;

/// Alpha-beta window bound. Larger than any reachable material sum.
pub const AB_INF: i32 = 1_000_000;

/// Lowest selectable difficulty level
pub const MIN_LEVEL: u8 = 1;

/// Highest selectable difficulty level
pub const MAX_LEVEL: u8 = 10;

/// Search depth used by the highest difficulty level
pub const MAX_DEPTH: u8 = 5;
