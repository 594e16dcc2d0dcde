//! Core engine value types
//!
//! ## `Move`
//!
//! The engine and both session coordinators speak in terms of a small
//! `Copy` move value: source square, destination square and an optional
//! promotion piece. This is the shape a UI produces from two square clicks,
//! so it deliberately hides `shakmaty`'s richer move enum (captures, en
//! passant, castling rook squares).
//!
//! Castling is expressed the way a player drags it: king from `e1` to `g1`
//! (or `c1`), never king-takes-rook.
//!
//! The text form is UCI long algebraic notation (`e2e4`, `e7e8q`), which is
//! also what saved games and room records store.
//!
//! ## `SearchResult`
//!
//! Output of [`crate::search::best_move`]: the chosen move (if any), its
//! score from white's point of view, and the number of nodes visited.

use crate::error::{ChessEngineError, ChessEngineResult};
use shakmaty::{File, Role, Square};
use std::fmt;
use std::str::FromStr;

/// A move as the user interface sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    /// Square the moving piece starts on
    pub from: Square,
    /// Square the moving piece lands on (king destination for castling)
    pub to: Square,
    /// Piece a pawn promotes to, if this is a promotion
    pub promotion: Option<Role>,
}

impl Move {
    /// Create a non-promoting move
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Create a promoting move
    pub fn with_promotion(from: Square, to: Square, promotion: Role) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Convert a `shakmaty` move into the UI representation
    ///
    /// Returns `None` for drop moves, which standard chess never produces.
    pub fn from_shakmaty(mv: &shakmaty::Move) -> Option<Self> {
        match *mv {
            shakmaty::Move::Normal {
                from,
                to,
                promotion,
                ..
            } => Some(Self {
                from,
                to,
                promotion,
            }),
            shakmaty::Move::EnPassant { from, to } => Some(Self::new(from, to)),
            shakmaty::Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() {
                    File::G
                } else {
                    File::C
                };
                Some(Self::new(king, Square::from_coords(file, king.rank())))
            }
            shakmaty::Move::Put { .. } => None,
        }
    }

    /// Check whether this UI move describes the given `shakmaty` move
    pub fn matches(&self, mv: &shakmaty::Move) -> bool {
        Self::from_shakmaty(mv).is_some_and(|candidate| candidate == *self)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ChessEngineError;

    /// Parse UCI long algebraic notation (`e2e4`, `a7a8q`)
    fn from_str(text: &str) -> ChessEngineResult<Self> {
        let invalid = || ChessEngineError::InvalidMoveText {
            text: text.to_string(),
        };

        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }

        let from: Square = text[0..2].parse().map_err(|_| invalid())?;
        let to: Square = text[2..4].parse().map_err(|_| invalid())?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match Role::from_char(c.to_ascii_lowercase()) {
                Some(role) if role != Role::Pawn && role != Role::King => Some(role),
                _ => return Err(invalid()),
            },
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

/// Result of a root search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move found, `None` when the position has no legal moves
    pub best_move: Option<Move>,
    /// Minimax value of the position, white positive
    pub score: i32,
    /// Nodes visited, root included
    pub nodes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_move() {
        let mv: Move = "e2e4".parse().unwrap();
        assert_eq!(mv, Move::new(Square::E2, Square::E4));
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_parse_promotion() {
        //! Promotion letter is accepted in either case but printed lowercase
        let mv: Move = "a7a8Q".parse().unwrap();
        assert_eq!(mv, Move::with_promotion(Square::A7, Square::A8, Role::Queen));
        assert_eq!(mv.to_string(), "a7a8q");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("e2".parse::<Move>().is_err());
        assert!("e2e9".parse::<Move>().is_err());
        assert!("e7e8k".parse::<Move>().is_err());
        assert!("e2e4e5".parse::<Move>().is_err());
    }

    #[test]
    fn test_castle_is_king_destination() {
        //! shakmaty encodes castling as king-takes-rook; the UI form is e1g1
        let castle = shakmaty::Move::Castle {
            king: Square::E1,
            rook: Square::H1,
        };
        assert_eq!(
            Move::from_shakmaty(&castle),
            Some(Move::new(Square::E1, Square::G1))
        );

        let long_castle = shakmaty::Move::Castle {
            king: Square::E8,
            rook: Square::A8,
        };
        assert_eq!(
            Move::from_shakmaty(&long_castle),
            Some(Move::new(Square::E8, Square::C8))
        );
    }
}
