//! Session-level value types
//!
//! [`PieceColor`] is the serializable side identifier used in saved games,
//! room records and UI snapshots. The engine works in `shakmaty::Color`;
//! conversions go both ways.

use chess_engine::{Board, ChessEngineResult, Color};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    #[default]
    White,
    Black,
}

impl PieceColor {
    pub fn opposite(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }
}

impl From<Color> for PieceColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => PieceColor::White,
            Color::Black => PieceColor::Black,
        }
    }
}

impl From<PieceColor> for Color {
    fn from(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Color::White,
            PieceColor::Black => Color::Black,
        }
    }
}

impl fmt::Display for PieceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceColor::White => write!(f, "White"),
            PieceColor::Black => write!(f, "Black"),
        }
    }
}

/// Rebuild a board from a stored move list and position
///
/// Replaying the UCI moves keeps the undo history and SAN list intact. If
/// the moves cannot be replayed, or they do not lead to the stored FEN, the
/// FEN alone is trusted and the history is lost.
pub fn restore_board(moves: &[String], fen: &str) -> ChessEngineResult<Board> {
    match Board::from_uci_moves(moves) {
        Ok(board) if board.to_fen() == fen => Ok(board),
        Ok(_) => {
            warn!(
                "[RESTORE] Move list does not reach stored position, loading FEN without history"
            );
            Board::from_fen(fen)
        }
        Err(e) => {
            warn!("[RESTORE] Could not replay move list ({}), loading FEN", e);
            Board::from_fen(fen)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversions() {
        assert_eq!(PieceColor::from(Color::Black), PieceColor::Black);
        assert_eq!(Color::from(PieceColor::White), Color::White);
        assert_eq!(PieceColor::White.opposite(), PieceColor::Black);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let json = serde_json::to_string(&PieceColor::Black).unwrap();
        assert_eq!(json, "\"black\"");
    }

    #[test]
    fn test_restore_prefers_move_list() {
        let moves: Vec<String> = vec!["e2e4".into(), "e7e5".into()];
        let expected = Board::from_uci_moves(&moves).unwrap();

        let board = restore_board(&moves, &expected.to_fen()).unwrap();
        assert_eq!(board.ply_count(), 2);
        assert_eq!(board.san_history(), vec!["e4", "e5"]);
    }

    #[test]
    fn test_restore_falls_back_to_fen() {
        //! A corrupt move list still restores the position, without history
        let fen = "4k3/8/8/8/8/8/8/4K2R w K - 0 1";
        let moves: Vec<String> = vec!["e2e5".into()];

        let board = restore_board(&moves, fen).unwrap();
        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.ply_count(), 0);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        assert!(restore_board(&[], "garbage").is_err());
    }
}
