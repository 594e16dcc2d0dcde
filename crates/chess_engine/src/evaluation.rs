//! Material evaluation
//!
//! Evaluates the material balance of a position by summing signed piece
//! values over every occupied square. White pieces count positive, black
//! pieces negative, using the table in [`crate::constants`].

use crate::board::Board;
use crate::constants::*;
use shakmaty::{Color, Position, Role};

/// Centipawn value of a piece kind
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => KING_VALUE,
    }
}

/// Evaluate material balance, white positive
pub fn evaluate(board: &Board) -> i32 {
    let pieces = board.position().board();
    let mut score = 0;

    for square in pieces.occupied() {
        if let Some(piece) = pieces.piece_at(square) {
            let value = piece_value(piece.role);
            score += match piece.color {
                Color::White => value,
                Color::Black => -value,
            };
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position_material_balance() {
        let board = Board::new();
        assert_eq!(evaluate(&board), 0, "Starting position should be balanced");
    }

    #[test]
    fn test_white_up_queen() {
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(evaluate(&board), QUEEN_VALUE);
    }

    #[test]
    fn test_black_up_pawn() {
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(evaluate(&board), -PAWN_VALUE);
    }

    #[test]
    fn test_evaluation_is_color_symmetric() {
        //! Mirroring a position and swapping colors negates the score
        let white_rook = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let black_rook = Board::from_fen("r3k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white_rook), ROOK_VALUE);
        assert_eq!(evaluate(&black_rook), -ROOK_VALUE);
    }

    #[test]
    fn test_bare_kings_cancel() {
        let board = Board::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert_eq!(evaluate(&board), 0);
    }
}
