//! Unpruned minimax
//!
//! Same move order, same strict tie-breaking and same depth convention as
//! [`super::alphabeta`]. Pruning must never change the chosen move or its
//! score, and this search is what that is checked against.

use crate::board::Board;
use crate::constants::AB_INF;
use crate::evaluation::evaluate;
use crate::types::{Move, SearchResult};

/// Full-width minimax value of a position
pub fn minimax(board: &mut Board, depth: u8, maximizing: bool, nodes: &mut u64) -> i32 {
    *nodes += 1;

    if depth == 0 {
        return evaluate(board);
    }

    let moves = board.raw_legal_moves();
    if moves.is_empty() || board.is_insufficient_material() {
        return evaluate(board);
    }

    let mut best = if maximizing { -AB_INF } else { AB_INF };
    for mv in &moves {
        board.play_raw(mv);
        let score = minimax(board, depth - 1, !maximizing, nodes);
        board.undo_raw();

        if (maximizing && score > best) || (!maximizing && score < best) {
            best = score;
        }
    }
    best
}

/// Root move selection without pruning
pub fn minimax_best_move(board: &mut Board, depth: u8, maximizing: bool) -> SearchResult {
    let mut nodes = 1;
    let child_depth = depth.max(1) - 1;
    let mut best: Option<(Move, i32)> = None;

    for mv in &board.raw_legal_moves() {
        board.play_raw(mv);
        let score = minimax(board, child_depth, !maximizing, &mut nodes);
        board.undo_raw();

        let improves = match best {
            None => true,
            Some((_, best_score)) if maximizing => score > best_score,
            Some((_, best_score)) => score < best_score,
        };
        if improves {
            if let Some(ui_move) = Move::from_shakmaty(mv) {
                best = Some((ui_move, score));
            }
        }
    }

    match best {
        Some((mv, score)) => SearchResult {
            best_move: Some(mv),
            score,
            nodes,
        },
        None => SearchResult {
            best_move: None,
            score: evaluate(board),
            nodes,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::best_move;

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let mut board = Board::from_uci_moves(["e2e4", "e7e5", "g1f3", "b8c6"]).unwrap();
        let full = minimax_best_move(&mut board, 3, true);
        let pruned = best_move(&mut board, 3, true);

        assert_eq!(full.best_move, pruned.best_move);
        assert_eq!(full.score, pruned.score);
        assert!(pruned.nodes < full.nodes);
    }
}
