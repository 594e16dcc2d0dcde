//! Minimax with alpha-beta pruning
//!
//! Every `play_raw` is matched by an `undo_raw` before the loop can break,
//! so the board handed in is restored exactly, pruned branches included.

use crate::board::Board;
use crate::constants::AB_INF;
use crate::evaluation::evaluate;
use crate::types::{Move, SearchResult};
use tracing::debug;

/// Score a position `depth` plies deep
///
/// Returns the static evaluation at depth 0 or in a terminal position.
/// `nodes` is incremented once per visited position.
pub fn alphabeta(
    board: &mut Board,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;

    if depth == 0 {
        return evaluate(board);
    }

    let moves = board.raw_legal_moves();
    if moves.is_empty() || board.is_insufficient_material() {
        return evaluate(board);
    }

    if maximizing {
        let mut best = -AB_INF;
        for mv in &moves {
            board.play_raw(mv);
            let score = alphabeta(board, depth - 1, alpha, beta, false, nodes);
            board.undo_raw();

            if score > best {
                best = score;
            }
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = AB_INF;
        for mv in &moves {
            board.play_raw(mv);
            let score = alphabeta(board, depth - 1, alpha, beta, true, nodes);
            board.undo_raw();

            if score < best {
                best = score;
            }
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// Pick the best move for the side to move
///
/// `depth` counts total plies including the root move, so depth 1 is a
/// greedy one-move lookahead. A depth of 0 is treated as 1.
///
/// Returns a result with `best_move: None` when there are no legal moves;
/// the caller decides between checkmate and stalemate.
pub fn best_move(board: &mut Board, depth: u8, maximizing: bool) -> SearchResult {
    let mut nodes = 1;
    let moves = board.raw_legal_moves();

    if moves.is_empty() {
        return SearchResult {
            best_move: None,
            score: evaluate(board),
            nodes,
        };
    }

    let child_depth = depth.max(1) - 1;
    let mut alpha = -AB_INF;
    let mut beta = AB_INF;
    let mut best: Option<(Move, i32)> = None;

    for mv in &moves {
        board.play_raw(mv);
        let score = alphabeta(board, child_depth, alpha, beta, !maximizing, &mut nodes);
        board.undo_raw();

        let improves = match best {
            None => true,
            Some((_, best_score)) if maximizing => score > best_score,
            Some((_, best_score)) => score < best_score,
        };

        if improves {
            if let Some(ui_move) = Move::from_shakmaty(mv) {
                best = Some((ui_move, score));
                if maximizing {
                    alpha = alpha.max(score);
                } else {
                    beta = beta.min(score);
                }
            }
        }
    }

    let (best_move, score) = match best {
        Some((mv, score)) => (Some(mv), score),
        None => (None, evaluate(board)),
    };

    debug!(
        "[SEARCH] depth {} best {:?} score {} nodes {}",
        depth,
        best_move.map(|mv| mv.to_string()),
        score,
        nodes
    );

    SearchResult {
        best_move,
        score,
        nodes,
    }
}
