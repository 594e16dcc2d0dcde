//! Background AI search
//!
//! A search at depth 5 can take long enough to stall the runtime, so it is
//! moved onto tokio's blocking pool. The search works on its own clone of
//! the board and reports back through an unbounded channel tagged with the
//! generation it was started for. The session discards replies whose
//! generation is no longer current, which is how undo, reset and shutdown
//! cancel an in-flight search.

use crate::game::types::PieceColor;
use chess_engine::{select_move_for, Board, SearchResult};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Finished AI search
#[derive(Debug, Clone)]
pub struct AiReply {
    /// Session generation the search was started for
    pub generation: u64,
    pub result: SearchResult,
    pub thinking_time: Duration,
}

/// Start an AI search on the blocking pool
pub fn spawn_ai_search(
    mut board: Board,
    level: u8,
    ai_color: PieceColor,
    generation: u64,
    replies: UnboundedSender<AiReply>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let result = select_move_for(&mut board, level, ai_color.into());
        let thinking_time = started.elapsed();

        info!(
            "[AI] Level {} chose {:?} (score {}, {} nodes, {:?})",
            level,
            result.best_move.map(|mv| mv.to_string()),
            result.score,
            result.nodes,
            thinking_time
        );

        let reply = AiReply {
            generation,
            result,
            thinking_time,
        };
        if replies.send(reply).is_err() {
            debug!("[AI] Session closed before search finished");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_reply_carries_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let board = Board::from_uci_moves(["e2e4"]).unwrap();

        spawn_ai_search(board, 1, PieceColor::Black, 7, tx)
            .await
            .unwrap();

        let reply = rx.recv().await.unwrap();
        assert_eq!(reply.generation, 7);
        assert!(reply.result.best_move.is_some());
    }

    #[tokio::test]
    async fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        spawn_ai_search(Board::new(), 1, PieceColor::White, 1, tx)
            .await
            .unwrap();
    }
}
