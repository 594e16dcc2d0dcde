//! Rules adapter over `shakmaty`
//!
//! [`Board`] is the only place the engine talks to the rules library. It
//! owns one position plus an undo stack of the positions that preceded it,
//! which gives the search and the session coordinators cheap, exactly
//! balanced apply/undo pairs without any global engine instance.
//!
//! # Serialization
//!
//! - Positions round-trip through FEN ([`Board::to_fen`], [`Board::from_fen`]).
//! - Move history round-trips through UCI text ([`Board::uci_history`],
//!   [`Board::from_uci_moves`]). Replaying the history rebuilds the undo
//!   stack, so a resumed game can still be taken back.
//!
//! # Example
//!
//! ```rust
//! use chess_engine::{Board, Move, Square};
//!
//! let mut board = Board::new();
//! let before = board.to_fen();
//! board.apply(Move::new(Square::E2, Square::E4)).unwrap();
//! board.undo();
//! assert_eq!(board.to_fen(), before);
//! ```

use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::Move;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, MoveList, Position, Square};

/// One entry of the undo stack
#[derive(Debug, Clone)]
struct Frame {
    before: Chess,
    played: shakmaty::Move,
}

/// Terminal classification of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Side to move has at least one legal move and mate is still possible
    Ongoing,
    /// Side to move is mated; `winner` delivered the mate
    Checkmate { winner: Color },
    /// Side to move has no legal move and is not in check
    Stalemate,
    /// Neither side can force mate
    InsufficientMaterial,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// Chess position with move history
#[derive(Debug, Clone, Default)]
pub struct Board {
    position: Chess,
    frames: Vec<Frame>,
}

impl Board {
    /// Standard starting position
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a position from FEN. The resulting board has no history.
    pub fn from_fen(fen: &str) -> ChessEngineResult<Self> {
        let invalid = |reason: String| ChessEngineError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;

        Ok(Self {
            position,
            frames: Vec::new(),
        })
    }

    /// Rebuild a game by replaying UCI moves from the starting position
    pub fn from_uci_moves<I, S>(moves: I) -> ChessEngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut board = Self::new();
        for text in moves {
            let mv: Move = text.as_ref().parse()?;
            board.apply(mv)?;
        }
        Ok(board)
    }

    /// Serialize the current position as FEN
    pub fn to_fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Underlying `shakmaty` position, for read-only inspection
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// All legal moves, in rules-library order
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(Move::from_shakmaty)
            .collect()
    }

    /// Legal moves of the piece standing on `square`
    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.from == square)
            .collect()
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.resolve(mv).is_some()
    }

    /// Apply a legal move
    ///
    /// # Errors
    ///
    /// Returns [`ChessEngineError::IllegalMove`] and leaves the board
    /// untouched when `mv` is not legal here.
    pub fn apply(&mut self, mv: Move) -> ChessEngineResult<()> {
        let resolved = self
            .resolve(mv)
            .ok_or_else(|| ChessEngineError::IllegalMove {
                mv: mv.to_string(),
                fen: self.to_fen(),
            })?;
        self.play_raw(&resolved);
        Ok(())
    }

    /// Take back the most recent move, returning it
    pub fn undo(&mut self) -> Option<Move> {
        let frame = self.frames.pop()?;
        self.position = frame.before;
        Move::from_shakmaty(&frame.played)
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    /// Drawn by rule: stalemate or insufficient material
    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.is_insufficient_material()
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }

    /// Classify the current position
    pub fn status(&self) -> GameStatus {
        if self.position.legal_moves().is_empty() {
            if self.position.is_check() {
                GameStatus::Checkmate {
                    winner: !self.position.turn(),
                }
            } else {
                GameStatus::Stalemate
            }
        } else if self.position.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else {
            GameStatus::Ongoing
        }
    }

    /// Number of half-moves played since this board was created
    pub fn ply_count(&self) -> usize {
        self.frames.len()
    }

    /// Moves played, oldest first
    pub fn history(&self) -> Vec<Move> {
        self.frames
            .iter()
            .filter_map(|frame| Move::from_shakmaty(&frame.played))
            .collect()
    }

    /// Moves played as UCI text, oldest first
    pub fn uci_history(&self) -> Vec<String> {
        self.history().iter().map(Move::to_string).collect()
    }

    /// Moves played in standard algebraic notation, oldest first
    pub fn san_history(&self) -> Vec<String> {
        self.frames
            .iter()
            .map(|frame| San::from_move(&frame.before, &frame.played).to_string())
            .collect()
    }

    /// Find the `shakmaty` move a UI move stands for
    fn resolve(&self, mv: Move) -> Option<shakmaty::Move> {
        self.position
            .legal_moves()
            .into_iter()
            .find(|candidate| mv.matches(candidate))
    }

    pub(crate) fn raw_legal_moves(&self) -> MoveList {
        self.position.legal_moves()
    }

    /// Play a move already known to be legal
    pub(crate) fn play_raw(&mut self, mv: &shakmaty::Move) {
        let before = self.position.clone();
        self.position.play_unchecked(mv);
        self.frames.push(Frame {
            before,
            played: mv.clone(),
        });
    }

    pub(crate) fn undo_raw(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.position = frame.before;
        }
    }
}
