//! Room records exchanged through the realtime store
//!
//! A [`RoomRecord`] is the authoritative state of one multiplayer game.
//! Clients never send whole records; they send a [`RoomPatch`] holding only
//! the fields they change, and the store merges it and bumps `version`.
//! Every merged record is broadcast to the room's subscribers.
//!
//! `version` increases by one on every write, so a client can drop any
//! record it has already applied or that arrives out of order.

use crate::game::outcome::{FinishReason, GameOverState, Outcome};
use crate::game::types::PieceColor;
use chess_engine::Board;
use serde::{Deserialize, Serialize};

/// Lifecycle of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Host is waiting for a guest
    Waiting,
    Playing,
    Finished,
}

/// How a finished room ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultTag {
    Checkmate,
    Draw,
    Timeout { loser: PieceColor },
    Abandoned,
}

impl ResultTag {
    /// Tag recorded for a locally detected terminal state
    pub fn from_state(state: &GameOverState) -> Self {
        match (state.outcome, state.reason) {
            (Outcome::Timeout(loser), _) => ResultTag::Timeout { loser },
            (_, FinishReason::Checkmate) => ResultTag::Checkmate,
            (_, FinishReason::Abandoned) => ResultTag::Abandoned,
            _ => ResultTag::Draw,
        }
    }
}

/// Authoritative state of a multiplayer game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Six-letter room code
    pub id: String,
    /// Player id of the host, who plays White
    pub host: String,
    /// Player id of the guest, who plays Black
    pub guest: Option<String>,
    pub status: RoomStatus,
    pub fen: String,
    /// Moves from the starting position, UCI text
    pub moves: Vec<String>,
    pub white_seconds: u32,
    pub black_seconds: u32,
    pub paused: bool,
    pub paused_by: Option<String>,
    pub result: Option<ResultTag>,
    /// Player id of the winner, when there is one
    pub winner: Option<String>,
    pub version: u64,
}

impl RoomRecord {
    /// Fresh room at the starting position
    pub fn new(id: impl Into<String>, host: impl Into<String>, clock_seconds: u32) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            guest: None,
            status: RoomStatus::Waiting,
            fen: Board::new().to_fen(),
            moves: Vec::new(),
            white_seconds: clock_seconds,
            black_seconds: clock_seconds,
            paused: false,
            paused_by: None,
            result: None,
            winner: None,
            version: 1,
        }
    }

    /// Color a player sits at, if they are seated
    pub fn color_of(&self, player_id: &str) -> Option<PieceColor> {
        if self.host == player_id {
            Some(PieceColor::White)
        } else if self.guest.as_deref() == Some(player_id) {
            Some(PieceColor::Black)
        } else {
            None
        }
    }

    /// Player id seated at `color`
    pub fn player_at(&self, color: PieceColor) -> Option<&str> {
        match color {
            PieceColor::White => Some(self.host.as_str()),
            PieceColor::Black => self.guest.as_deref(),
        }
    }

    /// Merge a patch and bump the version
    pub fn apply(&mut self, patch: RoomPatch) {
        if let Some(fen) = patch.fen {
            self.fen = fen;
        }
        if let Some(moves) = patch.moves {
            self.moves = moves;
        }
        if let Some(seconds) = patch.white_seconds {
            self.white_seconds = seconds;
        }
        if let Some(seconds) = patch.black_seconds {
            self.black_seconds = seconds;
        }
        if let Some(paused) = patch.paused {
            self.paused = paused;
        }
        if let Some(paused_by) = patch.paused_by {
            self.paused_by = paused_by;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(result) = patch.result {
            self.result = Some(result);
        }
        if let Some(winner) = patch.winner {
            self.winner = winner;
        }
        self.version += 1;
    }
}

/// Partial update to a room
///
/// `None` leaves a field unchanged. Fields that are themselves optional
/// use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPatch {
    pub fen: Option<String>,
    pub moves: Option<Vec<String>>,
    pub white_seconds: Option<u32>,
    pub black_seconds: Option<u32>,
    pub paused: Option<bool>,
    pub paused_by: Option<Option<String>>,
    pub status: Option<RoomStatus>,
    pub result: Option<ResultTag>,
    pub winner: Option<Option<String>>,
}

impl RoomPatch {
    /// Position after a move
    pub fn position(board: &Board) -> Self {
        Self {
            fen: Some(board.to_fen()),
            moves: Some(board.uci_history()),
            ..Self::default()
        }
    }

    /// Record the remaining time of one side
    pub fn with_clock(mut self, color: PieceColor, seconds: u32) -> Self {
        match color {
            PieceColor::White => self.white_seconds = Some(seconds),
            PieceColor::Black => self.black_seconds = Some(seconds),
        }
        self
    }

    /// Mark the room finished
    pub fn finished(mut self, result: ResultTag, winner: Option<String>) -> Self {
        self.status = Some(RoomStatus::Finished);
        self.result = Some(result);
        self.winner = Some(winner);
        self
    }
}
