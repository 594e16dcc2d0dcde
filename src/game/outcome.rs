//! Game over state and result messages
//!
//! Every finished game, solo or multiplayer, ends in a [`GameOverState`]:
//! an [`Outcome`] from the local player's point of view plus the
//! [`FinishReason`] that ended it.
//!
//! # Outcomes
//!
//! - **Win / Loss**: checkmate was delivered
//! - **Draw**: stalemate or insufficient material
//! - **Timeout(color)**: `color` ran out of time, the other side wins
//! - **Abandoned**: a player left the room; the remaining player is given
//!   the win
//!
//! User-facing text is generated from these tags by
//! [`GameOverState::message`], never stored.

use crate::game::types::PieceColor;
use chess_engine::GameStatus;
use serde::{Deserialize, Serialize};

/// Result of a game from the local player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    /// The given side's clock reached zero
    Timeout(PieceColor),
    /// The local player left before the game ended
    Abandoned,
}

/// What ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    /// Drawn, position not available to say why
    Draw,
    Timeout,
    Abandoned,
}

/// Terminal state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverState {
    pub outcome: Outcome,
    pub reason: FinishReason,
}

impl GameOverState {
    pub fn new(outcome: Outcome, reason: FinishReason) -> Self {
        Self { outcome, reason }
    }

    /// Classify a terminal board position for the player of color `me`
    ///
    /// Returns `None` while the game is still going.
    pub fn from_status(status: GameStatus, me: PieceColor) -> Option<Self> {
        let state = match status {
            GameStatus::Ongoing => return None,
            GameStatus::Checkmate { winner } => {
                let outcome = if PieceColor::from(winner) == me {
                    Outcome::Win
                } else {
                    Outcome::Loss
                };
                Self::new(outcome, FinishReason::Checkmate)
            }
            GameStatus::Stalemate => Self::new(Outcome::Draw, FinishReason::Stalemate),
            GameStatus::InsufficientMaterial => {
                Self::new(Outcome::Draw, FinishReason::InsufficientMaterial)
            }
        };
        Some(state)
    }

    /// `color` lost on time
    pub fn timeout(color: PieceColor) -> Self {
        Self::new(Outcome::Timeout(color), FinishReason::Timeout)
    }

    /// Local player was the one who left
    pub fn abandoned_by_me() -> Self {
        Self::new(Outcome::Abandoned, FinishReason::Abandoned)
    }

    /// Opponent left, local player keeps the win
    pub fn abandoned_by_opponent() -> Self {
        Self::new(Outcome::Win, FinishReason::Abandoned)
    }

    /// Whether the player of color `me` won
    pub fn won(&self, me: PieceColor) -> bool {
        match self.outcome {
            Outcome::Win => true,
            Outcome::Timeout(loser) => loser != me,
            Outcome::Loss | Outcome::Draw | Outcome::Abandoned => false,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self.outcome, Outcome::Draw)
    }

    /// Human-readable result for the player of color `me`
    pub fn message(&self, me: PieceColor) -> String {
        match (self.outcome, self.reason) {
            (Outcome::Win, FinishReason::Abandoned) => "Your opponent left. You win!".to_string(),
            (Outcome::Win, _) => "Checkmate! You win!".to_string(),
            (Outcome::Loss, _) => "Checkmate. You lose.".to_string(),
            (Outcome::Draw, FinishReason::InsufficientMaterial) => {
                "Draw by insufficient material".to_string()
            }
            (Outcome::Draw, FinishReason::Stalemate) => "Draw by stalemate".to_string(),
            (Outcome::Draw, _) => "Draw".to_string(),
            (Outcome::Timeout(loser), _) if loser == me => "You ran out of time.".to_string(),
            (Outcome::Timeout(loser), _) => {
                format!("{loser} ran out of time. You win!")
            }
            (Outcome::Abandoned, _) => "You left the game.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::Color;

    #[test]
    fn test_ongoing_is_not_terminal() {
        assert_eq!(
            GameOverState::from_status(GameStatus::Ongoing, PieceColor::White),
            None
        );
    }

    #[test]
    fn test_checkmate_from_both_sides() {
        //! The same mate is a win for one side and a loss for the other
        let mate = GameStatus::Checkmate {
            winner: Color::Black,
        };
        let black = GameOverState::from_status(mate, PieceColor::Black).unwrap();
        let white = GameOverState::from_status(mate, PieceColor::White).unwrap();

        assert_eq!(black.outcome, Outcome::Win);
        assert_eq!(white.outcome, Outcome::Loss);
        assert!(black.won(PieceColor::Black));
        assert!(!white.won(PieceColor::White));
        assert_eq!(white.reason, FinishReason::Checkmate);
    }

    #[test]
    fn test_draws_are_not_wins() {
        let state =
            GameOverState::from_status(GameStatus::InsufficientMaterial, PieceColor::White)
                .unwrap();
        assert!(state.is_draw());
        assert!(!state.won(PieceColor::White));
        assert!(!state.won(PieceColor::Black));
        assert_eq!(state.message(PieceColor::White), "Draw by insufficient material");
    }

    #[test]
    fn test_timeout_winner_is_the_other_side() {
        let state = GameOverState::timeout(PieceColor::White);
        assert!(state.won(PieceColor::Black));
        assert!(!state.won(PieceColor::White));
        assert_eq!(state.message(PieceColor::White), "You ran out of time.");
        assert_eq!(
            state.message(PieceColor::Black),
            "White ran out of time. You win!"
        );
    }

    #[test]
    fn test_abandonment_perspectives() {
        assert!(!GameOverState::abandoned_by_me().won(PieceColor::White));
        assert!(GameOverState::abandoned_by_opponent().won(PieceColor::Black));
    }
}
