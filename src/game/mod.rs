//! Game module - session rules shared by solo and multiplayer play
//!
//! # Module Organization
//!
//! - `ai` - difficulty levels and background AI searches
//! - `clock` - per-side clock and pause/countdown state
//! - `error` - errors returned by session operations
//! - `outcome` - terminal states and result messages
//! - `solo` - human-vs-AI session coordinator and driver
//! - `types` - serializable color and board restore helper

pub mod ai;
pub mod clock;
pub mod error;
pub mod outcome;
pub mod solo;
pub mod types;

pub use clock::{ClockTick, GameClock, PausePhase};
pub use error::{GameError, GameResult};
pub use outcome::{FinishReason, GameOverState, Outcome};
pub use solo::{SoloCommand, SoloCoordinator, SoloHandle, SoloPhase, SoloSnapshot};
pub use types::PieceColor;
