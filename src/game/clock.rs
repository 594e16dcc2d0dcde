//! Per-side game clock and pause state
//!
//! Multiplayer games run a sudden-death clock: each side starts with the
//! room's time budget and only the side to move loses time. The clock is
//! driven by an external one-second tick; [`GameClock`] itself never reads
//! wall time, which keeps it deterministic under test.
//!
//! # Pause and resume
//!
//! [`PausePhase`] tracks who paused the game and the resume countdown.
//! While the game is paused or counting down the clock is frozen; the
//! countdown itself runs on the same tick as the clock.
//!
//! ```text
//! Running -> PausedBy(player) -> CountingDown(3) -> (2) -> (1) -> Running
//! ```

use crate::game::types::PieceColor;

/// Starting time per side, in seconds
pub const DEFAULT_CLOCK_SECONDS: u32 = 600;

/// Seconds counted down before a paused game resumes
pub const RESUME_COUNTDOWN_SECONDS: u8 = 3;

/// Result of one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Clock is stopped, nothing changed
    Idle,
    /// One second was taken from the side to move
    Ticked,
    /// The side to move has no time left
    Flagged(PieceColor),
}

/// Remaining time for both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    /// White's remaining time in seconds
    pub white_seconds: u32,
    /// Black's remaining time in seconds
    pub black_seconds: u32,
    /// Whether ticks currently take time off
    pub is_running: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_SECONDS)
    }
}

impl GameClock {
    /// Stopped clock with `seconds` for each side
    pub fn new(seconds: u32) -> Self {
        Self {
            white_seconds: seconds,
            black_seconds: seconds,
            is_running: false,
        }
    }

    pub fn remaining(&self, color: PieceColor) -> u32 {
        match color {
            PieceColor::White => self.white_seconds,
            PieceColor::Black => self.black_seconds,
        }
    }

    pub fn start(&mut self) {
        self.is_running = true;
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    /// Take one second from `side`
    pub fn tick(&mut self, side: PieceColor) -> ClockTick {
        if !self.is_running {
            return ClockTick::Idle;
        }

        let remaining = match side {
            PieceColor::White => &mut self.white_seconds,
            PieceColor::Black => &mut self.black_seconds,
        };
        *remaining = remaining.saturating_sub(1);

        if *remaining == 0 {
            self.is_running = false;
            ClockTick::Flagged(side)
        } else {
            ClockTick::Ticked
        }
    }
}

/// Pause state of a multiplayer game
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PausePhase {
    /// Clock runs normally
    #[default]
    Running,
    /// Game halted by the named player
    PausedBy(String),
    /// Resume requested; seconds left before the clock restarts
    CountingDown(u8),
}

impl PausePhase {
    /// Whether the clock must stay frozen
    pub fn freezes_clock(&self) -> bool {
        !matches!(self, PausePhase::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PausePhase::PausedBy(_))
    }

    /// Advance the resume countdown by one second
    ///
    /// Returns the next phase; `CountingDown(1)` becomes `Running`. Other
    /// phases are unchanged.
    pub fn advance_countdown(&self) -> PausePhase {
        match self {
            PausePhase::CountingDown(n) if *n <= 1 => PausePhase::Running,
            PausePhase::CountingDown(n) => PausePhase::CountingDown(n - 1),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_clock_default() {
        //! Verifies default clock configuration (10 minutes each, stopped)
        let clock = GameClock::default();

        assert_eq!(clock.white_seconds, 600, "White should start with 10 minutes");
        assert_eq!(clock.black_seconds, 600, "Black should start with 10 minutes");
        assert!(!clock.is_running, "Clock should start stopped");
    }

    #[test]
    fn test_stopped_clock_does_not_tick() {
        let mut clock = GameClock::new(5);
        assert_eq!(clock.tick(PieceColor::White), ClockTick::Idle);
        assert_eq!(clock.white_seconds, 5);
    }

    #[test]
    fn test_only_side_to_move_loses_time() {
        let mut clock = GameClock::new(10);
        clock.start();

        clock.tick(PieceColor::White);
        clock.tick(PieceColor::White);
        clock.tick(PieceColor::Black);

        assert_eq!(clock.remaining(PieceColor::White), 8);
        assert_eq!(clock.remaining(PieceColor::Black), 9);
    }

    #[test]
    fn test_flag_falls_at_zero() {
        //! The tick that reaches zero reports the flag and stops the clock
        let mut clock = GameClock::new(2);
        clock.start();

        assert_eq!(clock.tick(PieceColor::Black), ClockTick::Ticked);
        assert_eq!(
            clock.tick(PieceColor::Black),
            ClockTick::Flagged(PieceColor::Black)
        );
        assert!(!clock.is_running);
        assert_eq!(clock.tick(PieceColor::Black), ClockTick::Idle);
        assert_eq!(clock.black_seconds, 0);
    }

    #[test]
    fn test_countdown_sequence() {
        let mut phase = PausePhase::CountingDown(RESUME_COUNTDOWN_SECONDS);
        let mut seen = Vec::new();
        while let PausePhase::CountingDown(n) = phase {
            seen.push(n);
            phase = phase.advance_countdown();
        }
        assert_eq!(seen, vec![3, 2, 1]);
        assert_eq!(phase, PausePhase::Running);
    }

    #[test]
    fn test_pause_freezes_clock() {
        assert!(PausePhase::PausedBy("alice".into()).freezes_clock());
        assert!(PausePhase::CountingDown(2).freezes_clock());
        assert!(!PausePhase::Running.freezes_clock());
        assert_eq!(
            PausePhase::PausedBy("alice".into()).advance_countdown(),
            PausePhase::PausedBy("alice".into())
        );
    }
}
