//! Casual chess client core
//!
//! Solo play against a depth-limited AI and networked two-player games with
//! shared clocks, built on the `chess_engine` workspace crate.
//!
//! # Module Organization
//!
//! - `core` - configuration, errors and the outbound UI event channel
//! - `game` - outcomes, clocks, the AI task and the solo session coordinator
//! - `networking` - room records, the realtime room store and the
//!   multiplayer session coordinator
//! - `persistence` - saved solo games (in-memory and SQLite)

pub mod core;
pub mod game;
pub mod networking;
pub mod persistence;

pub use chess_engine;
