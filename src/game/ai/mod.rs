//! AI opponent
//!
//! The AI's strength is a [`Difficulty`] level (1-10) mapped to a fixed
//! search depth by the engine. Searches run off the async runtime on a
//! blocking thread; see [`task`].

pub mod task;

pub use chess_engine::{depth_for, Difficulty};
pub use task::{spawn_ai_search, AiReply};
