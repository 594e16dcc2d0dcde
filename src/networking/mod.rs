//! Networking module - shared rooms for two-player games
//!
//! # Module Organization
//!
//! - `protocol` - room records and patches exchanged with the store
//! - `store` - [`RoomStore`] trait and the in-process [`MemoryRoomStore`]
//! - `client` - [`MultiplayerCoordinator`], one player's view of a room
//! - `session` - async driver running a coordinator on a tokio task

pub mod client;
pub mod protocol;
pub mod session;
pub mod store;

pub use client::{MultiplayerCoordinator, MultiplayerPhase, MultiplayerSnapshot};
pub use protocol::{ResultTag, RoomPatch, RoomRecord, RoomStatus};
pub use session::{run_session, MultiplayerCommand, SessionHandle, TICK_INTERVAL};
pub use store::{MemoryRoomStore, RoomStore, RoomUpdates, SubscriptionId};
