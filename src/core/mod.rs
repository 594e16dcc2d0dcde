//! Core module - configuration, error types and UI notification
//!
//! - [`AppConfig`] - settings loaded from the environment (and `.env`)
//! - [`SessionEvent`] / [`Notifier`] - snapshot and game-over events sent
//!   from the session coordinators to whatever UI is attached
//! - [`CoreError`] / [`StoreError`] - configuration and store failures

pub mod config;
pub mod error;
pub mod events;

pub use config::AppConfig;
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use events::{Notifier, SessionEvent};
