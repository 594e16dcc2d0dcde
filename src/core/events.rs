//! Outbound UI events
//!
//! Session coordinators never call into a UI directly. They push
//! [`SessionEvent`]s into a `crossbeam_channel` and whatever front end is
//! attached (the CLI, a test, a renderer) drains the receiving end at its
//! own pace.
//!
//! A [`Notifier`] whose receiver has been dropped keeps working; events are
//! discarded with a trace log so a closed UI can never stall a session.

use crate::game::outcome::{FinishReason, Outcome};
use crate::game::solo::SoloSnapshot;
use crate::networking::client::MultiplayerSnapshot;
use crossbeam_channel::{Receiver, Sender};
use tracing::trace;

/// Event emitted by a session coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Solo session state changed
    Solo(SoloSnapshot),
    /// Multiplayer session state changed
    Multiplayer(MultiplayerSnapshot),
    /// Game reached a terminal state; sent exactly once per game
    GameOver {
        won: bool,
        outcome: Outcome,
        reason: FinishReason,
    },
    /// Non-fatal problem the player should know about (store failures)
    Notice(String),
}

/// Sending half of the UI event channel
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<Sender<SessionEvent>>,
}

impl Notifier {
    /// Create a notifier and the receiver a UI drains
    pub fn channel() -> (Self, Receiver<SessionEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Notifier with no UI attached
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn send(&self, event: SessionEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(event).is_err() {
            trace!("[EVENTS] UI receiver dropped, discarding event");
        }
    }

    pub fn notice(&self, message: impl Into<String>) {
        self.send(SessionEvent::Notice(message.into()));
    }
}
