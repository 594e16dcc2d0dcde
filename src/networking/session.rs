//! Multiplayer session driver
//!
//! One tokio task per multiplayer session owns the coordinator and selects
//! over three sources:
//!
//! - UI commands ([`MultiplayerCommand`])
//! - room records pushed by the store subscription
//! - a one-second interval that drives both the clock and the resume
//!   countdown
//!
//! Handlers run one at a time, so the coordinator never sees concurrent
//! mutation. Pending room records always go first, so a command is judged
//! against the newest state the store has delivered. The loop ends when the player leaves, the UI drops its handle,
//! the subscription closes, or the game finishes; in every case the
//! interval stops with it.

use crate::game::error::{GameError, GameResult};
use crate::networking::client::MultiplayerCoordinator;
use crate::networking::store::{RoomStore, RoomUpdates};
use chess_engine::{Role, Square};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Clock resolution
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Request sent to a running multiplayer session
#[derive(Debug)]
pub enum MultiplayerCommand {
    Move {
        from: Square,
        to: Square,
        promotion: Option<Role>,
        reply: oneshot::Sender<GameResult<()>>,
    },
    Pause {
        reply: oneshot::Sender<GameResult<()>>,
    },
    Resume {
        reply: oneshot::Sender<GameResult<()>>,
    },
    Leave,
}

/// Drive a seated coordinator until the session ends
///
/// Returns the coordinator so callers can inspect the final state.
pub async fn run_session<R>(
    mut coordinator: MultiplayerCoordinator<R>,
    mut commands: mpsc::Receiver<MultiplayerCommand>,
    mut updates: RoomUpdates,
) -> MultiplayerCoordinator<R>
where
    R: RoomStore + ?Sized,
{
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            // Records already delivered by the store are applied before any
            // command or tick.
            biased;

            update = updates.recv() => match update {
                Some(record) => coordinator.on_room_update(record),
                None => {
                    warn!("[ROOM] Room subscription closed");
                    coordinator.close().await;
                    break;
                }
            },
            _ = ticker.tick() => {
                if let Err(e) = coordinator.tick().await {
                    warn!("[CLOCK] Tick failed: {}", e);
                }
            }
            command = commands.recv() => match command {
                Some(MultiplayerCommand::Move { from, to, promotion, reply }) => {
                    let _ = reply.send(coordinator.submit_move(from, to, promotion).await);
                }
                Some(MultiplayerCommand::Pause { reply }) => {
                    let _ = reply.send(coordinator.request_pause().await);
                }
                Some(MultiplayerCommand::Resume { reply }) => {
                    let _ = reply.send(coordinator.request_resume().await);
                }
                Some(MultiplayerCommand::Leave) | None => {
                    if let Err(e) = coordinator.leave_game().await {
                        warn!("[ROOM] Leaving did not reach the store: {}", e);
                    }
                    break;
                }
            },
        }

        if coordinator.is_finished() {
            coordinator.close().await;
            break;
        }
    }

    info!("[ROOM] Session for {} ended", coordinator.player_id());
    coordinator
}

/// Handle to a multiplayer session running on the tokio runtime
pub struct SessionHandle<R: RoomStore + ?Sized + 'static> {
    commands: mpsc::Sender<MultiplayerCommand>,
    task: JoinHandle<MultiplayerCoordinator<R>>,
}

impl<R: RoomStore + ?Sized + 'static> SessionHandle<R> {
    /// Spawn [`run_session`] for a coordinator that has joined a room
    pub fn spawn(coordinator: MultiplayerCoordinator<R>, updates: RoomUpdates) -> Self {
        let (commands, commands_rx) = mpsc::channel(32);
        let task = tokio::spawn(run_session(coordinator, commands_rx, updates));
        Self { commands, task }
    }

    pub async fn submit_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> GameResult<()> {
        let (reply, rx) = oneshot::channel();
        self.request(
            MultiplayerCommand::Move {
                from,
                to,
                promotion,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn pause(&self) -> GameResult<()> {
        let (reply, rx) = oneshot::channel();
        self.request(MultiplayerCommand::Pause { reply }, rx).await
    }

    pub async fn resume(&self) -> GameResult<()> {
        let (reply, rx) = oneshot::channel();
        self.request(MultiplayerCommand::Resume { reply }, rx).await
    }

    /// Whether the session loop has ended
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Leave the room and hand back the coordinator
    pub async fn leave(self) -> Option<MultiplayerCoordinator<R>> {
        let _ = self.commands.send(MultiplayerCommand::Leave).await;
        self.join().await
    }

    /// Wait for the session to end on its own
    pub async fn join(self) -> Option<MultiplayerCoordinator<R>> {
        match self.task.await {
            Ok(coordinator) => Some(coordinator),
            Err(e) => {
                error!("[ROOM] Session task failed: {}", e);
                None
            }
        }
    }

    async fn request(
        &self,
        command: MultiplayerCommand,
        reply: oneshot::Receiver<GameResult<()>>,
    ) -> GameResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GameError::SessionFinished)?;
        reply.await.map_err(|_| GameError::SessionFinished)?
    }
}
