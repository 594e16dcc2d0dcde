//! Solo game session
//!
//! [`SoloCoordinator`] runs one human-vs-AI game. It owns the board, decides
//! whose turn it is, starts AI searches in the background and applies their
//! replies, and keeps the saved-game slot for the current level in sync.
//!
//! # Turn flow
//!
//! ```text
//! AwaitingHuman --human move--> AwaitingAi --search started--> Thinking
//!       ^                                                          |
//!       +--------------------------- AI reply ---------------------+
//! ```
//!
//! Any state moves to `Finished` once the board reaches checkmate,
//! stalemate or insufficient material. A finished game deletes its save.
//!
//! # Cancellation
//!
//! Each AI search is tagged with the coordinator's generation counter.
//! Starting a game, undoing or resetting bumps the generation, so a reply
//! that arrives afterwards is recognised as stale and dropped.
//!
//! # Driver
//!
//! The coordinator is a plain struct; [`run_solo`] is the async loop that
//! feeds it [`SoloCommand`]s and AI replies. Tests usually call the
//! coordinator directly.

use crate::core::events::{Notifier, SessionEvent};
use crate::game::ai::{spawn_ai_search, AiReply, Difficulty};
use crate::game::error::{GameError, GameResult};
use crate::game::outcome::GameOverState;
use crate::game::types::PieceColor;
use crate::persistence::{GameStore, SavedGame};
use chess_engine::{Board, Move, Role, Square};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Whose move it is in a solo game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoloPhase {
    #[default]
    AwaitingHuman,
    /// AI to move, search not yet started
    AwaitingAi,
    /// AI search in flight
    Thinking,
    Finished(GameOverState),
}

impl SoloPhase {
    pub fn is_ai_turn(self) -> bool {
        matches!(self, SoloPhase::AwaitingAi | SoloPhase::Thinking)
    }

    pub fn is_finished(self) -> bool {
        matches!(self, SoloPhase::Finished(_))
    }
}

/// UI view of a solo game
#[derive(Debug, Clone, PartialEq)]
pub struct SoloSnapshot {
    pub fen: String,
    /// Moves played, standard algebraic notation
    pub moves: Vec<String>,
    pub player_color: PieceColor,
    pub level: u8,
    pub turn: PieceColor,
    pub in_check: bool,
    pub phase: SoloPhase,
}

/// Human-vs-AI session
pub struct SoloCoordinator<S: GameStore + ?Sized> {
    store: Arc<S>,
    user_id: String,
    notifier: Notifier,
    board: Board,
    player_color: PieceColor,
    level: Difficulty,
    phase: SoloPhase,
    generation: u64,
    ai_task: Option<JoinHandle<()>>,
    ai_replies: mpsc::UnboundedSender<AiReply>,
}

impl<S: GameStore + ?Sized + 'static> SoloCoordinator<S> {
    /// Create an idle coordinator and the receiver its AI replies arrive on
    pub fn new(
        store: Arc<S>,
        user_id: impl Into<String>,
        notifier: Notifier,
    ) -> (Self, mpsc::UnboundedReceiver<AiReply>) {
        let (ai_replies, replies_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            store,
            user_id: user_id.into(),
            notifier,
            board: Board::new(),
            player_color: PieceColor::White,
            level: Difficulty::default(),
            phase: SoloPhase::AwaitingHuman,
            generation: 0,
            ai_task: None,
            ai_replies,
        };
        (coordinator, replies_rx)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> SoloPhase {
        self.phase
    }

    pub fn player_color(&self) -> PieceColor {
        self.player_color
    }

    pub fn level(&self) -> Difficulty {
        self.level
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start (or resume) a game as `color` at difficulty `level`
    ///
    /// A save for this level is resumed when it was played with the same
    /// color; otherwise a fresh game starts. If the AI is to move, its
    /// search is started before this returns.
    pub async fn start_game(&mut self, color: PieceColor, level: u8) {
        self.cancel_ai();
        self.player_color = color;
        self.level = Difficulty::new(level);

        self.board = match self.store.load(&self.user_id, self.level.level()).await {
            Ok(Some(saved)) if saved.player_color == color => match saved.restore() {
                Ok(board) => {
                    info!(
                        "[SOLO] Resuming saved game at {} after {} plies",
                        self.level,
                        board.ply_count()
                    );
                    board
                }
                Err(e) => {
                    warn!("[SOLO] Saved game is unreadable, starting fresh: {}", e);
                    Board::new()
                }
            },
            Ok(Some(_)) => {
                debug!("[SOLO] Saved game was played with the other color, starting fresh");
                Board::new()
            }
            Ok(None) => Board::new(),
            Err(e) => {
                warn!("[SOLO] Could not load saved game: {}", e);
                self.notifier
                    .notice(format!("Saved game could not be loaded: {e}"));
                Board::new()
            }
        };

        info!("[SOLO] Game started: human plays {} at {}", color, self.level);
        self.settle().await;
        self.publish();
    }

    /// Play the human's move
    ///
    /// Returns `false` (and changes nothing) when it is not the human's turn
    /// or the move is illegal.
    pub async fn submit_human_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> bool {
        if self.phase != SoloPhase::AwaitingHuman {
            debug!("[SOLO] Ignoring move while {:?}", self.phase);
            return false;
        }

        let mv = Move {
            from,
            to,
            promotion,
        };
        if let Err(e) = self.board.apply(mv) {
            debug!("[SOLO] Rejected human move: {}", e);
            return false;
        }

        info!("[SOLO] Human played {}", mv);
        self.settle().await;
        self.publish();
        true
    }

    /// Apply a finished AI search
    ///
    /// Returns `false` when the reply is stale (from a cancelled search) or
    /// arrives when the AI is not to move. An unplayable move restarts the
    /// search under a new generation.
    pub async fn handle_ai_reply(&mut self, reply: AiReply) -> bool {
        if reply.generation != self.generation || !self.phase.is_ai_turn() {
            debug!(
                "[AI] Dropping stale reply (generation {}, current {})",
                reply.generation, self.generation
            );
            return false;
        }
        self.ai_task = None;

        let Some(mv) = reply.result.best_move else {
            warn!("[AI] Search returned no move");
            self.settle().await;
            self.publish();
            return false;
        };
        if let Err(e) = self.board.apply(mv) {
            error!("[AI] Search produced an unplayable move: {}", e);
            self.cancel_ai();
            self.start_ai();
            return false;
        }

        info!("[SOLO] AI played {}", mv);
        self.settle().await;
        self.publish();
        true
    }

    /// Take back the last human move and the AI reply to it
    ///
    /// Only allowed on the human's turn with at least two plies played.
    pub fn undo(&mut self) -> bool {
        if self.phase != SoloPhase::AwaitingHuman || self.board.ply_count() < 2 {
            return false;
        }

        self.cancel_ai();
        self.board.undo();
        self.board.undo();
        info!("[SOLO] Undid last move pair, {} plies left", self.board.ply_count());
        self.publish();
        true
    }

    /// Write the current game to its save slot
    ///
    /// Returns `Ok(false)` when there is nothing worth saving (no moves
    /// played, or the game is over).
    pub async fn save(&self) -> GameResult<bool> {
        if self.board.ply_count() == 0 || self.phase.is_finished() {
            return Ok(false);
        }

        let game = SavedGame::capture(&self.board, self.level.level(), self.player_color);
        if let Err(e) = self
            .store
            .save(&self.user_id, self.level.level(), &game)
            .await
        {
            warn!("[STORE] Saving game failed: {}", e);
            self.notifier.notice(format!("Game could not be saved: {e}"));
            return Err(GameError::StoreUnavailable(e));
        }

        info!("[SOLO] Game saved at {} ({} plies)", self.level, game.moves.len());
        Ok(true)
    }

    /// Restart from the initial position with the same color and level
    ///
    /// With `persist` the save slot is cleared as well. The local reset
    /// always happens; a store failure is reported afterwards.
    pub async fn reset(&mut self, persist: bool) -> GameResult<()> {
        self.cancel_ai();
        self.board = Board::new();
        info!("[SOLO] Game reset");
        self.settle().await;
        self.publish();

        if persist {
            self.delete_save().await?;
        }
        Ok(())
    }

    /// Cancel any in-flight AI search
    pub fn cancel_ai(&mut self) {
        self.generation += 1;
        if let Some(task) = self.ai_task.take() {
            task.abort();
            debug!("[AI] Cancelled search");
        }
        if self.phase == SoloPhase::Thinking {
            self.phase = SoloPhase::AwaitingAi;
        }
    }

    pub fn snapshot(&self) -> SoloSnapshot {
        SoloSnapshot {
            fen: self.board.to_fen(),
            moves: self.board.san_history(),
            player_color: self.player_color,
            level: self.level.level(),
            turn: self.board.turn().into(),
            in_check: self.board.is_check(),
            phase: self.phase,
        }
    }

    /// Decide the next phase after the board changed
    async fn settle(&mut self) {
        if let Some(state) = GameOverState::from_status(self.board.status(), self.player_color) {
            self.finish(state).await;
            return;
        }

        if PieceColor::from(self.board.turn()) == self.player_color {
            self.phase = SoloPhase::AwaitingHuman;
        } else {
            self.phase = SoloPhase::AwaitingAi;
            self.start_ai();
        }
    }

    fn start_ai(&mut self) {
        let ai_color = self.player_color.opposite();
        debug!("[AI] Thinking as {} at {}", ai_color, self.level);
        self.ai_task = Some(spawn_ai_search(
            self.board.clone(),
            self.level.level(),
            ai_color,
            self.generation,
            self.ai_replies.clone(),
        ));
        self.phase = SoloPhase::Thinking;
    }

    async fn finish(&mut self, state: GameOverState) {
        self.phase = SoloPhase::Finished(state);
        info!("[SOLO] Game over: {}", state.message(self.player_color));

        self.notifier.send(SessionEvent::GameOver {
            won: state.won(self.player_color),
            outcome: state.outcome,
            reason: state.reason,
        });

        if let Err(e) = self.delete_save().await {
            debug!("[SOLO] Finished game left in its save slot: {}", e);
        }
    }

    async fn delete_save(&self) -> GameResult<()> {
        if let Err(e) = self.store.delete(&self.user_id, self.level.level()).await {
            warn!("[STORE] Deleting saved game failed: {}", e);
            self.notifier
                .notice(format!("Saved game could not be removed: {e}"));
            return Err(GameError::StoreUnavailable(e));
        }
        Ok(())
    }

    fn publish(&self) {
        self.notifier.send(SessionEvent::Solo(self.snapshot()));
    }
}

/// Request sent to a running solo session
#[derive(Debug)]
pub enum SoloCommand {
    Start {
        color: PieceColor,
        level: u8,
    },
    Move {
        from: Square,
        to: Square,
        promotion: Option<Role>,
        reply: oneshot::Sender<bool>,
    },
    Undo {
        reply: oneshot::Sender<bool>,
    },
    Save {
        reply: oneshot::Sender<GameResult<bool>>,
    },
    Reset {
        persist: bool,
    },
    Shutdown,
}

/// Drive a solo session until it is shut down
///
/// Returns the coordinator so callers can inspect the final state.
pub async fn run_solo<S>(
    mut coordinator: SoloCoordinator<S>,
    mut commands: mpsc::Receiver<SoloCommand>,
    mut ai_replies: mpsc::UnboundedReceiver<AiReply>,
) -> SoloCoordinator<S>
where
    S: GameStore + ?Sized + 'static,
{
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SoloCommand::Start { color, level }) => {
                    coordinator.start_game(color, level).await;
                }
                Some(SoloCommand::Move { from, to, promotion, reply }) => {
                    let accepted = coordinator.submit_human_move(from, to, promotion).await;
                    let _ = reply.send(accepted);
                }
                Some(SoloCommand::Undo { reply }) => {
                    let _ = reply.send(coordinator.undo());
                }
                Some(SoloCommand::Save { reply }) => {
                    let _ = reply.send(coordinator.save().await);
                }
                Some(SoloCommand::Reset { persist }) => {
                    if let Err(e) = coordinator.reset(persist).await {
                        warn!("[SOLO] Reset completed with store error: {}", e);
                    }
                }
                Some(SoloCommand::Shutdown) | None => {
                    coordinator.cancel_ai();
                    info!("[SOLO] Session closed");
                    break;
                }
            },
            Some(reply) = ai_replies.recv() => {
                coordinator.handle_ai_reply(reply).await;
            }
        }
    }
    coordinator
}

/// Handle to a solo session running on the tokio runtime
pub struct SoloHandle<S: GameStore + ?Sized + 'static> {
    commands: mpsc::Sender<SoloCommand>,
    task: JoinHandle<SoloCoordinator<S>>,
}

impl<S: GameStore + ?Sized + 'static> SoloHandle<S> {
    /// Spawn [`run_solo`] for `coordinator`
    pub fn spawn(
        coordinator: SoloCoordinator<S>,
        ai_replies: mpsc::UnboundedReceiver<AiReply>,
    ) -> Self {
        let (commands, commands_rx) = mpsc::channel(32);
        let task = tokio::spawn(run_solo(coordinator, commands_rx, ai_replies));
        Self { commands, task }
    }

    pub async fn start(&self, color: PieceColor, level: u8) -> GameResult<()> {
        self.send(SoloCommand::Start { color, level }).await
    }

    pub async fn submit_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> GameResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(SoloCommand::Move {
            from,
            to,
            promotion,
            reply,
        })
        .await?;
        rx.await.map_err(|_| GameError::SessionNotActive)
    }

    pub async fn undo(&self) -> GameResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(SoloCommand::Undo { reply }).await?;
        rx.await.map_err(|_| GameError::SessionNotActive)
    }

    pub async fn save(&self) -> GameResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(SoloCommand::Save { reply }).await?;
        rx.await.map_err(|_| GameError::SessionNotActive)?
    }

    pub async fn reset(&self, persist: bool) -> GameResult<()> {
        self.send(SoloCommand::Reset { persist }).await
    }

    /// Stop the session and hand back the coordinator
    pub async fn shutdown(self) -> Option<SoloCoordinator<S>> {
        let _ = self.commands.send(SoloCommand::Shutdown).await;
        match self.task.await {
            Ok(coordinator) => Some(coordinator),
            Err(e) => {
                error!("[SOLO] Session task failed: {}", e);
                None
            }
        }
    }

    async fn send(&self, command: SoloCommand) -> GameResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| GameError::SessionNotActive)
    }
}
