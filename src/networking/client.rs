//! Multiplayer session coordinator
//!
//! [`MultiplayerCoordinator`] keeps a local copy of one room and reconciles
//! it with the authoritative [`RoomRecord`] held by a [`RoomStore`].
//!
//! # Session lifecycle
//!
//! ```text
//! Connecting --join--> Waiting --guest seated--> Active --> Finished
//! ```
//!
//! The host plays White, the guest plays Black. `Finished` is terminal.
//!
//! # Local moves
//!
//! A move is validated locally (phase, pause, turn, legality) before any
//! store call. It is applied to the local board immediately and then
//! written as a patch. If the write fails the move stands locally and the
//! caller gets [`GameError::StoreUnavailable`] back.
//!
//! # Reconciliation
//!
//! Every inbound record carries a `version`. Records at or below the last
//! applied version are dropped, which makes redelivery and out-of-order
//! delivery harmless. When a newer record's FEN differs from the local
//! board, the board is replaced wholesale from the record.
//!
//! # Clock, pause and countdown
//!
//! The driver calls [`MultiplayerCoordinator::tick`] once per second. A tick
//! either advances the resume countdown or takes a second off the side to
//! move; it never does both. While paused or counting down the clock does
//! not move.

use crate::core::error::StoreError;
use crate::core::events::{Notifier, SessionEvent};
use crate::game::clock::{ClockTick, GameClock, PausePhase, RESUME_COUNTDOWN_SECONDS};
use crate::game::error::{GameError, GameResult};
use crate::game::outcome::{FinishReason, GameOverState, Outcome};
use crate::game::types::{restore_board, PieceColor};
use crate::networking::protocol::{ResultTag, RoomPatch, RoomRecord, RoomStatus};
use crate::networking::store::{RoomStore, RoomUpdates, SubscriptionId};
use chess_engine::{Board, GameStatus, Move, Role, Square};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a multiplayer session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplayerPhase {
    /// Not yet seated in a room
    #[default]
    Connecting,
    /// Seated as host, no guest yet
    Waiting,
    Active,
    Finished(GameOverState),
}

/// UI view of a multiplayer game
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplayerSnapshot {
    pub room_id: Option<String>,
    pub fen: String,
    /// Moves played, standard algebraic notation
    pub moves: Vec<String>,
    pub my_color: Option<PieceColor>,
    pub opponent: Option<String>,
    pub turn: PieceColor,
    pub white_seconds: u32,
    pub black_seconds: u32,
    pub clock_running: bool,
    pub pause: PausePhase,
    pub phase: MultiplayerPhase,
}

/// One player's view of a shared room
pub struct MultiplayerCoordinator<R: RoomStore + ?Sized> {
    store: Arc<R>,
    player_id: String,
    notifier: Notifier,
    countdown_from: u8,
    room_id: Option<String>,
    subscription: Option<SubscriptionId>,
    my_color: Option<PieceColor>,
    opponent: Option<String>,
    board: Board,
    clock: GameClock,
    pause: PausePhase,
    phase: MultiplayerPhase,
    last_version: u64,
    game_over_reported: bool,
}

impl<R: RoomStore + ?Sized> MultiplayerCoordinator<R> {
    pub fn new(store: Arc<R>, player_id: impl Into<String>, notifier: Notifier) -> Self {
        Self {
            store,
            player_id: player_id.into(),
            notifier,
            countdown_from: RESUME_COUNTDOWN_SECONDS,
            room_id: None,
            subscription: None,
            my_color: None,
            opponent: None,
            board: Board::new(),
            clock: GameClock::default(),
            pause: PausePhase::Running,
            phase: MultiplayerPhase::Connecting,
            last_version: 0,
            game_over_reported: false,
        }
    }

    /// Seconds counted down after a resume
    pub fn with_countdown(mut self, seconds: u8) -> Self {
        self.countdown_from = seconds;
        self
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn my_color(&self) -> Option<PieceColor> {
        self.my_color
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn pause(&self) -> &PausePhase {
        &self.pause
    }

    pub fn phase(&self) -> MultiplayerPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, MultiplayerPhase::Finished(_))
    }

    pub fn last_version(&self) -> u64 {
        self.last_version
    }

    /// Create a room and sit down in it as host
    pub async fn create_room(&mut self, clock_seconds: u32) -> GameResult<RoomUpdates> {
        let record = self
            .store
            .create_room(&self.player_id, clock_seconds)
            .await
            .map_err(|e| self.store_failure("create the room", e))?;
        self.join_room(&record.id).await
    }

    /// Take a seat in an existing room
    ///
    /// The host rejoins as White and a known guest as Black; a new player
    /// claims the empty guest seat. On error the session stays in
    /// `Connecting`.
    pub async fn join_room(&mut self, room_id: &str) -> GameResult<RoomUpdates> {
        let existing = self
            .store
            .fetch(room_id)
            .await
            .map_err(|e| self.store_failure("fetch the room", e))?
            .ok_or_else(|| GameError::RoomNotFound {
                room_id: room_id.to_string(),
            })?;

        let needs_seat = existing.color_of(&self.player_id).is_none();
        if needs_seat && existing.guest.is_some() {
            return Err(GameError::RoomFull {
                room_id: room_id.to_string(),
            });
        }

        let (subscription, updates) = self
            .store
            .subscribe(room_id)
            .await
            .map_err(|e| self.store_failure("subscribe to the room", e))?;

        let seated = if needs_seat {
            self.store.claim_guest(room_id, &self.player_id).await
        } else {
            self.store.fetch(room_id).await.and_then(|record| {
                record.ok_or_else(|| StoreError::NotFound(room_id.to_string()))
            })
        };

        let record = match seated {
            Ok(record) => record,
            Err(e) => {
                if let Err(unsub) = self.store.unsubscribe(room_id, subscription).await {
                    debug!("[ROOM] Unsubscribe after failed join: {}", unsub);
                }
                return Err(GameError::from(e));
            }
        };

        let Some(color) = record.color_of(&self.player_id) else {
            if let Err(unsub) = self.store.unsubscribe(room_id, subscription).await {
                debug!("[ROOM] Unsubscribe after losing the seat: {}", unsub);
            }
            return Err(GameError::RoomFull {
                room_id: room_id.to_string(),
            });
        };

        self.room_id = Some(record.id.clone());
        self.subscription = Some(subscription);
        self.my_color = Some(color);
        self.game_over_reported = false;
        info!("[ROOM] {} seated in {} as {}", self.player_id, record.id, color);

        self.install(record);
        self.publish();
        Ok(updates)
    }

    /// Play a local move and write it to the room
    pub async fn submit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> GameResult<()> {
        let me = self.ensure_can_move()?;
        let mv = Move {
            from,
            to,
            promotion,
        };
        if !self.board.is_legal(mv) {
            return Err(GameError::IllegalMove { mv: mv.to_string() });
        }
        self.board.apply(mv)?;
        info!("[ROOM] {} played {}", self.player_id, mv);

        let mut patch =
            RoomPatch::position(&self.board).with_clock(me, self.clock.remaining(me));

        if let Some(state) = GameOverState::from_status(self.board.status(), me) {
            let winner = state.won(me).then(|| self.player_id.clone());
            patch = patch.finished(ResultTag::from_state(&state), winner);
            self.finish(state);
        }

        self.publish();
        self.push(patch).await
    }

    /// Reconcile with an inbound room record
    pub fn on_room_update(&mut self, record: RoomRecord) {
        if self.room_id.as_deref() != Some(record.id.as_str()) {
            return;
        }
        if record.version <= self.last_version {
            debug!(
                "[ROOM] Dropping record version {} (applied {})",
                record.version, self.last_version
            );
            return;
        }
        self.last_version = record.version;

        if self.is_finished() {
            return;
        }

        self.opponent = self.opponent_in(&record);
        self.sync_board(&record);
        self.clock.white_seconds = record.white_seconds;
        self.clock.black_seconds = record.black_seconds;

        match record.status {
            RoomStatus::Waiting => {}
            RoomStatus::Playing => {
                if self.phase != MultiplayerPhase::Active {
                    info!("[ROOM] Game in {} started", record.id);
                    self.phase = MultiplayerPhase::Active;
                }
            }
            RoomStatus::Finished => {
                let state = self.state_from_record(&record);
                self.finish(state);
                self.publish();
                return;
            }
        }

        match (&self.pause, record.paused) {
            (PausePhase::Running | PausePhase::CountingDown(_), true) => {
                let by = record.paused_by.clone().unwrap_or_default();
                info!("[CLOCK] Paused by {}", by);
                self.pause = PausePhase::PausedBy(by);
            }
            (PausePhase::PausedBy(_), false) => {
                info!("[CLOCK] Resume requested, counting down");
                self.pause = self.resume_phase();
            }
            _ => {}
        }

        self.sync_clock_running();
        self.publish();
    }

    /// Advance the clock or the resume countdown by one second
    pub async fn tick(&mut self) -> GameResult<()> {
        if self.phase != MultiplayerPhase::Active {
            return Ok(());
        }

        match self.pause {
            PausePhase::PausedBy(_) => return Ok(()),
            PausePhase::CountingDown(_) => {
                self.pause = self.pause.advance_countdown();
                if self.pause == PausePhase::Running {
                    info!("[CLOCK] Countdown finished, clock resumes");
                }
                self.sync_clock_running();
                self.publish();
                return Ok(());
            }
            PausePhase::Running => {}
        }

        let side = PieceColor::from(self.board.turn());
        match self.clock.tick(side) {
            ClockTick::Idle => Ok(()),
            ClockTick::Ticked => {
                self.publish();
                Ok(())
            }
            ClockTick::Flagged(color) => self.handle_timeout(color).await,
        }
    }

    /// End the game because `color` ran out of time
    pub async fn handle_timeout(&mut self, color: PieceColor) -> GameResult<()> {
        if self.is_finished() {
            return Ok(());
        }
        info!("[CLOCK] {} ran out of time", color);

        let winner = self.player_at(color.opposite());
        let patch = RoomPatch {
            white_seconds: Some(self.clock.white_seconds),
            black_seconds: Some(self.clock.black_seconds),
            ..RoomPatch::default()
        }
        .finished(ResultTag::Timeout { loser: color }, winner);

        self.finish(GameOverState::timeout(color));
        self.publish();
        self.push(patch).await
    }

    /// Pause the game for both players
    pub async fn request_pause(&mut self) -> GameResult<()> {
        self.ensure_active()?;
        if self.pause.is_paused() {
            return Ok(());
        }

        self.pause = PausePhase::PausedBy(self.player_id.clone());
        self.sync_clock_running();
        info!("[CLOCK] {} paused the game", self.player_id);
        self.publish();

        let patch = RoomPatch {
            paused: Some(true),
            paused_by: Some(Some(self.player_id.clone())),
            white_seconds: Some(self.clock.white_seconds),
            black_seconds: Some(self.clock.black_seconds),
            ..RoomPatch::default()
        };
        self.push(patch).await
    }

    /// Resume a paused game; both players count down before the clock runs
    pub async fn request_resume(&mut self) -> GameResult<()> {
        self.ensure_active()?;
        if !self.pause.is_paused() {
            return Ok(());
        }

        self.pause = self.resume_phase();
        self.sync_clock_running();
        info!("[CLOCK] {} resumed the game", self.player_id);
        self.publish();

        let patch = RoomPatch {
            paused: Some(false),
            paused_by: Some(None),
            ..RoomPatch::default()
        };
        self.push(patch).await
    }

    /// Leave the room, abandoning the game if it is still running
    ///
    /// The leaver is reported `Abandoned` without a win; the opponent sees
    /// the abandoned record and is given the win. The patch carries the
    /// leaver's clocks so the final times survive.
    pub async fn leave_game(&mut self) -> GameResult<()> {
        let Some(room_id) = self.room_id.clone() else {
            return Ok(());
        };
        self.close().await;

        if self.is_finished() || self.phase == MultiplayerPhase::Connecting {
            return Ok(());
        }

        info!("[ROOM] {} left room {}", self.player_id, room_id);
        self.finish(GameOverState::abandoned_by_me());
        self.publish();

        let patch = RoomPatch {
            white_seconds: Some(self.clock.white_seconds),
            black_seconds: Some(self.clock.black_seconds),
            ..RoomPatch::default()
        }
        .finished(ResultTag::Abandoned, None);
        self.push(patch).await
    }

    /// Stop the clock and drop the room subscription
    pub async fn close(&mut self) {
        self.clock.stop();
        let (Some(room_id), Some(subscription)) = (self.room_id.as_deref(), self.subscription.take())
        else {
            return;
        };
        if let Err(e) = self.store.unsubscribe(room_id, subscription).await {
            warn!("[ROOM] Could not unsubscribe from {}: {}", room_id, e);
        }
    }

    pub fn snapshot(&self) -> MultiplayerSnapshot {
        MultiplayerSnapshot {
            room_id: self.room_id.clone(),
            fen: self.board.to_fen(),
            moves: self.board.san_history(),
            my_color: self.my_color,
            opponent: self.opponent.clone(),
            turn: self.board.turn().into(),
            white_seconds: self.clock.white_seconds,
            black_seconds: self.clock.black_seconds,
            clock_running: self.clock.is_running,
            pause: self.pause.clone(),
            phase: self.phase,
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Load the full state of a freshly joined room
    fn install(&mut self, record: RoomRecord) {
        self.last_version = record.version;
        self.opponent = self.opponent_in(&record);
        self.sync_board(&record);
        self.clock = GameClock {
            white_seconds: record.white_seconds,
            black_seconds: record.black_seconds,
            is_running: false,
        };
        self.pause = if record.paused {
            PausePhase::PausedBy(record.paused_by.clone().unwrap_or_default())
        } else {
            PausePhase::Running
        };

        match record.status {
            RoomStatus::Waiting => self.phase = MultiplayerPhase::Waiting,
            RoomStatus::Playing => self.phase = MultiplayerPhase::Active,
            RoomStatus::Finished => {
                let state = self.state_from_record(&record);
                self.finish(state);
            }
        }
        self.sync_clock_running();
    }

    fn ensure_active(&self) -> GameResult<()> {
        match self.phase {
            MultiplayerPhase::Active => Ok(()),
            MultiplayerPhase::Finished(_) => Err(GameError::SessionFinished),
            MultiplayerPhase::Connecting | MultiplayerPhase::Waiting => {
                Err(GameError::SessionNotActive)
            }
        }
    }

    fn ensure_can_move(&self) -> GameResult<PieceColor> {
        self.ensure_active()?;
        let me = self.my_color.ok_or(GameError::SessionNotActive)?;
        if PieceColor::from(self.board.turn()) != me {
            return Err(GameError::NotYourTurn);
        }
        if self.pause.freezes_clock() {
            return Err(GameError::Paused);
        }
        Ok(me)
    }

    fn resume_phase(&self) -> PausePhase {
        if self.countdown_from == 0 {
            PausePhase::Running
        } else {
            PausePhase::CountingDown(self.countdown_from)
        }
    }

    fn sync_clock_running(&mut self) {
        if self.phase == MultiplayerPhase::Active && !self.pause.freezes_clock() {
            self.clock.start();
        } else {
            self.clock.stop();
        }
    }

    fn sync_board(&mut self, record: &RoomRecord) {
        if record.fen == self.board.to_fen() {
            return;
        }
        match restore_board(&record.moves, &record.fen) {
            Ok(board) => self.board = board,
            Err(e) => warn!("[ROOM] Ignoring unreadable position in {}: {}", record.id, e),
        }
    }

    fn opponent_in(&self, record: &RoomRecord) -> Option<String> {
        let me = self.my_color?;
        record.player_at(me.opposite()).map(str::to_string)
    }

    fn player_at(&self, color: PieceColor) -> Option<String> {
        if self.my_color == Some(color) {
            Some(self.player_id.clone())
        } else {
            self.opponent.clone()
        }
    }

    /// Outcome of a room another client finished
    fn state_from_record(&self, record: &RoomRecord) -> GameOverState {
        let me = self.my_color.unwrap_or_default();
        match record.result {
            Some(ResultTag::Checkmate) => {
                let won = match &record.winner {
                    Some(winner) => *winner == self.player_id,
                    None => matches!(
                        self.board.status(),
                        GameStatus::Checkmate { winner } if PieceColor::from(winner) == me
                    ),
                };
                let outcome = if won { Outcome::Win } else { Outcome::Loss };
                GameOverState::new(outcome, FinishReason::Checkmate)
            }
            Some(ResultTag::Draw) => GameOverState::from_status(self.board.status(), me)
                .filter(GameOverState::is_draw)
                .unwrap_or(GameOverState::new(Outcome::Draw, FinishReason::Draw)),
            Some(ResultTag::Timeout { loser }) => GameOverState::timeout(loser),
            Some(ResultTag::Abandoned) => GameOverState::abandoned_by_opponent(),
            None => {
                warn!("[ROOM] Room {} finished without a result", record.id);
                GameOverState::new(Outcome::Draw, FinishReason::Draw)
            }
        }
    }

    /// Enter the terminal state, reporting it once
    fn finish(&mut self, state: GameOverState) {
        self.clock.stop();
        self.phase = MultiplayerPhase::Finished(state);
        if self.game_over_reported {
            return;
        }
        self.game_over_reported = true;

        let me = self.my_color.unwrap_or_default();
        info!("[ROOM] Game over: {}", state.message(me));
        self.notifier.send(SessionEvent::GameOver {
            won: state.won(me),
            outcome: state.outcome,
            reason: state.reason,
        });
    }

    async fn push(&mut self, patch: RoomPatch) -> GameResult<()> {
        let Some(room_id) = self.room_id.clone() else {
            return Err(GameError::SessionNotActive);
        };
        match self.store.update(&room_id, patch).await {
            Ok(_) => Ok(()),
            Err(e) => Err(self.store_failure("update the room", e)),
        }
    }

    fn store_failure(&self, action: &str, error: StoreError) -> GameError {
        warn!("[STORE] Could not {}: {}", action, error);
        if matches!(error, StoreError::NotFound(_) | StoreError::RoomFull(_)) {
            return GameError::from(error);
        }
        self.notifier.notice(format!("Could not {action}: {error}"));
        GameError::StoreUnavailable(error)
    }

    fn publish(&self) {
        self.notifier
            .send(SessionEvent::Multiplayer(self.snapshot()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::store::MemoryRoomStore;

    async fn seated_pair() -> (
        MultiplayerCoordinator<MemoryRoomStore>,
        MultiplayerCoordinator<MemoryRoomStore>,
        RoomUpdates,
        RoomUpdates,
    ) {
        let store = Arc::new(MemoryRoomStore::new());
        let mut host = MultiplayerCoordinator::new(store.clone(), "alice", Notifier::detached());
        let mut guest = MultiplayerCoordinator::new(store, "bob", Notifier::detached());

        let mut host_updates = host.create_room(60).await.unwrap();
        let room_id = host.room_id().unwrap().to_string();
        let guest_updates = guest.join_room(&room_id).await.unwrap();
        drain(&mut host, &mut host_updates);
        (host, guest, host_updates, guest_updates)
    }

    fn drain(coordinator: &mut MultiplayerCoordinator<MemoryRoomStore>, updates: &mut RoomUpdates) {
        while let Ok(record) = updates.try_recv() {
            coordinator.on_room_update(record);
        }
    }

    #[tokio::test]
    async fn test_host_is_white_guest_is_black() {
        let (host, guest, _, _) = seated_pair().await;

        assert_eq!(host.my_color(), Some(PieceColor::White));
        assert_eq!(guest.my_color(), Some(PieceColor::Black));
        assert_eq!(host.phase(), MultiplayerPhase::Active);
        assert_eq!(guest.phase(), MultiplayerPhase::Active);
        assert!(host.clock().is_running);
    }

    #[tokio::test]
    async fn test_host_waits_for_guest() {
        let store = Arc::new(MemoryRoomStore::new());
        let mut host = MultiplayerCoordinator::new(store, "alice", Notifier::detached());
        host.create_room(60).await.unwrap();

        assert_eq!(host.phase(), MultiplayerPhase::Waiting);
        assert!(!host.clock().is_running);
        assert!(matches!(
            host.submit_move(Square::E2, Square::E4, None).await,
            Err(GameError::SessionNotActive)
        ));
    }

    #[tokio::test]
    async fn test_move_reaches_opponent() {
        let (mut host, mut guest, _, mut guest_updates) = seated_pair().await;

        host.submit_move(Square::E2, Square::E4, None).await.unwrap();
        drain(&mut guest, &mut guest_updates);

        assert_eq!(guest.board().to_fen(), host.board().to_fen());
        assert_eq!(guest.board().san_history(), vec!["e4"]);
    }

    #[tokio::test]
    async fn test_host_plays_once_guest_is_seen() {
        //! The guest's claim is the record that lets the host move
        let (mut host, _, _, _) = seated_pair().await;
        assert_eq!(host.phase(), MultiplayerPhase::Active);
        assert_eq!(host.opponent.as_deref(), Some("bob"));
        host.submit_move(Square::E2, Square::E4, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_leaver_is_reported_once() {
        let (notifier, events) = Notifier::channel();
        let store = Arc::new(MemoryRoomStore::new());
        let mut host = MultiplayerCoordinator::new(store.clone(), "alice", Notifier::detached());
        let mut guest = MultiplayerCoordinator::new(store, "bob", notifier);
        host.create_room(60).await.unwrap();
        guest.join_room(host.room_id().unwrap()).await.unwrap();

        guest.leave_game().await.unwrap();
        guest.leave_game().await.unwrap();

        let reports: Vec<_> = events
            .try_iter()
            .filter(|event| matches!(event, SessionEvent::GameOver { .. }))
            .collect();
        assert_eq!(reports.len(), 1);
        assert!(matches!(
            reports[0],
            SessionEvent::GameOver {
                won: false,
                outcome: Outcome::Abandoned,
                reason: FinishReason::Abandoned,
            }
        ));
    }

    #[tokio::test]
    async fn test_stale_record_is_ignored() {
        let (mut host, _, _, _) = seated_pair().await;

        let mut stale = RoomRecord::new(host.room_id().unwrap(), "alice", 60);
        stale.version = host.last_version();
        stale.fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".into();
        host.on_room_update(stale);

        assert_eq!(host.board().to_fen(), Board::new().to_fen());
    }
}
