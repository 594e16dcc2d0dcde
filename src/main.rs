//! Terminal front end
//!
//! - `solo` - play the AI, moves typed as UCI text (`e2e4`, `e7e8q`)
//! - `selfplay` - watch the AI play itself at two difficulty levels
//! - `duel` - two in-process players share a room and play a scripted game

use anyhow::{anyhow, Context};
use casual_chess::core::{AppConfig, Notifier, SessionEvent};
use casual_chess::game::{PieceColor, SoloCoordinator, SoloHandle};
use casual_chess::networking::{MemoryRoomStore, MultiplayerCoordinator, SessionHandle};
use casual_chess::persistence::SqliteGameStore;
use chess_engine::{select_move_for, Board, Move};
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::Receiver;
use shakmaty::{File, Position, Rank, Square};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "casual_chess", version, about = "Casual chess against the AI or a friend")]
struct Cli {
    /// Saved game database, overrides CHESS_DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play against the AI
    Solo {
        /// Difficulty 1-10, defaults to CHESS_DEFAULT_LEVEL
        #[arg(long)]
        level: Option<u8>,
        #[arg(long, value_enum, default_value_t = Side::White)]
        color: Side,
        /// Player id owning the save slots
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Let the AI play itself
    Selfplay {
        #[arg(long, default_value_t = 2)]
        white_level: u8,
        #[arg(long, default_value_t = 2)]
        black_level: u8,
        #[arg(long, default_value_t = 120)]
        max_plies: usize,
    },
    /// Play a scripted two-player game through an in-process room
    Duel {
        /// Seconds per side, defaults to CHESS_CLOCK_SECONDS
        #[arg(long)]
        clock_seconds: Option<u32>,
        /// Moves in UCI text, alternating host (White) and guest (Black)
        moves: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for PieceColor {
    fn from(side: Side) -> Self {
        match side {
            Side::White => PieceColor::White,
            Side::Black => PieceColor::Black,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("reading configuration")?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    init_tracing(&config);

    match cli.command {
        Command::Solo { level, color, user } => {
            let level = level.unwrap_or(config.default_level);
            run_solo(&config, level, color.into(), user).await
        }
        Command::Selfplay {
            white_level,
            black_level,
            max_plies,
        } => run_selfplay(white_level, black_level, max_plies),
        Command::Duel {
            clock_seconds,
            moves,
        } => {
            let clock_seconds = clock_seconds.unwrap_or(config.clock_seconds);
            run_duel(&config, clock_seconds, moves).await
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_solo(
    config: &AppConfig,
    level: u8,
    color: PieceColor,
    user: String,
) -> anyhow::Result<()> {
    let store = SqliteGameStore::connect(&config.database_url)
        .await
        .context("opening saved games database")?;
    let (notifier, events) = Notifier::channel();
    let printer = std::thread::spawn(move || print_events(events));

    let (coordinator, replies) = SoloCoordinator::new(Arc::new(store), user, notifier);
    let handle = SoloHandle::spawn(coordinator, replies);
    handle.start(color, level).await?;

    println!("Commands: <uci move> | undo | save | reset | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "undo" => {
                if !handle.undo().await? {
                    println!("Nothing to undo");
                }
            }
            "save" => match handle.save().await {
                Ok(true) => println!("Game saved"),
                Ok(false) => println!("Nothing to save"),
                Err(e) => println!("Save failed: {e}"),
            },
            "reset" => handle.reset(true).await?,
            text => match text.parse::<Move>() {
                Ok(mv) => {
                    if !handle.submit_move(mv.from, mv.to, mv.promotion).await? {
                        println!("Move {text} not accepted");
                    }
                }
                Err(e) => println!("{e}"),
            },
        }
    }

    drop(handle.shutdown().await);
    printer
        .join()
        .map_err(|_| anyhow!("event printer panicked"))?;
    Ok(())
}

fn run_selfplay(white_level: u8, black_level: u8, max_plies: usize) -> anyhow::Result<()> {
    let mut board = Board::new();

    while !board.is_game_over() && board.ply_count() < max_plies {
        let side = board.turn();
        let level = if side.is_white() {
            white_level
        } else {
            black_level
        };
        let result = select_move_for(&mut board, level, side);
        let Some(mv) = result.best_move else {
            break;
        };
        board.apply(mv)?;
    }

    for (number, pair) in board.san_history().chunks(2).enumerate() {
        println!("{}. {}", number + 1, pair.join(" "));
    }
    println!("{}", render_board(&board));
    println!("Result: {:?} after {} plies", board.status(), board.ply_count());
    Ok(())
}

async fn run_duel(config: &AppConfig, clock_seconds: u32, moves: Vec<String>) -> anyhow::Result<()> {
    let store = Arc::new(MemoryRoomStore::new());
    let (notifier, events) = Notifier::channel();
    let printer = std::thread::spawn(move || print_events(events));

    let mut host = MultiplayerCoordinator::new(store.clone(), anonymous_id(), notifier.clone())
        .with_countdown(config.resume_countdown);
    let host_updates = host.create_room(clock_seconds).await?;
    let room_id = host
        .room_id()
        .map(str::to_string)
        .context("room was not created")?;

    let mut guest = MultiplayerCoordinator::new(store, anonymous_id(), notifier)
        .with_countdown(config.resume_countdown);
    let guest_updates = guest.join_room(&room_id).await?;
    info!("[ROOM] Duel running in room {}", room_id);

    let host = SessionHandle::spawn(host, host_updates);
    let guest = SessionHandle::spawn(guest, guest_updates);

    for (ply, text) in moves.iter().enumerate() {
        let mv: Move = text.parse()?;
        let player = if ply % 2 == 0 { &host } else { &guest };
        // Let the previous move reach the other session first.
        tokio::time::sleep(Duration::from_millis(50)).await;
        if let Err(e) = player.submit_move(mv.from, mv.to, mv.promotion).await {
            println!("{text}: {e}");
            break;
        }
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    let guest = guest.leave().await;
    let host = host.join().await;
    if let Some(host) = &host {
        println!("{}", render_board(host.board()));
    }
    drop((host, guest));

    printer
        .join()
        .map_err(|_| anyhow!("event printer panicked"))?;
    Ok(())
}

/// Player id for a seat nobody signed in to.
fn anonymous_id() -> String {
    format!("anon-{}", Uuid::new_v4().simple())
}

fn print_events(events: Receiver<SessionEvent>) {
    for event in events.iter() {
        match event {
            SessionEvent::Solo(snapshot) => {
                if let Some(last) = snapshot.moves.last() {
                    println!("{}. {}", snapshot.moves.len().div_ceil(2), last);
                }
                if snapshot.turn == snapshot.player_color && !snapshot.phase.is_finished() {
                    match Board::from_fen(&snapshot.fen) {
                        Ok(board) => println!("{}", render_board(&board)),
                        Err(e) => println!("{e}"),
                    }
                    if snapshot.in_check {
                        println!("Check!");
                    }
                }
            }
            SessionEvent::Multiplayer(snapshot) => {
                if let Some(last) = snapshot.moves.last() {
                    println!(
                        "[{:?}] {} ({}s / {}s)",
                        snapshot.my_color, last, snapshot.white_seconds, snapshot.black_seconds
                    );
                }
            }
            SessionEvent::GameOver {
                won,
                outcome,
                reason,
            } => {
                let verdict = if won { "won" } else { "did not win" };
                println!("Game over: {outcome:?} by {reason:?}, you {verdict}");
            }
            SessionEvent::Notice(message) => eprintln!("! {message}"),
        }
    }
}

fn render_board(board: &Board) -> String {
    let pieces = board.position().board();
    let mut out = String::new();
    for rank in (0..8u32).rev() {
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..8u32 {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let symbol = pieces.piece_at(square).map_or('.', |piece| piece.char());
            out.push(symbol);
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    out
}
