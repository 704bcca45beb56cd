use board_client::api::EngineSettings;
use board_client::cursor::NavigationStatus;
use board_client::overlay::{ArrowKind, OverlayFrame};
use board_client::prefs::Preferences;
use board_client::view::BoardSnapshot;
use board_client::{AiSide, BoardView, Client, ClientConfig, HttpGameServer};
use chess_core::{color_name, CandidateMove, Color, Square, StandardRules, Termination};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
commands:
  move <uci>        play a move, e.g. move e2e4
  engine            ask the engine to move / refresh analysis
  undo              take back the last position
  back | fwd        browse history
  new               start a new game
  side <none|white|black>
  depth <1-30>      engine search depth
  skill <0-20>      engine skill level
  panel <on|off>    show or hide analysis details
  flip              flip the board
  theme             toggle light/dark theme
  show              redraw
  quit";

/// Plain-text board and analysis on stdout.
#[derive(Default)]
struct TerminalView;

impl BoardView for TerminalView {
    fn show_board(&mut self, board: &BoardSnapshot) {
        let ranks: Vec<char> = match board.orientation {
            Color::White => ('1'..='8').rev().collect(),
            Color::Black => ('1'..='8').collect(),
        };
        let files: Vec<char> = match board.orientation {
            Color::White => ('a'..='h').collect(),
            Color::Black => ('a'..='h').rev().collect(),
        };

        println!();
        for rank in &ranks {
            let row: String = files
                .iter()
                .map(|file| {
                    let square: Option<Square> = format!("{file}{rank}").parse().ok();
                    let piece = board
                        .pieces
                        .iter()
                        .find(|(sq, _)| Some(*sq) == square)
                        .map(|(_, piece)| piece.char())
                        .unwrap_or('.');
                    let check = square.is_some() && square == board.check_square;
                    if check {
                        format!("[{piece}]")
                    } else {
                        format!(" {piece} ")
                    }
                })
                .collect();
            println!(" {rank} {row}");
        }
        let footer: String = files.iter().map(|f| format!(" {f} ")).collect();
        println!("   {footer}");

        let mode = if board.read_only { " (history)" } else { "" };
        println!("{} to move{mode}", color_name(board.position.turn()));
    }

    fn show_overlay(&mut self, frame: &OverlayFrame) {
        println!("eval: {} ({:.0}%)", frame.bar.label, frame.bar.percentage);
        for line in &frame.best_moves {
            println!("  {line}");
        }
        for arrow in &frame.arrows {
            let tag = match arrow.kind {
                ArrowKind::Best => "best",
                ArrowKind::Alternative => "alt",
            };
            println!("  -> {}{} ({tag})", arrow.from, arrow.to);
        }
        for line in frame.insights.iter().chain(&frame.positional) {
            println!("  {line}");
        }
    }

    fn clear_overlay(&mut self) {}

    fn show_navigation(&mut self, status: &NavigationStatus) {
        println!("move {}", status.label);
    }

    fn notify_game_over(&mut self, termination: &Termination) {
        println!("*** {termination} ***");
    }

    fn notify_error(&mut self, message: &str) {
        println!("! {message}");
    }
}

type TerminalClient = Client<HttpGameServer, StandardRules, TerminalView>;

/// Run one command line. Returns false when the user asked to quit.
async fn handle(client: &mut TerminalClient, draft: &mut EngineSettings, line: &str) -> bool {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return true;
    };
    let arg = words.next();

    match (command, arg) {
        ("quit" | "exit", _) => return false,
        ("help", _) => println!("{HELP}"),
        ("move", Some(uci)) => match CandidateMove::from_uci(uci) {
            Ok(mv) => {
                if let Err(e) = client.play_move(mv).await {
                    tracing::debug!("Move not played: {e}");
                }
            }
            Err(e) => println!("! {e}"),
        },
        ("engine", _) => {
            if let Err(e) = client.request_engine_move().await {
                tracing::debug!("Engine request not played: {e}");
            }
        }
        ("undo", _) => {
            if let Err(e) = client.undo().await {
                println!("! {e}");
            }
        }
        ("back", _) => {
            client.session_mut().view_previous();
        }
        ("fwd", _) => {
            client.session_mut().view_next();
        }
        ("new", _) => {
            if let Err(e) = client.new_game().await {
                tracing::debug!("Engine opening move failed: {e}");
            }
        }
        ("side", Some(side)) => match side.parse::<AiSide>() {
            Ok(side) => {
                if let Err(e) = client.set_ai_side(side).await {
                    println!("! {e}");
                }
            }
            Err(e) => println!("! {e}"),
        },
        ("depth" | "skill", Some(value)) => {
            let Ok(value) = value.parse::<u32>() else {
                println!("! not a number: {value}");
                return true;
            };
            let mut next = *draft;
            if command == "depth" {
                next.depth = value;
            } else {
                next.skill_level = value;
            }
            match client.schedule_settings(next, Instant::now()) {
                Ok(()) => *draft = next,
                Err(e) => println!("! {e}"),
            }
        }
        ("panel", Some(state)) => {
            if let Err(e) = client.set_analysis_panel_expanded(state == "on") {
                println!("! {e}");
            }
        }
        ("flip", _) => client.session_mut().flip_board(),
        ("theme", _) => match client.toggle_theme() {
            Ok(theme) => println!("theme: {theme:?}"),
            Err(e) => println!("! {e}"),
        },
        ("show", _) => client.session_mut().redraw(),
        _ => println!("unknown command, try 'help'"),
    }
    true
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ClientConfig::from_env();
    let prefs = Preferences::load(&config.prefs_path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable preferences: {e}");
        Preferences::default()
    });

    tracing::info!(server = %config.server_url, "Starting board client");
    let server = HttpGameServer::new(&config)?;
    let mut client = Client::new(server, StandardRules, TerminalView, &config, prefs);

    if let Err(e) = client.sync_with_server().await {
        tracing::warn!("Could not read engine state from server: {e}");
    }
    let mut draft = client.engine_settings();
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = client.settings_deadline();
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle(&mut client, &mut draft, &line).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Err(e) = client.flush_settings(Instant::now()).await {
                    tracing::warn!("Failed to update engine settings: {e}");
                    draft = client.engine_settings();
                }
            }
        }
    }

    tracing::info!("Bye");
    Ok(())
}
