use duel_core::engine::config::{Difficulty, EngineConfig};
use duel_core::engine::search::MinimaxEngine;
use duel_core::engine::{Move, Searcher};
use duel_core::logic::board::{GameBoard, GameStatus, Role, Square};
use duel_core::logic::dame::DameBoard;
use duel_core::logic::game::GameSession;
use duel_core::logic::grid::GridBoard;
use duel_core::logic::rules::GameKind;
use duel_core::logic::score::{InMemoryScoreStore, ScoreStore};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: duel [grid|dame] [easy|medium|hard] [--self-play] [--json] [--config PATH]
  grid moves:  row,col          e.g. 2,3
  dame moves:  row,col row,col  e.g. 1,1 2,2";

const PLAYER: &str = "player";

struct Options {
    kind: GameKind,
    difficulty: Difficulty,
    self_play: bool,
    json: bool,
    help: bool,
    config: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            kind: GameKind::FourInARow,
            difficulty: Difficulty::Medium,
            self_play: false,
            json: false,
            help: false,
            config: None,
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "grid" | "four" => options.kind = GameKind::FourInARow,
            "dame" | "checkers" => options.kind = GameKind::Dame,
            "easy" => options.difficulty = Difficulty::Easy,
            "medium" => options.difficulty = Difficulty::Medium,
            "hard" => options.difficulty = Difficulty::Hard,
            "--self-play" => options.self_play = true,
            "--json" => options.json = true,
            "-h" | "--help" => options.help = true,
            "--config" => options.config = Some(args.next().ok_or("--config needs a path")?),
            other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
        }
    }
    Ok(options)
}

fn parse_square(token: &str) -> Option<Square> {
    let (row, col) = token.split_once(',')?;
    Square::new(row.trim().parse().ok()?, col.trim().parse().ok()?)
}

/// Matches typed squares against the legal moves: one square for a
/// placement, two for a piece move or capture.
fn parse_move(line: &str, legal: &[Move]) -> Option<Move> {
    let squares: Vec<Square> = line.split_whitespace().map(parse_square).collect::<Option<_>>()?;
    let found = match squares.as_slice() {
        [to] => legal.iter().find(|mv| mv.from().is_none() && mv.to() == *to),
        [from, to] => legal
            .iter()
            .find(|mv| mv.from() == Some(*from) && mv.to() == *to),
        _ => None,
    };
    found.cloned()
}

fn play_engine_turn<B: GameBoard>(
    session: &mut GameSession<B>,
    engine: &mut MinimaxEngine,
) -> Result<(), Box<dyn Error>> {
    if session.is_ai_turn() {
        for mv in session.play_ai_turn(engine)? {
            println!("{} plays {mv}", session.ai());
        }
        return Ok(());
    }

    // Self-play: the engine also moves for the human side.
    let role = session.turn();
    let Some((mv, stats)) = engine.search(session.board(), role) else {
        return Ok(());
    };
    tracing::info!(
        depth = stats.depth,
        nodes = stats.nodes,
        cutoffs = stats.cutoffs,
        time_ms = stats.time_ms,
        "{role} plays {mv}"
    );
    println!("{role} plays {mv}");
    session.play_move(&mv)?;
    Ok(())
}

fn run<B>(options: &Options, config: EngineConfig) -> Result<(), Box<dyn Error>>
where
    B: GameBoard + Default + fmt::Display + Serialize,
{
    let mut engine = MinimaxEngine::new(Arc::new(config));
    let mut session: GameSession<B> = GameSession::new(Role::White, options.difficulty);
    let kind = session.board().kind();
    println!("{kind} ({}, you play {})", options.difficulty, session.human());
    println!("{}\n", kind.rules());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !session.status().is_over() {
        println!("{}", session.board());
        if options.self_play || session.is_ai_turn() {
            play_engine_turn(&mut session, &mut engine)?;
            continue;
        }

        print!("{} to move > ", session.turn());
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let Some(mv) = parse_move(&line, &session.legal_moves()) else {
            println!("No legal move matches '{}'", line.trim());
            continue;
        };
        if let Err(err) = session.play_human(&mv) {
            println!("{err}");
        }
    }

    println!("{}", session.board());
    match session.status() {
        GameStatus::Won(role) => println!("{role} wins"),
        GameStatus::Draw => println!("Draw"),
        GameStatus::Playing => println!("Game abandoned"),
    }

    let mut store = InMemoryScoreStore::new();
    if let Some(result) = session.record_result(&mut store, PLAYER) {
        let record = store.score(PLAYER, kind, options.difficulty);
        tracing::info!(?result, wins = record.wins, losses = record.losses, "game recorded");
    }
    if options.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = parse_args(std::env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = match &options.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::from_difficulty(options.difficulty),
    };
    tracing::info!(?config, "engine configured");

    match options.kind {
        GameKind::FourInARow => run::<GridBoard>(&options, config),
        GameKind::Dame => run::<DameBoard>(&options, config),
    }
}
