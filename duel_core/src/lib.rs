pub mod engine;
pub mod logic;

pub use engine::config::{ConfigError, Difficulty, EngineConfig};
pub use engine::search::MinimaxEngine;
pub use engine::{Move, SearchStats, Searcher};
pub use logic::board::{ApplyOutcome, GameBoard, GameStatus, Role, Square, BOARD_SIZE};
pub use logic::dame::DameBoard;
pub use logic::game::{GameSession, MoveRecord};
pub use logic::grid::GridBoard;
pub use logic::rules::{GameKind, MoveError};
pub use logic::score::{GameResult, InMemoryScoreStore, ScoreRecord, ScoreStore};
