use crate::engine::config::Difficulty;
use crate::logic::rules::GameKind;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Outcome of a finished game from the human player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub wins: u32,
    pub losses: u32,
}

/// Win/loss counters per user, game and difficulty.
///
/// The engine knows nothing about this; [`crate::logic::game::GameSession`]
/// reports finished games through it.
pub trait ScoreStore {
    /// Counts one result. Draws are not counted.
    fn record(&mut self, user: &str, kind: GameKind, difficulty: Difficulty, result: GameResult);

    fn score(&self, user: &str, kind: GameKind, difficulty: Difficulty) -> ScoreRecord;

    /// Users ordered by wins, most first.
    fn leaderboard(&self, kind: GameKind, difficulty: Difficulty) -> Vec<(String, ScoreRecord)>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreStore {
    records: HashMap<(String, GameKind, Difficulty), ScoreRecord>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn record(&mut self, user: &str, kind: GameKind, difficulty: Difficulty, result: GameResult) {
        if result == GameResult::Draw {
            return;
        }
        let entry = self
            .records
            .entry((user.to_string(), kind, difficulty))
            .or_default();
        match result {
            GameResult::Win => entry.wins += 1,
            GameResult::Loss => entry.losses += 1,
            GameResult::Draw => {}
        }
        log::debug!("Recorded {result:?} for {user} ({kind}, {difficulty})");
    }

    fn score(&self, user: &str, kind: GameKind, difficulty: Difficulty) -> ScoreRecord {
        self.records
            .get(&(user.to_string(), kind, difficulty))
            .copied()
            .unwrap_or_default()
    }

    fn leaderboard(&self, kind: GameKind, difficulty: Difficulty) -> Vec<(String, ScoreRecord)> {
        let mut rows: Vec<(String, ScoreRecord)> = self
            .records
            .iter()
            .filter(|((_, k, d), _)| *k == kind && *d == difficulty)
            .map(|((user, _, _), record)| (user.clone(), *record))
            .collect();
        rows.sort_by(|(a_user, a), (b_user, b)| {
            (Reverse(a.wins), a.losses, a_user).cmp(&(Reverse(b.wins), b.losses, b_user))
        });
        rows
    }
}
