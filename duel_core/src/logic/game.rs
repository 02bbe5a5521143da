use crate::engine::config::Difficulty;
use crate::engine::search::MinimaxEngine;
use crate::engine::Move;
use crate::logic::board::{ApplyOutcome, GameBoard, GameStatus, Role, Square};
use crate::logic::rules::MoveError;
use crate::logic::score::{GameResult, ScoreStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub role: Role,
    pub mv: Move,
    pub chain_continues: bool,
}

/// A live game between a human and the engine.
///
/// The session owns the only board that is ever mutated for real; the engine
/// gets a shared reference and explores clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession<B> {
    board: B,
    human: Role,
    difficulty: Difficulty,
    status: GameStatus,
    history: Vec<MoveRecord>,
    recorded: bool,
}

impl<B: GameBoard + Default> GameSession<B> {
    pub fn new(human: Role, difficulty: Difficulty) -> Self {
        Self::with_board(B::default(), human, difficulty)
    }

    /// Starts over from the initial position with the same players.
    pub fn reset(&mut self) {
        *self = Self::new(self.human, self.difficulty);
    }
}

impl<B: GameBoard> GameSession<B> {
    pub fn with_board(board: B, human: Role, difficulty: Difficulty) -> Self {
        let status = board.winner();
        Self {
            board,
            human,
            difficulty,
            status,
            history: Vec::new(),
            recorded: false,
        }
    }

    pub const fn board(&self) -> &B {
        &self.board
    }

    pub const fn human(&self) -> Role {
        self.human
    }

    pub const fn ai(&self) -> Role {
        self.human.opposite()
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub const fn status(&self) -> GameStatus {
        self.status
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn turn(&self) -> Role {
        self.board.turn()
    }

    pub fn is_ai_turn(&self) -> bool {
        !self.status.is_over() && self.turn() == self.ai()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves(self.turn())
    }

    /// Moves of the piece on `sq` for the side to move, for piece selection.
    pub fn moves_from(&self, sq: Square) -> Vec<Move> {
        self.board.moves_from(sq, self.turn())
    }

    /// Plays `mv` for the side to move. Only moves from the current legal
    /// list are accepted.
    pub fn play_move(&mut self, mv: &Move) -> Result<ApplyOutcome, MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        let role = self.turn();
        if !self.board.legal_moves(role).contains(mv) {
            return Err(MoveError::IllegalMove);
        }

        let outcome = self.board.apply(mv, role)?;
        self.history.push(MoveRecord {
            role,
            mv: mv.clone(),
            chain_continues: outcome.chain_continues(),
        });
        self.refresh_status();
        Ok(outcome)
    }

    pub fn play_human(&mut self, mv: &Move) -> Result<ApplyOutcome, MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.turn() != self.human {
            return Err(MoveError::NotYourTurn);
        }
        self.play_move(mv)
    }

    /// Lets the engine play its whole turn, following a capture chain to the
    /// end. Returns the moves played in order.
    pub fn play_ai_turn(&mut self, engine: &mut MinimaxEngine) -> Result<Vec<Move>, MoveError> {
        if self.status.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.turn() != self.ai() {
            return Err(MoveError::NotYourTurn);
        }

        let ai = self.ai();
        let mut played = Vec::new();
        while let Some(mv) = engine.find_best_move(&self.board, ai, self.difficulty.depth()) {
            let outcome = self.play_move(&mv)?;
            log::info!(
                "AI ({ai}) played {mv} [{} nodes]",
                engine.nodes_searched()
            );
            played.push(mv);
            if !outcome.chain_continues() || self.status.is_over() {
                break;
            }
        }
        self.refresh_status();
        Ok(played)
    }

    /// Result for the human, once the game is over.
    pub fn result(&self) -> Option<GameResult> {
        match self.status {
            GameStatus::Playing => None,
            GameStatus::Draw => Some(GameResult::Draw),
            GameStatus::Won(role) if role == self.human => Some(GameResult::Win),
            GameStatus::Won(_) => Some(GameResult::Loss),
        }
    }

    /// Reports the finished game to `store`. Only the first call per game
    /// records anything.
    pub fn record_result<S: ScoreStore>(&mut self, store: &mut S, user: &str) -> Option<GameResult> {
        if self.recorded {
            return None;
        }
        let result = self.result()?;
        store.record(user, self.board.kind(), self.difficulty, result);
        self.recorded = true;
        Some(result)
    }

    fn refresh_status(&mut self) {
        let status = self.board.winner();
        if status.is_over() && !self.status.is_over() {
            match status {
                GameStatus::Won(role) => log::info!("{} over: {role} wins", self.board.kind()),
                _ => log::info!("{} over: draw", self.board.kind()),
            }
        }
        self.status = status;
    }
}
