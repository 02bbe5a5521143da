use crate::engine::config::EngineConfig;
use crate::engine::ordering::{order_by_priority, order_moves};
use crate::engine::{Move, SearchStats, Searcher};
use crate::logic::board::{ApplyOutcome, GameBoard, GameStatus, Role};
use crate::logic::eval_constants::WIN_SCORE;
use std::sync::Arc;
use std::time::Instant;

/// Finite stand-in for infinity, above any score the search can produce.
pub const SCORE_INFINITY: i32 = 2 * WIN_SCORE;

/// Depth-limited minimax with alpha-beta pruning, generic over the game.
///
/// Scores are always taken from the AI's point of view. The search works on
/// clones only; the board passed in is never touched.
pub struct MinimaxEngine {
    config: Arc<EngineConfig>,
    nodes_searched: u64,
    cutoffs: u64,
}

impl Default for MinimaxEngine {
    fn default() -> Self {
        Self::new(Arc::new(EngineConfig::default()))
    }
}

impl MinimaxEngine {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            nodes_searched: 0,
            cutoffs: 0,
        }
    }

    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.config = config;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Nodes visited by the last search.
    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    pub const fn cutoffs(&self) -> u64 {
        self.cutoffs
    }

    /// Best move for `ai_role`, or `None` when it has no legal move.
    ///
    /// Among equally scored moves the one generated first wins, so move
    /// ordering and pruning never change the answer.
    pub fn find_best_move<B: GameBoard>(
        &mut self,
        board: &B,
        ai_role: Role,
        max_depth: u8,
    ) -> Option<Move> {
        self.nodes_searched = 0;
        self.cutoffs = 0;
        let max_depth = max_depth.max(1);

        let moves = board.legal_moves(ai_role);
        if moves.is_empty() {
            log::debug!("{ai_role} has no legal moves");
            return None;
        }

        if self.config.immediate_win_check {
            if let Some(mv) = Self::immediate_win(board, &moves, ai_role) {
                log::debug!("Immediate win for {ai_role}: {mv}");
                return Some(mv);
            }
        }

        // Keep the generation index for tie-breaking
        let mut candidates: Vec<(usize, Move)> = moves.into_iter().enumerate().collect();
        if self.config.move_ordering {
            order_by_priority(board, &mut candidates, |(_, mv)| mv);
        }

        let mut alpha = -SCORE_INFINITY;
        let mut best: Option<(i32, usize, Move)> = None;

        for (idx, mv) in candidates {
            let Some(score) = self.search_root_move(board, &mv, ai_role, max_depth, alpha) else {
                continue;
            };
            log::debug!("Root move {mv} (#{idx}): score {score}");

            let improves = best.as_ref().map_or(true, |(best_score, best_idx, _)| {
                score > *best_score || (score == *best_score && idx < *best_idx)
            });
            if improves {
                best = Some((score, idx, mv));
            }
            // One below the best keeps ties exact; no cutoff at the root.
            if let Some((best_score, _, _)) = &best {
                alpha = alpha.max(best_score - 1);
            }
        }

        let (score, _, mv) = best?;
        log::debug!(
            "Best move {mv} score {score} depth {max_depth} nodes {} cutoffs {}",
            self.nodes_searched,
            self.cutoffs
        );
        Some(mv)
    }

    /// Minimax value of `mv` played by `ai_role` at the root of a
    /// `max_depth` search, or `None` when the board rejects it.
    pub fn score_move<B: GameBoard>(
        &mut self,
        board: &B,
        mv: &Move,
        ai_role: Role,
        max_depth: u8,
    ) -> Option<i32> {
        self.search_root_move(board, mv, ai_role, max_depth.max(1), -SCORE_INFINITY)
    }

    fn search_root_move<B: GameBoard>(
        &mut self,
        board: &B,
        mv: &Move,
        ai_role: Role,
        max_depth: u8,
        alpha: i32,
    ) -> Option<i32> {
        let mut child = board.clone();
        let outcome = match child.apply(mv, ai_role) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Skipping root move {mv}: {err}");
                return None;
            }
        };

        // The rest of a chain belongs to this ply.
        let score = match outcome {
            ApplyOutcome::TurnPassed => {
                self.minimax(&child, ai_role, max_depth - 1, false, alpha, SCORE_INFINITY)
            }
            ApplyOutcome::ChainContinues => {
                self.minimax(&child, ai_role, max_depth, true, alpha, SCORE_INFINITY)
            }
        };
        Some(score)
    }

    /// First move, in generation order, that wins on the spot.
    fn immediate_win<B: GameBoard>(board: &B, moves: &[Move], ai_role: Role) -> Option<Move> {
        moves
            .iter()
            .find(|mv| {
                let mut child = board.clone();
                child.apply(mv, ai_role).is_ok() && child.winner() == GameStatus::Won(ai_role)
            })
            .cloned()
    }

    fn minimax<B: GameBoard>(
        &mut self,
        board: &B,
        ai_role: Role,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes_searched += 1;

        if board.is_terminal() {
            return Self::offset_by_depth(board.evaluate(ai_role), depth);
        }

        let mover = if maximizing { ai_role } else { ai_role.opposite() };
        if depth == 0 {
            // A win one ply past the horizon still outranks any heuristic.
            if self.config.immediate_win_check && board.has_winning_move(mover) {
                return if maximizing {
                    WIN_SCORE - 1
                } else {
                    -(WIN_SCORE - 1)
                };
            }
            return board.evaluate(ai_role);
        }

        let mut moves = board.legal_moves(mover);
        if moves.is_empty() {
            let depth = i32::from(depth);
            return if maximizing {
                -WIN_SCORE - depth
            } else {
                WIN_SCORE + depth
            };
        }
        if self.config.move_ordering {
            order_moves(board, &mut moves);
        }

        let mut best = if maximizing {
            -SCORE_INFINITY
        } else {
            SCORE_INFINITY
        };

        for mv in &moves {
            let mut child = board.clone();
            let Ok(outcome) = child.apply(mv, mover) else {
                continue;
            };

            // A continued chain is the same turn: same depth, same side.
            let score = if outcome.chain_continues() {
                self.minimax(&child, ai_role, depth, maximizing, alpha, beta)
            } else {
                self.minimax(&child, ai_role, depth - 1, !maximizing, alpha, beta)
            };

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if self.config.alpha_beta && beta <= alpha {
                self.cutoffs += 1;
                break;
            }
        }

        best
    }

    /// Earlier wins and later losses score better.
    const fn offset_by_depth(score: i32, depth: u8) -> i32 {
        let depth = depth as i32;
        if score >= WIN_SCORE {
            score + depth
        } else if score <= -WIN_SCORE {
            score - depth
        } else {
            score
        }
    }
}

impl<B: GameBoard> Searcher<B> for MinimaxEngine {
    fn search(&mut self, board: &B, role: Role) -> Option<(Move, SearchStats)> {
        let start = Instant::now();
        let depth = self.config.max_depth.max(1);
        let mv = self.find_best_move(board, role, depth)?;

        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            cutoffs: self.cutoffs,
            time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        Some((mv, stats))
    }
}
