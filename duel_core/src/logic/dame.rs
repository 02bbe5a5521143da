use crate::engine::Move;
use crate::logic::board::{
    occupancy_of, parse_rows, ApplyOutcome, Bitboard, BitboardIterator, GameBoard, GameStatus,
    Role, Square, BOARD_SIZE, NUM_SQUARES,
};
use crate::logic::eval_constants::{DAME_ADVANCE_WEIGHT, DAME_PIECE_WEIGHT, WIN_SCORE};
use crate::logic::lookup::LineTables;
use crate::logic::rules::{GameKind, MoveError};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;

const SIDE_STEPS: [i32; 2] = [-1, 1];

/// Simplified checkers on the dark squares of a 6x6 board: no kings,
/// forward-only moves and captures, mandatory capture, chain captures.
///
/// White starts on rows 0-1 and runs towards row 5, Black the other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DameSnapshot", into = "DameSnapshot")]
pub struct DameBoard {
    grid: [Option<Role>; NUM_SQUARES],
    // Piece sets per role, a cache of `grid`
    pieces: [Bitboard; 2],
    turn: Role,
    // Piece that must keep capturing before the turn can pass
    chain_piece: Option<Square>,
}

/// Serialized form of a [`DameBoard`]; piece sets are rebuilt on load.
#[derive(Serialize, Deserialize)]
pub struct DameSnapshot {
    #[serde(with = "BigArray")]
    cells: [Option<Role>; NUM_SQUARES],
    turn: Role,
    chain_piece: Option<Square>,
}

impl From<DameBoard> for DameSnapshot {
    fn from(board: DameBoard) -> Self {
        Self {
            cells: board.grid,
            turn: board.turn,
            chain_piece: board.chain_piece,
        }
    }
}

impl From<DameSnapshot> for DameBoard {
    fn from(snapshot: DameSnapshot) -> Self {
        let mut board = Self::from_grid(snapshot.cells, snapshot.turn);
        // A pinned piece must belong to the side to move and still have a capture.
        board.chain_piece = snapshot.chain_piece.filter(|&sq| {
            board.piece_at(sq) == Some(board.turn) && board.has_capture_from(sq, board.turn)
        });
        board
    }
}

impl Default for DameBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DameBoard {
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self::empty(Role::White);
        board.setup_initial_position();
        board
    }

    #[must_use]
    pub const fn empty(turn: Role) -> Self {
        Self {
            grid: [None; NUM_SQUARES],
            pieces: [0; 2],
            turn,
            chain_piece: None,
        }
    }

    fn from_grid(grid: [Option<Role>; NUM_SQUARES], turn: Role) -> Self {
        Self {
            pieces: occupancy_of(&grid),
            grid,
            turn,
            chain_piece: None,
        }
    }

    /// Builds a position from six text rows (`W`, `B`, `.`).
    pub fn from_rows(rows: &[&str], turn: Role) -> Result<Self, MoveError> {
        Ok(Self::from_grid(parse_rows(rows)?, turn))
    }

    fn setup_initial_position(&mut self) {
        // White on the two top rows, Black on the two bottom rows, dark squares only
        for row in (0..2).chain(BOARD_SIZE - 2..BOARD_SIZE) {
            let role = if row < 2 { Role::White } else { Role::Black };
            for col in (0..BOARD_SIZE).filter(|col| (row + col) % 2 == 0) {
                if let Some(sq) = Square::new(row, col) {
                    self.set_piece(sq, Some(role));
                }
            }
        }
    }

    pub fn set_piece(&mut self, sq: Square, piece: Option<Role>) {
        let Some(slot) = self.grid.get_mut(sq.index()) else {
            return;
        };
        if let Some(old) = slot.take() {
            self.pieces[old.index()] &= !sq.bit();
        }
        if let Some(role) = piece {
            *slot = Some(role);
            self.pieces[role.index()] |= sq.bit();
        }
    }

    pub fn set_turn(&mut self, turn: Role) {
        self.turn = turn;
        self.chain_piece = None;
    }

    pub const fn pieces(&self, role: Role) -> Bitboard {
        self.pieces[role.index()]
    }

    pub fn piece_count(&self, role: Role) -> u32 {
        self.pieces(role).count_ones()
    }

    /// Square of the piece that is in the middle of a capture chain.
    pub const fn chain_piece(&self) -> Option<Square> {
        self.chain_piece
    }

    /// Row delta of a forward step.
    pub const fn forward(role: Role) -> i32 {
        match role {
            Role::White => 1,
            Role::Black => -1,
        }
    }

    /// Row on which `role` wins by arriving.
    pub const fn target_rank(role: Role) -> usize {
        match role {
            Role::White => BOARD_SIZE - 1,
            Role::Black => 0,
        }
    }

    fn push_captures_from(&self, from: Square, role: Role, moves: &mut Vec<Move>) {
        let dir = Self::forward(role);
        for dc in SIDE_STEPS {
            let (Some(over), Some(to)) = (from.offset(dir, dc), from.offset(2 * dir, 2 * dc)) else {
                continue;
            };
            if self.piece_at(over) == Some(role.opposite()) && self.piece_at(to).is_none() {
                moves.push(Move::Capture {
                    from,
                    to,
                    removed: vec![over],
                });
            }
        }
    }

    fn push_steps_from(&self, from: Square, role: Role, moves: &mut Vec<Move>) {
        let dir = Self::forward(role);
        for dc in SIDE_STEPS {
            if let Some(to) = from.offset(dir, dc) {
                if self.piece_at(to).is_none() {
                    moves.push(Move::Simple { from, to });
                }
            }
        }
    }

    fn has_capture_from(&self, from: Square, role: Role) -> bool {
        let mut moves = Vec::new();
        self.push_captures_from(from, role, &mut moves);
        !moves.is_empty()
    }

    fn has_any_move(&self, role: Role) -> bool {
        let mut moves = Vec::new();
        for from in BitboardIterator::new(self.pieces(role)) {
            self.push_captures_from(from, role, &mut moves);
            self.push_steps_from(from, role, &mut moves);
            if !moves.is_empty() {
                return true;
            }
        }
        false
    }

    fn validate(&self, mv: &Move, role: Role) -> Result<(), MoveError> {
        let (from, to) = match mv {
            Move::Simple { from, to } | Move::Capture { from, to, .. } => (*from, *to),
            Move::Place(_) => return Err(MoveError::UnsupportedMove),
        };
        if !from.is_on_board() || !to.is_on_board() {
            return Err(MoveError::OutOfBounds);
        }
        match self.piece_at(from) {
            None => return Err(MoveError::NoPieceAtSource),
            Some(owner) if owner != role => return Err(MoveError::NotOwnPiece),
            Some(_) => {}
        }
        if self.turn == role {
            if let Some(chain) = self.chain_piece {
                if from != chain || !mv.is_capture() {
                    return Err(MoveError::ChainPending);
                }
            }
        }
        if self.piece_at(to).is_some() {
            return Err(MoveError::TargetOccupied);
        }

        let dir = Self::forward(role);
        let d_row = i32::from(to.row) - i32::from(from.row);
        let d_col = i32::from(to.col) - i32::from(from.col);
        match mv {
            Move::Simple { .. } => {
                if d_row != dir || d_col.abs() != 1 {
                    return Err(MoveError::InvalidMovePattern);
                }
            }
            Move::Capture { removed, .. } => {
                if d_row != 2 * dir || d_col.abs() != 2 {
                    return Err(MoveError::InvalidMovePattern);
                }
                let over = from.offset(dir, d_col / 2);
                let [captured] = removed.as_slice() else {
                    return Err(MoveError::MalformedCapture);
                };
                if over != Some(*captured) || self.piece_at(*captured) != Some(role.opposite()) {
                    return Err(MoveError::MalformedCapture);
                }
            }
            Move::Place(_) => return Err(MoveError::UnsupportedMove),
        }
        Ok(())
    }
}

impl GameBoard for DameBoard {
    fn kind(&self) -> GameKind {
        GameKind::Dame
    }

    fn turn(&self) -> Role {
        self.turn
    }

    fn piece_at(&self, sq: Square) -> Option<Role> {
        self.grid.get(sq.index()).copied().flatten()
    }

    fn legal_moves(&self, role: Role) -> Vec<Move> {
        let mut moves = Vec::new();

        if role == self.turn {
            if let Some(chain) = self.chain_piece {
                self.push_captures_from(chain, role, &mut moves);
                return moves;
            }
        }

        for from in BitboardIterator::new(self.pieces(role)) {
            self.push_captures_from(from, role, &mut moves);
        }
        // Mandatory capture
        if !moves.is_empty() {
            return moves;
        }

        for from in BitboardIterator::new(self.pieces(role)) {
            self.push_steps_from(from, role, &mut moves);
        }
        moves
    }

    fn apply(&mut self, mv: &Move, role: Role) -> Result<ApplyOutcome, MoveError> {
        self.validate(mv, role)?;

        let from = mv.from().ok_or(MoveError::UnsupportedMove)?;
        let to = mv.to();
        self.set_piece(from, None);
        for &captured in mv.removed() {
            self.set_piece(captured, None);
        }
        self.set_piece(to, Some(role));

        if mv.is_capture() && self.has_capture_from(to, role) {
            self.turn = role;
            self.chain_piece = Some(to);
            return Ok(ApplyOutcome::ChainContinues);
        }

        self.turn = role.opposite();
        self.chain_piece = None;
        Ok(ApplyOutcome::TurnPassed)
    }

    fn winner(&self) -> GameStatus {
        let tables = LineTables::get();
        for role in Role::ALL {
            if self.pieces(role) & tables.row_mask(Self::target_rank(role)) != 0 {
                return GameStatus::Won(role);
            }
        }
        for role in Role::ALL {
            if self.pieces(role) == 0 {
                return GameStatus::Won(role.opposite());
            }
        }
        if !self.has_any_move(self.turn) {
            return GameStatus::Won(self.turn.opposite());
        }
        GameStatus::Playing
    }

    fn evaluate(&self, perspective: Role) -> i32 {
        match self.winner() {
            GameStatus::Won(role) if role == perspective => return WIN_SCORE,
            GameStatus::Won(_) => return -WIN_SCORE,
            GameStatus::Draw | GameStatus::Playing => {}
        }

        // Advancement: a piece scores one point per row travelled plus one.
        let advancement = |role: Role| -> i32 {
            BitboardIterator::new(self.pieces(role))
                .map(|sq| match role {
                    Role::White => sq.row() + 1,
                    Role::Black => BOARD_SIZE - sq.row(),
                })
                .map(|points| i32::try_from(points).unwrap_or(0))
                .sum()
        };
        let white_count = i32::try_from(self.piece_count(Role::White)).unwrap_or(0);
        let black_count = i32::try_from(self.piece_count(Role::Black)).unwrap_or(0);

        let total = (white_count - black_count) * DAME_PIECE_WEIGHT
            + (advancement(Role::White) - advancement(Role::Black)) * DAME_ADVANCE_WEIGHT;

        match perspective {
            Role::White => total,
            Role::Black => -total,
        }
    }
}

impl fmt::Display for DameBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = (0..BOARD_SIZE).map(|c| c.to_string()).collect();
        writeln!(f, "  {}", header.join(" "))?;
        for (r, row) in self.grid.chunks(BOARD_SIZE).enumerate() {
            let cells: Vec<&str> = row
                .iter()
                .map(|cell| match cell {
                    Some(Role::White) => "W",
                    Some(Role::Black) => "B",
                    None => " ",
                })
                .collect();
            writeln!(f, "{r} {}", cells.join("|"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn test_initial_setup() {
        let board = DameBoard::new();
        assert_eq!(board.piece_count(Role::White), 6);
        assert_eq!(board.piece_count(Role::Black), 6);
        assert_eq!(board.piece_at(sq(0, 0)), Some(Role::White));
        assert_eq!(board.piece_at(sq(1, 1)), Some(Role::White));
        assert_eq!(board.piece_at(sq(1, 0)), None);
        assert_eq!(board.piece_at(sq(4, 0)), Some(Role::Black));
        assert_eq!(board.piece_at(sq(5, 5)), Some(Role::Black));
        assert_eq!(board.turn(), Role::White);
        assert_eq!(board.winner(), GameStatus::Playing);
    }

    #[test]
    fn test_opening_moves_are_forward_steps() {
        let board = DameBoard::new();
        let moves = board.legal_moves(Role::White);
        // (1,1), (1,3) have two steps each, (1,5) only one.
        assert_eq!(moves.len(), 5);
        assert!(moves.iter().all(|mv| matches!(mv, Move::Simple { from, to } if to.row() == from.row() + 1)));

        let black = board.legal_moves(Role::Black);
        assert_eq!(black.len(), 5);
        assert!(black.iter().all(|mv| mv.to().row() == 3));
    }

    #[test]
    fn test_single_capture() {
        let mut board = DameBoard::empty(Role::White);
        board.set_piece(sq(2, 2), Some(Role::White));
        board.set_piece(sq(3, 3), Some(Role::Black));

        let moves = board.legal_moves(Role::White);
        assert_eq!(
            moves,
            vec![Move::Capture {
                from: sq(2, 2),
                to: sq(4, 4),
                removed: vec![sq(3, 3)],
            }]
        );

        let outcome = board.apply(&moves[0], Role::White).unwrap();
        assert_eq!(outcome, ApplyOutcome::TurnPassed);
        assert_eq!(board.piece_at(sq(3, 3)), None);
        assert_eq!(board.piece_at(sq(4, 4)), Some(Role::White));
        assert_eq!(board.turn(), Role::Black);
        assert_eq!(board.winner(), GameStatus::Won(Role::White));
    }

    #[test]
    fn test_captures_are_mandatory() {
        let board = DameBoard::from_rows(
            &["......", "W.....", "......", "..W...", "...B..", "......"],
            Role::White,
        )
        .unwrap();
        let moves = board.legal_moves(Role::White);
        assert_eq!(moves.len(), 1);
        assert!(moves.iter().all(Move::is_capture));
    }

    #[test]
    fn test_backward_capture_is_not_allowed() {
        // Black piece behind the white one cannot be taken.
        let board = DameBoard::from_rows(
            &["......", "......", ".B....", "..W...", "......", "......"],
            Role::White,
        )
        .unwrap();
        let moves = board.legal_moves(Role::White);
        assert!(moves.iter().all(|mv| !mv.is_capture()));
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_chain_capture_keeps_turn() {
        let mut board = DameBoard::from_rows(
            &["W.....", ".B....", "......", "...B..", "......", "......"],
            Role::White,
        )
        .unwrap();
        let first = board.legal_moves(Role::White);
        assert_eq!(first.len(), 1);

        let outcome = board.apply(&first[0], Role::White).unwrap();
        assert!(outcome.chain_continues());
        assert_eq!(board.turn(), Role::White);
        assert_eq!(board.chain_piece(), Some(sq(2, 2)));

        let second = board.legal_moves(Role::White);
        assert_eq!(
            second,
            vec![Move::Capture {
                from: sq(2, 2),
                to: sq(4, 4),
                removed: vec![sq(3, 3)],
            }]
        );
        let outcome = board.apply(&second[0], Role::White).unwrap();
        assert_eq!(outcome, ApplyOutcome::TurnPassed);
        assert_eq!(board.turn(), Role::Black);
        assert_eq!(board.chain_piece(), None);
        assert_eq!(board.winner(), GameStatus::Won(Role::White));
    }

    #[test]
    fn test_chain_restricts_other_pieces() {
        let mut board = DameBoard::from_rows(
            &["W.....", ".B...W", "......", "...B..", "......", "......"],
            Role::White,
        )
        .unwrap();
        let capture = Move::Capture {
            from: sq(0, 0),
            to: sq(2, 2),
            removed: vec![sq(1, 1)],
        };
        assert!(board.apply(&capture, Role::White).unwrap().chain_continues());

        let before = board.clone();
        let other = Move::Simple {
            from: sq(1, 5),
            to: sq(2, 4),
        };
        assert_eq!(board.apply(&other, Role::White), Err(MoveError::ChainPending));
        let step = Move::Simple {
            from: sq(2, 2),
            to: sq(3, 1),
        };
        assert_eq!(board.apply(&step, Role::White), Err(MoveError::ChainPending));
        assert_eq!(board, before);
    }

    #[test]
    fn test_apply_rejects_invalid_moves_without_mutation() {
        let mut board = DameBoard::new();
        let before = board.clone();

        let cases = [
            (
                Move::Simple {
                    from: sq(2, 2),
                    to: sq(3, 3),
                },
                MoveError::NoPieceAtSource,
            ),
            (
                Move::Simple {
                    from: sq(4, 0),
                    to: sq(3, 1),
                },
                MoveError::NotOwnPiece,
            ),
            (
                Move::Simple {
                    from: sq(0, 0),
                    to: sq(1, 1),
                },
                MoveError::TargetOccupied,
            ),
            (
                Move::Simple {
                    from: sq(1, 1),
                    to: sq(3, 3),
                },
                MoveError::InvalidMovePattern,
            ),
            (
                Move::Capture {
                    from: sq(1, 1),
                    to: sq(3, 3),
                    removed: vec![sq(2, 2)],
                },
                MoveError::MalformedCapture,
            ),
            (Move::Place(sq(2, 2)), MoveError::UnsupportedMove),
            (
                Move::Simple {
                    from: sq(1, 1),
                    to: Square { row: 9, col: 9 },
                },
                MoveError::OutOfBounds,
            ),
        ];
        for (mv, expected) in cases {
            assert_eq!(board.apply(&mv, Role::White), Err(expected), "{mv}");
            assert_eq!(board, before);
        }
    }

    #[test]
    fn test_capture_with_wrong_removed_list() {
        let mut board = DameBoard::from_rows(
            &["......", "......", "..W...", "...B..", "......", "......"],
            Role::White,
        )
        .unwrap();
        let no_removed = Move::Capture {
            from: sq(2, 2),
            to: sq(4, 4),
            removed: vec![],
        };
        let extra = Move::Capture {
            from: sq(2, 2),
            to: sq(4, 4),
            removed: vec![sq(3, 3), sq(3, 3)],
        };
        assert_eq!(board.apply(&no_removed, Role::White), Err(MoveError::MalformedCapture));
        assert_eq!(board.apply(&extra, Role::White), Err(MoveError::MalformedCapture));
        assert_eq!(board.piece_count(Role::Black), 1);
    }

    #[test]
    fn test_win_conditions() {
        let no_black = DameBoard::from_rows(
            &["W.....", "......", "......", "......", "......", "......"],
            Role::Black,
        )
        .unwrap();
        assert_eq!(no_black.winner(), GameStatus::Won(Role::White));

        let reached = DameBoard::from_rows(
            &["B.....", "......", "..W...", "......", "......", "......"],
            Role::White,
        )
        .unwrap();
        assert_eq!(reached.winner(), GameStatus::Won(Role::Black));

        // Black to move, its only piece is blocked in the corner.
        let blocked = DameBoard::from_rows(
            &["......", "......", "......", "..W...", ".W....", "B....."],
            Role::Black,
        )
        .unwrap();
        assert!(blocked.legal_moves(Role::Black).is_empty());
        assert_eq!(blocked.winner(), GameStatus::Won(Role::White));
        assert!(blocked.is_terminal());
    }

    #[test]
    fn test_evaluate_counts_material_and_advancement() {
        let board = DameBoard::from_rows(
            &["......", "..W...", "......", "......", "B...B.", "......"],
            Role::White,
        )
        .unwrap();
        // White: 1 piece on row 1 -> 2 points. Black: 2 pieces on row 4 -> 2 + 2.
        let expected = (1 - 2) * DAME_PIECE_WEIGHT + (2 - 4) * DAME_ADVANCE_WEIGHT;
        assert_eq!(board.evaluate(Role::White), expected);
        assert_eq!(board.evaluate(Role::Black), -expected);
        assert_eq!(DameBoard::new().evaluate(Role::White), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = DameBoard::new();
        let mut copy = original.clone();
        let mv = copy.legal_moves(Role::White).remove(0);
        copy.apply(&mv, Role::White).unwrap();

        assert_ne!(copy, original);
        assert_eq!(original, DameBoard::new());
        assert_eq!(original.pieces(Role::White), DameBoard::new().pieces(Role::White));
    }

    #[test]
    fn test_snapshot_keeps_pending_chain() {
        let mut board = DameBoard::from_rows(
            &["W.....", ".B....", "......", "...B..", "......", "......"],
            Role::White,
        )
        .unwrap();
        let outcome = board
            .apply(
                &Move::Capture {
                    from: sq(0, 0),
                    to: sq(2, 2),
                    removed: vec![sq(1, 1)],
                },
                Role::White,
            )
            .unwrap();
        assert_eq!(outcome, ApplyOutcome::ChainContinues);

        let json = serde_json::to_string(&board).unwrap();
        let restored: DameBoard = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, board);
        assert_eq!(restored.chain_piece(), Some(sq(2, 2)));
        assert_eq!(restored.legal_moves(Role::White).len(), 1);
    }

    #[test]
    fn test_snapshot_drops_stale_chain_piece() {
        let cells = DameBoard::new().grid;
        let restore = |chain_piece: Square| {
            DameBoard::from(DameSnapshot {
                cells,
                turn: Role::White,
                chain_piece: Some(chain_piece),
            })
        };

        // Empty square, opponent piece, own piece without a capture.
        for stale in [sq(3, 3), sq(5, 1), sq(0, 2)] {
            let board = restore(stale);
            assert_eq!(board.chain_piece(), None, "{stale}");
            assert_eq!(board, DameBoard::new());
            assert_eq!(board.legal_moves(Role::White).len(), 5);
        }
    }

    #[test]
    fn test_display() {
        let text = DameBoard::new().to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("  0 1 2 3 4 5"));
        assert_eq!(lines.next(), Some("0 W| |W| |W| "));
        assert_eq!(lines.nth(4), Some("5  |B| |B| |B"));
    }
}
