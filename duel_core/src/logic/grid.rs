use crate::engine::ordering::occupied_neighbours;
use crate::engine::Move;
use crate::logic::board::{
    occupancy_of, parse_rows, ApplyOutcome, Bitboard, BitboardIterator, GameBoard, GameStatus,
    Role, Square, BOARD_SIZE, NUM_SQUARES,
};
use crate::logic::eval_constants::{line_weight, LINE_LENGTH, WIN_SCORE};
use crate::logic::lookup::LineTables;
use crate::logic::rules::{GameKind, MoveError};
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use std::fmt;

const FULL_BOARD: Bitboard = (1 << NUM_SQUARES) - 1;

/// Four in a row on a 6x6 grid. Marks are placed, never moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GridSnapshot", into = "GridSnapshot")]
pub struct GridBoard {
    // Mailbox for O(1) lookup
    grid: [Option<Role>; NUM_SQUARES],
    // Per-role occupancy, kept in sync with `grid`
    occupancy: [Bitboard; 2],
    turn: Role,
}

/// Serialized form of a [`GridBoard`]; the occupancy cache is rebuilt on load.
#[derive(Serialize, Deserialize)]
pub struct GridSnapshot {
    #[serde(with = "BigArray")]
    cells: [Option<Role>; NUM_SQUARES],
    turn: Role,
}

impl From<GridBoard> for GridSnapshot {
    fn from(board: GridBoard) -> Self {
        Self {
            cells: board.grid,
            turn: board.turn,
        }
    }
}

impl From<GridSnapshot> for GridBoard {
    fn from(snapshot: GridSnapshot) -> Self {
        Self::from_grid(snapshot.cells, snapshot.turn)
    }
}

impl Default for GridBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl GridBoard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            grid: [None; NUM_SQUARES],
            occupancy: [0; 2],
            turn: Role::White,
        }
    }

    fn from_grid(grid: [Option<Role>; NUM_SQUARES], turn: Role) -> Self {
        Self {
            occupancy: occupancy_of(&grid),
            grid,
            turn,
        }
    }

    /// Builds a position from six text rows (`X`, `O`, `.`).
    pub fn from_rows(rows: &[&str], turn: Role) -> Result<Self, MoveError> {
        Ok(Self::from_grid(parse_rows(rows)?, turn))
    }

    pub fn set_piece(&mut self, sq: Square, piece: Option<Role>) {
        let Some(slot) = self.grid.get_mut(sq.index()) else {
            return;
        };
        if let Some(old) = slot.take() {
            self.occupancy[old.index()] &= !sq.bit();
        }
        if let Some(role) = piece {
            *slot = Some(role);
            self.occupancy[role.index()] |= sq.bit();
        }
    }

    pub fn set_turn(&mut self, turn: Role) {
        self.turn = turn;
    }

    pub const fn occupancy(&self, role: Role) -> Bitboard {
        self.occupancy[role.index()]
    }

    pub const fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    pub fn has_line(&self, role: Role) -> bool {
        let own = self.occupancy(role);
        LineTables::get()
            .windows
            .iter()
            .any(|&window| own & window == window)
    }

    /// Sum of `10^k` over all windows holding `k > 0` of `role`'s marks and
    /// none of the opponent's.
    pub fn open_line_potential(&self, role: Role) -> i32 {
        let own = self.occupancy(role);
        let opponent = self.occupancy(role.opposite());
        LineTables::get()
            .windows
            .iter()
            .filter(|&&window| opponent & window == 0)
            .map(|&window| line_weight((own & window).count_ones()))
            .sum()
    }
}

impl GameBoard for GridBoard {
    fn kind(&self) -> GameKind {
        GameKind::FourInARow
    }

    fn turn(&self) -> Role {
        self.turn
    }

    fn piece_at(&self, sq: Square) -> Option<Role> {
        self.grid.get(sq.index()).copied().flatten()
    }

    // Any empty cell is playable for either role.
    fn legal_moves(&self, _role: Role) -> Vec<Move> {
        BitboardIterator::new(!self.occupied() & FULL_BOARD)
            .map(Move::Place)
            .collect()
    }

    fn apply(&mut self, mv: &Move, role: Role) -> Result<ApplyOutcome, MoveError> {
        let Move::Place(sq) = mv else {
            return Err(MoveError::UnsupportedMove);
        };
        if !sq.is_on_board() {
            return Err(MoveError::OutOfBounds);
        }
        if self.piece_at(*sq).is_some() {
            return Err(MoveError::TargetOccupied);
        }

        self.set_piece(*sq, Some(role));
        self.turn = role.opposite();
        Ok(ApplyOutcome::TurnPassed)
    }

    fn winner(&self) -> GameStatus {
        for role in Role::ALL {
            if self.has_line(role) {
                return GameStatus::Won(role);
            }
        }
        if self.occupied() == FULL_BOARD {
            return GameStatus::Draw;
        }
        GameStatus::Playing
    }

    fn evaluate(&self, perspective: Role) -> i32 {
        match self.winner() {
            GameStatus::Won(role) if role == perspective => WIN_SCORE,
            GameStatus::Won(_) => -WIN_SCORE,
            GameStatus::Draw => 0,
            GameStatus::Playing => {
                self.open_line_potential(perspective)
                    - self.open_line_potential(perspective.opposite())
            }
        }
    }

    // Three own marks in an otherwise empty window.
    #[allow(clippy::cast_possible_truncation)]
    fn has_winning_move(&self, role: Role) -> bool {
        let own = self.occupancy(role);
        let opponent = self.occupancy(role.opposite());
        LineTables::get().windows.iter().any(|&window| {
            opponent & window == 0 && (own & window).count_ones() + 1 == LINE_LENGTH as u32
        })
    }

    fn move_priority(&self, mv: &Move) -> i32 {
        match mv {
            Move::Place(sq) => occupied_neighbours(self.occupied(), *sq),
            _ => 0,
        }
    }
}

impl fmt::Display for GridBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.grid.chunks(BOARD_SIZE).enumerate() {
            let line: Vec<&str> = row
                .iter()
                .map(|cell| match cell {
                    Some(Role::White) => "X",
                    Some(Role::Black) => "O",
                    None => " ",
                })
                .collect();
            writeln!(f, "{}", line.join("|"))?;
            if r + 1 < BOARD_SIZE {
                writeln!(f, "{}", "-".repeat(BOARD_SIZE * 2 - 1))?;
            }
        }
        Ok(())
    }
}
