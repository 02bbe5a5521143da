use crate::engine::Move;
use crate::logic::rules::{GameKind, MoveError};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARD_SIZE: usize = 6;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// One bit per square, bit index = `row * BOARD_SIZE + col`.
pub type Bitboard = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    White,
    Black,
}

impl Role {
    pub const ALL: [Self; 2] = [Self::White, Self::Black];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    /// Returns `None` when the coordinate is off the board.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Self> {
        Self::new(idx / BOARD_SIZE, idx % BOARD_SIZE)
    }

    pub const fn row(self) -> usize {
        self.row as usize
    }

    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// Squares built through the public fields may lie outside the board.
    pub const fn is_on_board(self) -> bool {
        self.row() < BOARD_SIZE && self.col() < BOARD_SIZE
    }

    pub const fn index(self) -> usize {
        self.row() * BOARD_SIZE + self.col()
    }

    pub const fn bit(self) -> Bitboard {
        1 << self.index()
    }

    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Self> {
        let row = i32::from(self.row) + d_row;
        let col = i32::from(self.col) + d_col;
        if row < 0 || col < 0 {
            return None;
        }
        Self::new(row as usize, col as usize)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won(Role),
    Draw,
}

impl GameStatus {
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// What a successful `apply` did to the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    TurnPassed,
    /// The moved piece must capture again; the same role keeps the move.
    ChainContinues,
}

impl ApplyOutcome {
    pub const fn chain_continues(self) -> bool {
        matches!(self, Self::ChainContinues)
    }
}

/// Capability shared by every game the engine can play.
///
/// Implementations are plain values: `clone` must produce a fully independent
/// copy, since the search explores hypothetical futures on clones only.
pub trait GameBoard: Clone {
    fn kind(&self) -> GameKind;

    fn size(&self) -> usize {
        BOARD_SIZE
    }

    /// Role expected to move next.
    fn turn(&self) -> Role;

    fn piece_at(&self, sq: Square) -> Option<Role>;

    fn legal_moves(&self, role: Role) -> Vec<Move>;

    /// Legal moves of the piece standing on `sq`.
    fn moves_from(&self, sq: Square, role: Role) -> Vec<Move> {
        self.legal_moves(role)
            .into_iter()
            .filter(|mv| mv.from() == Some(sq))
            .collect()
    }

    /// Applies `mv` for `role`. On error the board is left untouched.
    fn apply(&mut self, mv: &Move, role: Role) -> Result<ApplyOutcome, MoveError>;

    fn winner(&self) -> GameStatus;

    fn is_terminal(&self) -> bool {
        self.winner().is_over()
    }

    /// Whether `role` could win with a single move from here.
    fn has_winning_move(&self, role: Role) -> bool {
        self.legal_moves(role).iter().any(|mv| {
            let mut next = self.clone();
            next.apply(mv, role).is_ok() && next.winner() == GameStatus::Won(role)
        })
    }

    /// Score from `perspective`'s point of view; `±WIN_SCORE` at decided positions.
    fn evaluate(&self, perspective: Role) -> i32;

    /// Static ordering key, higher is searched first.
    fn move_priority(&self, _mv: &Move) -> i32 {
        0
    }
}

pub struct BitboardIterator {
    bb: Bitboard,
}

impl BitboardIterator {
    pub const fn new(bb: Bitboard) -> Self {
        Self { bb }
    }
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bb == 0 {
            None
        } else {
            let lsb = self.bb.trailing_zeros() as usize;
            self.bb &= self.bb - 1;
            Square::from_index(lsb)
        }
    }
}

/// Parses six rows of text into a mailbox. `.` or space is empty,
/// `X`/`W` is White and `O`/`B` is Black.
pub fn parse_rows(rows: &[&str]) -> Result<[Option<Role>; NUM_SQUARES], MoveError> {
    if rows.len() != BOARD_SIZE {
        return Err(MoveError::MalformedBoard);
    }
    let mut grid = [None; NUM_SQUARES];
    for (r, line) in rows.iter().enumerate() {
        let cells: Vec<char> = line.chars().collect();
        if cells.len() != BOARD_SIZE {
            return Err(MoveError::MalformedBoard);
        }
        for (c, ch) in cells.into_iter().enumerate() {
            let cell = match ch {
                '.' | ' ' => None,
                'X' | 'W' => Some(Role::White),
                'O' | 'B' => Some(Role::Black),
                _ => return Err(MoveError::MalformedBoard),
            };
            if let Some(slot) = grid.get_mut(r * BOARD_SIZE + c) {
                *slot = cell;
            }
        }
    }
    Ok(grid)
}

/// Builds the per-role occupancy cache from a mailbox.
pub fn occupancy_of(grid: &[Option<Role>; NUM_SQUARES]) -> [Bitboard; 2] {
    let mut occupancy = [0; 2];
    for (idx, cell) in grid.iter().enumerate() {
        if let Some(role) = cell {
            occupancy[role.index()] |= 1 << idx;
        }
    }
    occupancy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(5, 5).is_some());
        assert!(Square::new(6, 0).is_none());
        assert!(Square::new(0, 6).is_none());

        let sq = Square::new(2, 3).unwrap();
        assert_eq!(sq.index(), 15);
        assert_eq!(Square::from_index(15), Some(sq));
        assert_eq!(sq.offset(-2, -3), Square::new(0, 0));
        assert_eq!(sq.offset(-3, 0), None);
        assert_eq!(sq.offset(0, 3), None);
    }

    #[test]
    fn test_bitboard_iterator_is_row_major() {
        let bb = Square::new(4, 1).unwrap().bit()
            | Square::new(0, 5).unwrap().bit()
            | Square::new(0, 2).unwrap().bit();
        let squares: Vec<Square> = BitboardIterator::new(bb).collect();
        assert_eq!(
            squares,
            vec![
                Square::new(0, 2).unwrap(),
                Square::new(0, 5).unwrap(),
                Square::new(4, 1).unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_rows() {
        let grid = parse_rows(&["X.....", "......", "..O...", "......", "......", ".....W"]).unwrap();
        assert_eq!(grid[0], Some(Role::White));
        assert_eq!(grid[2 * BOARD_SIZE + 2], Some(Role::Black));
        assert_eq!(grid[NUM_SQUARES - 1], Some(Role::White));

        let occupancy = occupancy_of(&grid);
        assert_eq!(occupancy[Role::White.index()].count_ones(), 2);
        assert_eq!(occupancy[Role::Black.index()].count_ones(), 1);

        assert_eq!(parse_rows(&["......"]), Err(MoveError::MalformedBoard));
        assert!(parse_rows(&["X....?", "......", "......", "......", "......", "......"]).is_err());
    }
}
