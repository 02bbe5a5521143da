use crate::logic::board::{Bitboard, Square, BOARD_SIZE, NUM_SQUARES};
use crate::logic::eval_constants::LINE_LENGTH;
use std::sync::OnceLock;

const LINE_DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Precomputed square masks shared by both games.
pub struct LineTables {
    /// Every window of `LINE_LENGTH` squares along a row, column or diagonal.
    pub windows: Vec<Bitboard>,
    /// 8-neighbourhood of each square.
    pub neighbours: [Bitboard; NUM_SQUARES],
    pub rows: [Bitboard; BOARD_SIZE],
}

impl LineTables {
    fn new() -> Self {
        let mut windows = Vec::new();
        let mut neighbours = [0; NUM_SQUARES];
        let mut rows = [0; BOARD_SIZE];

        for idx in 0..NUM_SQUARES {
            let Some(sq) = Square::from_index(idx) else {
                continue;
            };

            for &(dr, dc) in &LINE_DIRECTIONS {
                if let Some(mask) = window_from(sq, dr, dc) {
                    windows.push(mask);
                }
            }

            if let Some(slot) = neighbours.get_mut(idx) {
                *slot = NEIGHBOUR_OFFSETS
                    .iter()
                    .filter_map(|&(dr, dc)| sq.offset(dr, dc))
                    .fold(0, |acc, n| acc | n.bit());
            }

            if let Some(row) = rows.get_mut(sq.row()) {
                *row |= sq.bit();
            }
        }

        Self {
            windows,
            neighbours,
            rows,
        }
    }

    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<LineTables> = OnceLock::new();
        INSTANCE.get_or_init(LineTables::new)
    }

    pub fn neighbours_of(&self, sq: Square) -> Bitboard {
        self.neighbours.get(sq.index()).copied().unwrap_or(0)
    }

    pub fn row_mask(&self, row: usize) -> Bitboard {
        self.rows.get(row).copied().unwrap_or(0)
    }
}

fn window_from(start: Square, dr: i32, dc: i32) -> Option<Bitboard> {
    let mut mask = 0;
    for step in 0..LINE_LENGTH {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let step = step as i32;
        mask |= start.offset(dr * step, dc * step)?.bit();
    }
    Some(mask)
}
