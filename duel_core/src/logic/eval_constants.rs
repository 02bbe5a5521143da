/// Score of a decided game. Dominates every heuristic score by more than 10x.
pub const WIN_SCORE: i32 = 1_000_000;

/// Marks in a row needed to win the grid game.
pub const LINE_LENGTH: usize = 4;

// Grid game: an open window holding k own marks is worth 10^k.
pub const LINE_WEIGHTS: [i32; LINE_LENGTH] = [0, 10, 100, 1000];

// Dame
pub const DAME_PIECE_WEIGHT: i32 = 10;
pub const DAME_ADVANCE_WEIGHT: i32 = 1;

pub const fn line_weight(own: u32) -> i32 {
    match own {
        1 => LINE_WEIGHTS[1],
        2 => LINE_WEIGHTS[2],
        3 => LINE_WEIGHTS[3],
        _ => LINE_WEIGHTS[0],
    }
}
