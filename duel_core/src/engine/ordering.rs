use crate::engine::Move;
use crate::logic::board::{Bitboard, GameBoard, Square};
use crate::logic::lookup::LineTables;
use std::cmp::Reverse;

/// Number of occupied squares in the 8-neighbourhood of `sq`.
#[allow(clippy::cast_possible_wrap)]
pub fn occupied_neighbours(occupied: Bitboard, sq: Square) -> i32 {
    (LineTables::get().neighbours_of(sq) & occupied).count_ones() as i32
}

/// Stable sort by the board's static priority, highest first.
/// Boards without a heuristic report 0 everywhere, leaving the order intact.
pub fn order_moves<B: GameBoard>(board: &B, moves: &mut [Move]) {
    order_by_priority(board, moves, |mv| mv);
}

/// Same as [`order_moves`] for items that carry a move alongside other data.
pub fn order_by_priority<B, T, F>(board: &B, items: &mut [T], move_of: F)
where
    B: GameBoard,
    F: Fn(&T) -> &Move,
{
    items.sort_by_key(|item| Reverse(board.move_priority(move_of(item))));
}
