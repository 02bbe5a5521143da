pub mod board;
pub mod dame;
pub mod eval_constants;
pub mod game;
pub mod grid;
pub mod lookup;
pub mod rules;
pub mod score;
