use crate::logic::board::{GameBoard, Role, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod ordering;
pub mod search;


/// A move in either game. Only meaningful for the board that generated it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Grid game: drop a mark on an empty cell.
    Place(Square),
    Simple {
        from: Square,
        to: Square,
    },
    Capture {
        from: Square,
        to: Square,
        removed: Vec<Square>,
    },
}

impl Move {
    pub const fn from(&self) -> Option<Square> {
        match self {
            Self::Place(_) => None,
            Self::Simple { from, .. } | Self::Capture { from, .. } => Some(*from),
        }
    }

    pub const fn to(&self) -> Square {
        match self {
            Self::Place(to) | Self::Simple { to, .. } | Self::Capture { to, .. } => *to,
        }
    }

    pub const fn is_capture(&self) -> bool {
        matches!(self, Self::Capture { .. })
    }

    pub fn removed(&self) -> &[Square] {
        match self {
            Self::Capture { removed, .. } => removed,
            _ => &[],
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place(sq) => write!(f, "{sq}"),
            Self::Simple { from, to } => write!(f, "{from}-{to}"),
            Self::Capture { from, to, removed } => {
                write!(f, "{from}x{to}")?;
                for sq in removed {
                    write!(f, " [{sq}]")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub cutoffs: u64,
    pub time_ms: u64,
}

pub trait Searcher<B: GameBoard> {
    fn search(&mut self, board: &B, role: Role) -> Option<(Move, SearchStats)>;
}
