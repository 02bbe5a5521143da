use crate::logic::board::BOARD_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reasons a move is rejected. Every variant leaves the board unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("square is off the board")]
    OutOfBounds,
    #[error("no piece at the source square")]
    NoPieceAtSource,
    #[error("the piece at the source square belongs to the opponent")]
    NotOwnPiece,
    #[error("target square is occupied")]
    TargetOccupied,
    #[error("piece cannot move that way")]
    InvalidMovePattern,
    #[error("capture data does not match the board")]
    MalformedCapture,
    #[error("this game does not play that kind of move")]
    UnsupportedMove,
    #[error("the capturing piece must continue its chain")]
    ChainPending,
    #[error("move is not legal in this position")]
    IllegalMove,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the game is already over")]
    GameOver,
    #[error("board description is malformed")]
    MalformedBoard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameKind {
    FourInARow,
    Dame,
}

impl GameKind {
    pub const ALL: [Self; 2] = [Self::FourInARow, Self::Dame];

    pub const fn name(self) -> &'static str {
        match self {
            Self::FourInARow => "Four in a Row",
            Self::Dame => "Dame",
        }
    }

    pub fn rules(self) -> String {
        match self {
            Self::FourInARow => format!(
                "Four in a Row on a {BOARD_SIZE}x{BOARD_SIZE} board.\n\
                 Players take turns placing their mark (White 'X', Black 'O') on any empty cell.\n\
                 The first player with 4 marks in a row, column or diagonal wins.\n\
                 If the board fills up without a line, the game is a draw.\n\
                 White moves first."
            ),
            Self::Dame => format!(
                "Dame (simplified checkers) on a {BOARD_SIZE}x{BOARD_SIZE} board, dark squares only.\n\
                 White 'W' starts on rows 0-1 and moves towards row {last}; Black 'B' starts on rows {first_black}-{last} and moves towards row 0.\n\
                 Pieces move one step diagonally forward. Capturing is mandatory:\n\
                 jump forward over an adjacent opponent piece onto the empty square behind it.\n\
                 If the capturing piece can capture again from its landing square, it must continue.\n\
                 Win by reaching the opponent's back rank, or when the opponent has no pieces or no legal moves.\n\
                 There are no kings and no draws. White moves first.",
                last = BOARD_SIZE - 1,
                first_black = BOARD_SIZE - 2,
            ),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
