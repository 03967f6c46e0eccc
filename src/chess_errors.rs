use crate::pieces::Color;
use crate::positions::Square;
use thiserror::Error;

// ---------------------------------------------
// Error Handling
// ---------------------------------------------

/// Everything that can go wrong while playing or searching.
///
/// Rule-level failures (`IllegalMove`, `CastleBlocked`, `EmptySquare`) are
/// ordinary results: the position is left untouched and the caller may try
/// another move. `MissingKing` means the board invariants are already broken
/// and play cannot continue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("No piece at {0}")]
    EmptySquare(Square),

    #[error("Square {0} is already occupied")]
    Occupied(Square),

    #[error("Illegal move: {start} to {end}")]
    IllegalMove { start: Square, end: Square },

    #[error("Cannot castle from {start} to {end}")]
    CastleBlocked { start: Square, end: Square },

    #[error("No {0} king on the board")]
    MissingKing(Color),

    #[error("No snapshot saved under key {0:?}")]
    UnknownSnapshot(String),

    #[error("{0} has no legal moves")]
    NoLegalMoves(Color),

    #[error("It is not {0}'s turn")]
    WrongTurn(Color),

    #[error("Could not read move: {0}")]
    Input(String),
}

pub type ChessResult<T> = std::result::Result<T, ChessError>;

impl ChessError {
    /// True for errors that reject a single move but leave the game playable.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ChessError::IllegalMove { .. }
                | ChessError::CastleBlocked { .. }
                | ChessError::EmptySquare(_)
                | ChessError::WrongTurn(_)
        )
    }
}
