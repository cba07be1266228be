use thiserror::Error;

/// Failures of the explicit board constructors. Interactions never fail, they
/// leave the board untouched instead.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates fall outside the board")]
    InvalidCoords,
    #[error("A board needs at least one cell without a mine")]
    TooManyMines,
    #[error("Layout rows must be non-empty and of equal length")]
    InvalidBoardShape,
    #[error("The game has ended")]
    AlreadyEnded,
    #[error("Seed must be 64 hexadecimal digits")]
    InvalidSeed,
}

pub type Result<T> = core::result::Result<T, GameError>;
