use thiserror::Error;

/// Errors raised by coordinate conversion, position loading and move application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Pixel coordinate outside the 8x8 grid
    #[error("pixel ({x}, {y}) lies outside a {size}px board")]
    OutOfBounds { x: i32, y: i32, size: u32 },

    /// Malformed algebraic, matrix or index input
    #[error("illegal square: {0}")]
    IllegalSquare(String),

    /// Move that cannot be applied
    #[error("illegal move: {from} to {to}")]
    IllegalMove { from: String, to: String },

    #[error("invalid placement string: {0}")]
    InvalidPlacement(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid board configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for board operations
pub type BoardResult<T> = Result<T, BoardError>;
