use crate::board::Board;
use crate::error::{BoardError, BoardResult};

/// Position the board starts from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartPosition {
    #[default]
    Standard,
    /// Simplified placement string, see [`Board::from_placement`].
    Placement(String),
    Fen(String),
}

impl StartPosition {
    pub fn to_board(&self) -> BoardResult<Board> {
        match self {
            StartPosition::Standard => Ok(Board::initial()),
            StartPosition::Placement(placement) => Board::from_placement(placement),
            StartPosition::Fen(fen) => Board::from_fen(fen),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Edge length of the drawn board in pixels.
    pub size_px: u32,
    /// Inactive boards ignore clicks.
    pub active: bool,
    pub start: StartPosition,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size_px: 500,
            active: true,
            start: StartPosition::Standard,
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> BoardResult<()> {
        if self.size_px < 8 {
            return Err(BoardError::InvalidConfig(format!(
                "board size {}px leaves no room for 8 squares",
                self.size_px
            )));
        }
        Ok(())
    }

    pub fn square_px(&self) -> u32 {
        self.size_px / 8
    }
}
