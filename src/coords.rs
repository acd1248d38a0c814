use std::fmt;
use std::str::FromStr;

use crate::error::{BoardError, BoardResult};

const FILE_LETTERS: &[u8; 8] = b"abcdefgh";

/// One of the 64 board cells, stored as `rank * 8 + file` (a1 = 0, h8 = 63).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn from_index(index: u8) -> BoardResult<Self> {
        if index < 64 {
            Ok(Square(index))
        } else {
            Err(BoardError::IllegalSquare(format!("index {index}")))
        }
    }

    /// Builds a square from a file and a 0-based rank already known to be in range.
    pub(crate) const fn at(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Row 0 is rank 8, as on screen.
    pub fn from_matrix(file: u8, row: u8) -> BoardResult<Self> {
        if file > 7 || row > 7 {
            return Err(BoardError::IllegalSquare(format!("matrix ({file}, {row})")));
        }
        Ok(Square::at(file, 7 - row))
    }

    pub fn from_algebraic(s: &str) -> BoardResult<Self> {
        match s.as_bytes() {
            [f @ b'a'..=b'h', r @ b'1'..=b'8'] => Ok(Square::at(f - b'a', r - b'1')),
            _ => Err(BoardError::IllegalSquare(s.to_string())),
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// 0-based rank, 0 being rank 1.
    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Screen row, 0 being rank 8.
    pub fn row(self) -> u8 {
        7 - self.rank()
    }

    pub fn to_matrix(self) -> (u8, u8) {
        (self.file(), self.row())
    }

    pub fn to_algebraic(self) -> String {
        self.to_string()
    }

    pub(crate) fn mask(self) -> u64 {
        1u64 << self.0
    }

    /// The square `df` files and `dr` ranks away, if still on the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::at(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0u8..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}",
            FILE_LETTERS[self.file() as usize] as char,
            self.rank() + 1
        )
    }
}

impl FromStr for Square {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
    }
}

/// Maps a click to the square under it by integer division with `board_size_px / 8`.
pub fn pixel_to_matrix(x: i32, y: i32, board_size_px: u32) -> BoardResult<Square> {
    let out_of_bounds = BoardError::OutOfBounds {
        x,
        y,
        size: board_size_px,
    };
    let square_px = (board_size_px / 8) as i32;
    if square_px == 0 || x < 0 || y < 0 {
        return Err(out_of_bounds);
    }
    let (file, row) = (x / square_px, y / square_px);
    if file > 7 || row > 7 {
        return Err(out_of_bounds);
    }
    Square::from_matrix(file as u8, row as u8)
}

pub fn matrix_to_algebraic(file: u8, row: u8) -> BoardResult<String> {
    Square::from_matrix(file, row).map(Square::to_algebraic)
}

pub fn algebraic_to_matrix(s: &str) -> BoardResult<(u8, u8)> {
    Square::from_algebraic(s).map(Square::to_matrix)
}

/// Top-left pixel of `square`, where a renderer anchors the piece image.
pub fn square_origin_px(square: Square, board_size_px: u32) -> (u32, u32) {
    let square_px = board_size_px / 8;
    (
        square_px * square.file() as u32,
        square_px * square.row() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_round_trip() {
        for file in 0..8 {
            for row in 0..8 {
                let notation = matrix_to_algebraic(file, row).unwrap();
                assert_eq!(algebraic_to_matrix(&notation).unwrap(), (file, row));
            }
        }
    }

    #[test]
    fn test_algebraic_round_trip() {
        for square in Square::all() {
            let notation = square.to_algebraic();
            let (file, row) = algebraic_to_matrix(&notation).unwrap();
            assert_eq!(matrix_to_algebraic(file, row).unwrap(), notation);
        }
    }

    #[test]
    fn test_rank_digit_is_eight_minus_row() {
        assert_eq!(matrix_to_algebraic(0, 0).unwrap(), "a8");
        assert_eq!(matrix_to_algebraic(4, 4).unwrap(), "e4");
        assert_eq!(matrix_to_algebraic(7, 7).unwrap(), "h1");
        assert_eq!(algebraic_to_matrix("e4").unwrap(), (4, 4));
    }

    #[test]
    fn test_malformed_squares() {
        for bad in ["", "e", "e9", "i1", "E4", "e44", "4e"] {
            assert!(matches!(
                Square::from_algebraic(bad),
                Err(BoardError::IllegalSquare(_))
            ));
        }
        assert!(Square::from_matrix(8, 0).is_err());
        assert!(Square::from_index(64).is_err());
    }

    #[test]
    fn test_pixel_to_matrix() {
        // 500px board -> 62px squares
        let square = pixel_to_matrix(0, 0, 500).unwrap();
        assert_eq!(square.to_algebraic(), "a8");
        let square = pixel_to_matrix(4 * 62 + 10, 7 * 62 + 61, 500).unwrap();
        assert_eq!(square.to_algebraic(), "e1");
        let square = pixel_to_matrix(496, 0, 500);
        assert!(matches!(square, Err(BoardError::OutOfBounds { .. })));
        assert!(pixel_to_matrix(-1, 10, 500).is_err());
        assert!(pixel_to_matrix(3, 3, 7).is_err());
    }

    #[test]
    fn test_square_origin() {
        let e5 = Square::from_algebraic("e5").unwrap();
        assert_eq!(square_origin_px(e5, 400), (200, 150));
    }

    #[test]
    fn test_offset_stays_on_board() {
        let h8 = Square::from_algebraic("h8").unwrap();
        assert_eq!(h8.offset(1, 0), None);
        assert_eq!(h8.offset(-1, -1).unwrap().to_algebraic(), "g7");
    }
}
