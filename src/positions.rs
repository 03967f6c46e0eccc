use crate::chess_errors::*;
use array_init::array_init;
use lazy_static::lazy_static;
use std::fmt::{self, Display};
use std::ops;
use std::str::FromStr;

// Squares on a 8x8 board.
//
// Numbered as follows:
//
//     A  B  C  D  E  F  G  H
//   ---------------------------
// 8 | 56 57 58 59 60 61 62 63 | 8
// 7 | 48 49 50 51 52 53 54 55 | 7
// 6 | 40 41 42 43 44 45 46 47 | 6
// 5 | 32 33 34 35 36 37 38 39 | 5
// 4 | 24 25 26 27 28 29 30 31 | 4
// 3 | 16 17 18 19 20 21 22 23 | 3
// 2 | 8  9  10 11 12 13 14 15 | 2
// 1 | 0  1  2  3  4  5  6  7  | 1
//   ---------------------------
//     A  B  C  D  E  F  G  H
//
// ---------------------------------------------
// Squares
// ---------------------------------------------

pub const BOARD_SIZE: u8 = 8;
pub const FILE_NAMES: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

lazy_static! {
    static ref ALL_SQUARES: [Square; 64] = array_init(|i| Square(i as u8));
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

/// A (file, rank) step. Adding it to a square yields `None` when the result
/// would leave the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Offset(pub i8, pub i8);

impl Square {
    /// Builds a square from zero-based file and rank indices, if both are on the board.
    pub fn from_indices(file: i8, rank: i8) -> Option<Square> {
        if Square::in_board(file, rank) {
            Some(Square((rank as u8) * BOARD_SIZE + file as u8))
        } else {
            None
        }
    }

    /// Builds a square from a file letter and a one-based rank, e.g. ('E', 4).
    pub fn new(file: char, rank: u8) -> ChessResult<Square> {
        let file_idx = FILE_NAMES
            .iter()
            .position(|&c| c == file.to_ascii_uppercase())
            .ok_or_else(|| ChessError::InvalidSquare(format!("{}{}", file, rank)))?;
        if rank == 0 || rank > BOARD_SIZE {
            return Err(ChessError::InvalidSquare(format!("{}{}", file, rank)));
        }
        Ok(Square((rank - 1) * BOARD_SIZE + file_idx as u8))
    }

    pub const fn in_board(file: i8, rank: i8) -> bool {
        file >= 0 && rank >= 0 && file < 8 && rank < 8
    }

    /// Zero-based file index, A = 0.
    pub const fn file(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    /// One-based rank, as written on the board.
    pub const fn rank(self) -> u8 {
        self.0 / BOARD_SIZE + 1
    }

    pub fn file_char(self) -> char {
        FILE_NAMES[self.file() as usize]
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Square::from_indices(self.file() as i8 + df, self.rank() as i8 - 1 + dr)
    }

    /// Same rank, other file.
    pub fn with_file(self, file: u8) -> Square {
        debug_assert!(file < BOARD_SIZE);
        Square((self.rank() - 1) * BOARD_SIZE + file)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates A1, B1, ..., H1, A2, ..., H8.
    pub fn all_squares() -> impl Iterator<Item = Square> {
        ALL_SQUARES.iter().copied()
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChessError::InvalidSquare(s.to_string());
        let mut chars = s.trim().chars();

        let file = chars.next().ok_or_else(err)?;
        let rank = chars
            .next()
            .and_then(|r| r.to_digit(10))
            .ok_or_else(err)?;
        if chars.next().is_some() {
            return Err(err());
        }
        Square::new(file, rank as u8).map_err(|_| err())
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl_op_ex!(+ |a: &Square, b: &Offset| -> Option<Square> { a.offset(b.0, b.1) });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square() {
        let sq: Square = "E4".parse().unwrap();
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 4);
        assert_eq!("e4".parse::<Square>().unwrap(), sq);
        assert_eq!("A1".parse::<Square>().unwrap().index(), 0);
        assert_eq!("H8".parse::<Square>().unwrap().index(), 63);
    }

    #[test]
    fn test_parse_invalid_square() {
        for s in &["", "E", "I1", "A0", "A9", "E44", "44"] {
            assert!(s.parse::<Square>().is_err(), "{} should not parse", s);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for sq in Square::all_squares() {
            assert_eq!(sq.to_string().parse::<Square>().unwrap(), sq);
        }
        assert_eq!(Square::all_squares().count(), 64);
    }

    #[test]
    fn test_offsets() {
        let a1 = Square::new('A', 1).unwrap();
        assert_eq!(a1 + Offset(1, 2), Some(Square::new('B', 3).unwrap()));
        assert_eq!(a1 + Offset(-1, 0), None);
        assert_eq!(Square::new('H', 8).unwrap() + Offset(0, 1), None);
        assert_eq!(a1.with_file(7), Square::new('H', 1).unwrap());
    }
}
