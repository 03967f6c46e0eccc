use crate::chess_errors::*;
use crate::pieces::*;
use crate::positions::*;
use array_init::array_init;
use std::fmt::{self, Display};

// ---------------------------------------------
// Board
// ---------------------------------------------

/// The pieces currently on the board, indexed by square.
#[derive(Clone, PartialEq)]
pub struct Board {
    squares: [Option<Piece>; (BOARD_SIZE * BOARD_SIZE) as usize],
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: array_init(|_| None),
        }
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index()].as_ref()
    }

    pub(crate) fn piece_at_mut(&mut self, sq: Square) -> Option<&mut Piece> {
        self.squares[sq.index()].as_mut()
    }

    /// True iff a piece of the other color than `color` has `sq` among its attacked squares.
    /// Only meaningful on a freshly refreshed board.
    pub fn is_attacked(&self, sq: Square, color: Color) -> bool {
        self.pieces()
            .filter(|p| p.color != color)
            .any(|p| p.attacks.contains(&sq))
    }

    /// Places a piece on its square. Fails if the square is taken.
    pub fn place(&mut self, piece: Piece) -> ChessResult<()> {
        let slot = &mut self.squares[piece.square.index()];
        if slot.is_some() {
            return Err(ChessError::Occupied(piece.square));
        }
        *slot = Some(piece);
        Ok(())
    }

    /// Puts a piece back on its square. The square must be empty.
    pub(crate) fn put(&mut self, piece: Piece) {
        let idx = piece.square.index();
        debug_assert!(
            self.squares[idx].is_none(),
            "Square {} still occupied by {:?}",
            piece.square,
            self.squares[idx]
        );
        self.squares[idx] = Some(piece);
    }

    /// Removes and returns the piece on `sq`.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    pub fn clear(&mut self) {
        for slot in self.squares.iter_mut() {
            *slot = None;
        }
    }

    /// All pieces, in square order A1..H8.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares.iter().flatten()
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |p| p.color == color)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|p| p.kind == PieceKind::King)
            .map(|p| p.square)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

// Displays the board with rank 8 on top:
//
//     A   B   C   D   E   F   G   H
//   |---|---|---|---|---|---|---|---|
// 8 |bR |bN |   |   |   |   |   |   | 8
//   ...
impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "  |---|---|---|---|---|---|---|---|";
        write!(f, "   ")?;
        for c in FILE_NAMES.iter() {
            write!(f, " {}  ", c)?;
        }
        writeln!(f, "\n{}", separator)?;
        for rank in (1..=BOARD_SIZE).rev() {
            write!(f, "{} |", rank)?;
            for file in 0..BOARD_SIZE {
                let sq = Square::from_indices(file as i8, rank as i8 - 1)
                    .expect("Board iteration out of range");
                match self.piece_at(sq) {
                    Some(p) => write!(f, "{} |", p.tag())?,
                    None => write!(f, "   |")?,
                }
            }
            writeln!(f, " {}\n{}", rank, separator)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
