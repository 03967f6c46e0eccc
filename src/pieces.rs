use crate::positions::Square;
use std::fmt::{self, Display};

// ---------------------------------------------
// Pieces
// ---------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank the pieces of this color start on.
    pub fn home_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }

    pub fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Rank a pawn of this color promotes on.
    pub fn promotion_rank(self) -> u8 {
        self.opposite().home_rank()
    }

    /// Direction a pawn of this color advances in, in ranks.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "WHITE"),
            Color::Black => write!(f, "BLACK"),
        }
    }
}

impl PieceKind {
    /// Material value used by scoring and evaluation.
    pub fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 100,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
}

/// A piece standing on the board.
///
/// `moves` and `attacks` are caches derived from the board the piece stands
/// on. They are only valid directly after `GameState::refresh`.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
    pub square: Square,
    pub has_moved: bool,
    pub has_castled: bool,
    pub(crate) moves: Vec<Square>,
    pub(crate) attacks: Vec<Square>,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind, square: Square) -> Piece {
        Piece {
            color,
            kind,
            square,
            has_moved: false,
            has_castled: false,
            moves: Vec::new(),
            attacks: Vec::new(),
        }
    }

    pub fn value(&self) -> i32 {
        self.kind.value()
    }

    /// Candidate destinations, ignoring whether the move would expose the own king.
    pub fn moves(&self) -> &[Square] {
        &self.moves
    }

    /// Squares this piece could capture on.
    pub fn attacks(&self) -> &[Square] {
        &self.attacks
    }

    /// Two-letter tag, colour initial then kind initial (e.g. "wN").
    pub fn tag(&self) -> String {
        let c = match self.color {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{}{}", c, self.kind.letter())
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
