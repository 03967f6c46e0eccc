//! Describing the moves that can be done on a chessboard.
use crate::chess_errors::*;
use crate::pieces::*;
use crate::positions::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub start: Square,
    pub end: Square,
}

/// Prints the move as a four character history token, e.g. "A2A4".
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)
    }
}

impl Move {
    pub fn new(start: Square, end: Square) -> Self {
        Move { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Standard,
    Castle,
    Promotion,
}

impl MoveKind {
    /// Classifies a move of `piece` to `end`. Castling is any king move spanning
    /// more than one file, promotion any pawn move onto the last rank.
    pub fn classify(piece: &Piece, end: Square) -> MoveKind {
        match piece.kind {
            PieceKind::King if (end.file() as i8 - piece.square.file() as i8).abs() > 1 => {
                MoveKind::Castle
            }
            PieceKind::Pawn if end.rank() == piece.color.promotion_rank() => MoveKind::Promotion,
            _ => MoveKind::Standard,
        }
    }
}

/// Everything needed to take an applied move back.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub mv: Move,
    pub kind: MoveKind,
    /// The moving piece as it was before the move
    pub(crate) moved: Piece,
    pub(crate) captured: Option<Piece>,
    /// Rook squares (from, to) and its previous has_moved flag, for castles
    pub(crate) rook: Option<(Square, Square, bool)>,
    pub(crate) trial: bool,
    pub(crate) turn: Color,
}

impl MoveRecord {
    pub fn captured(&self) -> Option<&Piece> {
        self.captured.as_ref()
    }
}

/// Concatenates the history tokens of `moves`.
pub fn history_token(moves: &[Move]) -> String {
    let mut s = String::with_capacity(moves.len() * 4);
    for m in moves {
        s.push_str(&m.to_string());
    }
    s
}

/// Parses a concatenated history token back into moves.
pub fn parse_history(token: &str) -> ChessResult<Vec<Move>> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() % 4 != 0 {
        return Err(ChessError::InvalidSquare(token.to_string()));
    }
    chars
        .chunks(4)
        .map(|c| {
            let start: Square = c[..2].iter().collect::<String>().parse()?;
            let end: Square = c[2..].iter().collect::<String>().parse()?;
            Ok(Move::new(start, end))
        })
        .collect()
}
