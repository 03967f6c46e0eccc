//! Per-piece move rules.
//!
//! Every piece kind answers two questions against a board: where could it
//! move (candidate destinations), and which squares could it capture on
//! (attacked squares). For sliders and knights the two coincide. Pawns
//! attack diagonally whether or not there is something to capture, but only
//! move there when there is. Kings additionally refuse squares the opponent
//! attacks, which requires the attack caches of the board to be fresh.
use crate::boards::Board;
use crate::pieces::*;
use crate::positions::*;

#[rustfmt::skip]
const KNIGHT_STEPS: [Offset; 8] = [
    Offset(1, 2), Offset(2, 1), Offset(-1, 2), Offset(2, -1),
    Offset(1, -2), Offset(-2, -1), Offset(-2, 1), Offset(-1, -2),
];

#[rustfmt::skip]
const KING_STEPS: [Offset; 8] = [
    Offset(-1, -1), Offset(0, -1), Offset(1, -1),
    Offset(-1, 0),                 Offset(1, 0),
    Offset(-1, 1),  Offset(0, 1),  Offset(1, 1),
];

const BISHOP_RAYS: [Offset; 4] = [Offset(1, 1), Offset(1, -1), Offset(-1, 1), Offset(-1, -1)];
const ROOK_RAYS: [Offset; 4] = [Offset(-1, 0), Offset(1, 0), Offset(0, 1), Offset(0, -1)];
#[rustfmt::skip]
const QUEEN_RAYS: [Offset; 8] = [
    Offset(1, 0), Offset(0, 1), Offset(-1, 0), Offset(0, -1),
    Offset(1, 1), Offset(1, -1), Offset(-1, 1), Offset(-1, -1),
];

const KING_FILE: u8 = 4;
const QUEENSIDE_CASTLE_FILE: u8 = 2;
const KINGSIDE_CASTLE_FILE: u8 = 6;

// ---------------------------------------------
// Public interface
// ---------------------------------------------

/// Squares `piece` could capture on.
pub fn attacked_squares(board: &Board, piece: &Piece) -> Vec<Square> {
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(piece),
        PieceKind::Knight => step_moves(board, piece, &KNIGHT_STEPS),
        PieceKind::Bishop => ray_moves(board, piece, &BISHOP_RAYS),
        PieceKind::Rook => ray_moves(board, piece, &ROOK_RAYS),
        PieceKind::Queen => ray_moves(board, piece, &QUEEN_RAYS),
        PieceKind::King => KING_STEPS
            .iter()
            .filter_map(|o| piece.square + o)
            .collect(),
    }
}

/// Squares `piece` could move to, without regard to exposing its own king.
pub fn candidate_moves(board: &Board, piece: &Piece) -> Vec<Square> {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, piece),
        PieceKind::Knight => step_moves(board, piece, &KNIGHT_STEPS),
        PieceKind::Bishop => ray_moves(board, piece, &BISHOP_RAYS),
        PieceKind::Rook => ray_moves(board, piece, &ROOK_RAYS),
        PieceKind::Queen => ray_moves(board, piece, &QUEEN_RAYS),
        PieceKind::King => king_moves(board, piece),
    }
}

/// Can `king` castle onto `dest`?
///
/// Requires the king and the rook in the matching corner to be unmoved, every
/// square the king passes over (start and destination included) to be free of
/// attack, and every square between king and rook to be empty.
pub fn can_castle(board: &Board, king: &Piece, dest: Square) -> bool {
    if king.kind != PieceKind::King || king.has_moved {
        return false;
    }
    let rank = king.color.home_rank();
    if king.square.rank() != rank || king.square.file() != KING_FILE || dest.rank() != rank {
        return false;
    }

    let (rook_file, direction) = match dest.file() {
        QUEENSIDE_CASTLE_FILE => (0u8, -1i8),
        KINGSIDE_CASTLE_FILE => (BOARD_SIZE - 1, 1i8),
        _ => return false,
    };

    match board.piece_at(king.square.with_file(rook_file)) {
        Some(rook)
            if rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved => {}
        _ => return false,
    }

    // The king may not start in, pass through or land in check
    let mut file = king.square.file() as i8;
    loop {
        if board.is_attacked(king.square.with_file(file as u8), king.color) {
            return false;
        }
        if file == dest.file() as i8 {
            break;
        }
        file += direction;
    }

    let (low, high) = if rook_file < KING_FILE {
        (rook_file + 1, KING_FILE)
    } else {
        (KING_FILE + 1, rook_file)
    };
    (low..high).all(|f| board.is_empty(king.square.with_file(f)))
}

/// Destinations a king on `square` might castle to.
pub fn castle_targets(king: &Piece) -> [Square; 2] {
    [
        king.square.with_file(QUEENSIDE_CASTLE_FILE),
        king.square.with_file(KINGSIDE_CASTLE_FILE),
    ]
}

/// Where the rook ends up (from, to) when a king castles onto `dest`.
pub fn castle_rook_squares(dest: Square) -> (Square, Square) {
    if dest.file() < KING_FILE {
        (dest.with_file(0), dest.with_file(3))
    } else {
        (dest.with_file(BOARD_SIZE - 1), dest.with_file(5))
    }
}

// ---------------------------------------------
// Per-kind generators
// ---------------------------------------------

fn pawn_attacks(piece: &Piece) -> Vec<Square> {
    let dir = piece.color.forward();
    [-1, 1]
        .iter()
        .filter_map(|&df| piece.square.offset(df, dir))
        .collect()
}

fn pawn_moves(board: &Board, piece: &Piece) -> Vec<Square> {
    let mut res = Vec::with_capacity(4);
    let dir = piece.color.forward();

    if let Some(one_ahead) = piece.square.offset(0, dir) {
        if board.is_empty(one_ahead) {
            res.push(one_ahead);
            let on_start_rank = piece.square.rank() == piece.color.pawn_rank();
            if !piece.has_moved && on_start_rank {
                if let Some(two_ahead) = piece.square.offset(0, 2 * dir) {
                    if board.is_empty(two_ahead) {
                        res.push(two_ahead);
                    }
                }
            }
        }
    }

    for sq in pawn_attacks(piece) {
        if let Some(target) = board.piece_at(sq) {
            if target.color != piece.color {
                res.push(sq);
            }
        }
    }
    res
}

fn step_moves(board: &Board, piece: &Piece, steps: &[Offset]) -> Vec<Square> {
    steps
        .iter()
        .filter_map(|o| piece.square + o)
        .filter(|&sq| match board.piece_at(sq) {
            Some(other) => other.color != piece.color,
            None => true,
        })
        .collect()
}

fn ray_moves(board: &Board, piece: &Piece, rays: &[Offset]) -> Vec<Square> {
    let mut res = Vec::with_capacity(14);
    for ray in rays {
        let mut current = piece.square + ray;
        while let Some(sq) = current {
            match board.piece_at(sq) {
                None => res.push(sq),
                Some(other) => {
                    // Opposite colour: can take, but can't move beyond
                    if other.color != piece.color {
                        res.push(sq);
                    }
                    break;
                }
            }
            current = sq + ray;
        }
    }
    res
}

fn king_moves(board: &Board, piece: &Piece) -> Vec<Square> {
    let mut res: Vec<Square> = KING_STEPS
        .iter()
        .filter_map(|o| piece.square + o)
        .filter(|&sq| !board.is_attacked(sq, piece.color))
        .filter(|&sq| match board.piece_at(sq) {
            Some(other) => other.color != piece.color,
            None => true,
        })
        .collect();

    if !piece.has_moved {
        for dest in castle_targets(piece).iter() {
            if can_castle(board, piece, *dest) {
                res.push(*dest);
            }
        }
    }
    res
}
