use crate::attacks;
use crate::boards::*;
use crate::chess_errors::*;
use crate::moves::*;
use crate::pieces::*;
use crate::positions::*;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use tracing::debug;

/// State of the game from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        };
        write!(f, "{}", s)
    }
}

// Board, turn and history are saved and restored together, so a restore
// can never leave the turn out of step with the pieces.
#[derive(Clone)]
struct Snapshot {
    board: Board,
    turn: Color,
    history: Vec<Move>,
}

#[rustfmt::skip]
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

// -------------------------------------
// GameState
// ------------------------------------

/// A Game State is an object that represents the current position together with
/// whose turn it is and how we got here.
/// Implements the rules on top of the raw piece moves: applying and undoing moves
/// (including castling and promotion), check, checkmate, stalemate and legality.
///
/// Every mutation ends with `refresh`, so the per-piece caches are always in step
/// with the board when a public method returns.
#[derive(Clone)]
pub struct GameState {
    board: Board,
    turn: Color,
    history: Vec<Move>,
    snapshots: HashMap<String, Snapshot>,
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board && self.turn == other.turn && self.history == other.history
    }
}

// Public Interface
impl GameState {
    /// An empty board with White to move.
    pub fn empty() -> GameState {
        GameState {
            board: Board::empty(),
            turn: Color::White,
            history: Vec::new(),
            snapshots: HashMap::new(),
        }
    }

    /// Returns a game with the figures placed on standard chess starting positions
    pub fn standard_setup() -> GameState {
        let mut g = GameState::empty();
        for color in [Color::White, Color::Black] {
            let back = color.home_rank() as i8 - 1;
            let front = color.pawn_rank() as i8 - 1;
            for (file, kind) in BACK_RANK.iter().enumerate() {
                let back_sq = Square::from_indices(file as i8, back)
                    .expect("Standard setup failed; back rank out of range.");
                let front_sq = Square::from_indices(file as i8, front)
                    .expect("Standard setup failed; pawn rank out of range.");
                g.board.put(Piece::new(color, *kind, back_sq));
                g.board.put(Piece::new(color, PieceKind::Pawn, front_sq));
            }
        }
        g.refresh();
        g
    }

    /// Adds a piece to the board, e.g. to set up a custom position.
    pub fn add_piece(&mut self, color: Color, kind: PieceKind, sq: Square) -> ChessResult<()> {
        self.board.place(Piece::new(color, kind, sq))?;
        self.refresh();
        Ok(())
    }

    /// Removes every piece and forgets the history. The turn is left as it is.
    pub fn clear(&mut self) {
        self.board.clear();
        self.history.clear();
        self.snapshots.clear();
    }

    pub fn set_turn(&mut self, color: Color) {
        self.turn = color;
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The applied moves as one string, four characters per ply.
    pub fn history_token(&self) -> String {
        history_token(&self.history)
    }

    pub fn material_value(&self, side: Color) -> i32 {
        self.board.pieces_of(side).map(|p| p.value()).sum()
    }

    /// Checks the move for legality and, if it passes, plays it for real.
    /// Returns the status of the side now to move.
    pub fn play_move(&mut self, start: Square, end: Square) -> ChessResult<GameStatus> {
        let color = self.turn;
        if !self.is_legal_move(color, start, end)? {
            return Err(ChessError::IllegalMove { start, end });
        }
        self.apply_move(start, end, false)?;
        self.status()
    }

    /// Status of the side to move.
    pub fn status(&mut self) -> ChessResult<GameStatus> {
        let color = self.turn;
        let in_check = self.is_check(color)?;
        let can_move = self.has_legal_move(color)?;
        Ok(match (in_check, can_move) {
            (true, false) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Ongoing,
        })
    }
}

// -------------------------------------
// Moving impls
// ------------------------------------

impl GameState {
    /// Recomputes every piece's attacked squares and candidate moves.
    ///
    /// Attacks go first: king moves depend on the attacks of the other side.
    pub fn refresh(&mut self) {
        let attacks: Vec<(Square, Vec<Square>)> = self
            .board
            .pieces()
            .map(|p| (p.square, attacks::attacked_squares(&self.board, p)))
            .collect();
        for (sq, a) in attacks {
            if let Some(p) = self.board.piece_at_mut(sq) {
                p.attacks = a;
            }
        }

        let moves: Vec<(Square, Vec<Square>)> = self
            .board
            .pieces()
            .map(|p| (p.square, attacks::candidate_moves(&self.board, p)))
            .collect();
        for (sq, m) in moves {
            if let Some(p) = self.board.piece_at_mut(sq) {
                p.moves = m;
            }
        }
    }

    pub fn classify_move(&self, start: Square, end: Square) -> ChessResult<MoveKind> {
        let piece = self
            .board
            .piece_at(start)
            .ok_or(ChessError::EmptySquare(start))?;
        Ok(MoveKind::classify(piece, end))
    }

    /// Makes a move on the board. Does not check legality beyond castling
    /// preconditions, which are re-checked here.
    ///
    /// A trial move leaves turn and history alone; anything else hands the turn
    /// over and is appended to the history. The returned record undoes the move.
    pub fn apply_move(&mut self, start: Square, end: Square, trial: bool) -> ChessResult<MoveRecord> {
        if start == end {
            return Err(ChessError::IllegalMove { start, end });
        }
        let piece = self
            .board
            .piece_at(start)
            .ok_or(ChessError::EmptySquare(start))?;
        let kind = MoveKind::classify(piece, end);
        if kind == MoveKind::Castle && !attacks::can_castle(&self.board, piece, end) {
            return Err(ChessError::CastleBlocked { start, end });
        }

        let moved = self
            .board
            .take(start)
            .ok_or(ChessError::EmptySquare(start))?;
        let captured = self.board.take(end);

        let mut piece = moved.clone();
        piece.square = end;
        piece.has_moved = true;

        let mut rook = None;
        match kind {
            MoveKind::Castle => {
                piece.has_castled = true;
                let (rook_from, rook_to) = attacks::castle_rook_squares(end);
                if let Some(mut r) = self.board.take(rook_from) {
                    rook = Some((rook_from, rook_to, r.has_moved));
                    r.square = rook_to;
                    r.has_moved = true;
                    self.board.put(r);
                }
            }
            MoveKind::Promotion => piece.kind = PieceKind::Queen,
            MoveKind::Standard => {}
        }
        self.board.put(piece);

        let record = MoveRecord {
            mv: Move::new(start, end),
            kind,
            moved,
            captured,
            rook,
            trial,
            turn: self.turn,
        };

        if !trial {
            self.turn = self.turn.opposite();
            self.history.push(record.mv);
            debug!(mv = %record.mv, kind = ?kind, captured = ?record.captured.as_ref().map(|p| p.kind), "applied move");
        }
        self.refresh();
        Ok(record)
    }

    /// Takes back a move made by `apply_move`. Records must be undone in
    /// reverse order of application.
    pub fn undo_move(&mut self, record: MoveRecord) {
        let MoveRecord {
            mv,
            moved,
            captured,
            rook,
            trial,
            turn,
            ..
        } = record;

        self.board.take(mv.end);
        if let Some((from, to, had_moved)) = rook {
            if let Some(mut r) = self.board.take(to) {
                r.square = from;
                r.has_moved = had_moved;
                self.board.put(r);
            }
        }
        self.board.put(moved);
        if let Some(c) = captured {
            self.board.put(c);
        }

        if !trial {
            self.history.pop();
        }
        self.turn = turn;
        self.refresh();
    }

    /// Is `color`'s king attacked? A missing king is an error, not `false`.
    pub fn is_check(&self, color: Color) -> ChessResult<bool> {
        let king = self
            .board
            .king_square(color)
            .ok_or(ChessError::MissingKing(color))?;
        Ok(self.board.is_attacked(king, color))
    }

    pub fn is_checkmate(&mut self, color: Color) -> ChessResult<bool> {
        if self.turn != color || !self.is_check(color)? {
            return Ok(false);
        }
        Ok(!self.has_legal_move(color)?)
    }

    pub fn is_stalemate(&mut self, color: Color) -> ChessResult<bool> {
        if self.turn != color || self.is_check(color)? {
            return Ok(false);
        }
        Ok(!self.has_legal_move(color)?)
    }

    /// It is `color`'s turn, a `color` piece stands on `start`, `end` is one of
    /// its candidates, and the move does not leave `color`'s king in check.
    pub fn is_legal_move(&mut self, color: Color, start: Square, end: Square) -> ChessResult<bool> {
        if self.turn != color {
            return Ok(false);
        }
        match self.board.piece_at(start) {
            Some(p) if p.color == color && p.moves.contains(&end) => {}
            _ => return Ok(false),
        }
        self.leaves_king_safe(color, start, end)
    }

    /// All legal moves of `color`, in board order. Empty if it is not `color`'s turn.
    pub fn get_all_legal_moves(&mut self, color: Color) -> ChessResult<Vec<Move>> {
        if self.turn != color {
            return Ok(Vec::new());
        }
        let mut res = Vec::new();
        for mv in self.candidate_moves(color) {
            if self.leaves_king_safe(color, mv.start, mv.end)? {
                res.push(mv);
            }
        }
        Ok(res)
    }

    /// One-ply heuristic: value of what is captured on `end`, minus our own value
    /// if `end` is attacked, plus our own value if `start` is attacked (escaping).
    pub fn score_move(&self, color: Color, start: Square, end: Square) -> i32 {
        let piece = match self.board.piece_at(start) {
            Some(p) => p,
            None => return 0,
        };
        let mut score = 0;
        if let Some(target) = self.board.piece_at(end) {
            if target.color != color {
                score += target.value();
            }
        }
        if self.board.is_attacked(end, color) {
            score -= piece.value();
        }
        if self.board.is_attacked(start, color) {
            score += piece.value();
        }
        score
    }

    /// Every (start, candidate) pair of `color` from the caches.
    fn candidate_moves(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces_of(color)
            .flat_map(|p| p.moves.iter().map(move |&end| Move::new(p.square, end)))
            .collect()
    }

    fn has_legal_move(&mut self, color: Color) -> ChessResult<bool> {
        for mv in self.candidate_moves(color) {
            if self.leaves_king_safe(color, mv.start, mv.end)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // Trial-applies the move and checks whether `color` is in check afterwards.
    // The position is restored on every path.
    fn leaves_king_safe(&mut self, color: Color, start: Square, end: Square) -> ChessResult<bool> {
        let record = match self.apply_move(start, end, true) {
            Ok(r) => r,
            Err(e) if e.is_rejection() => return Ok(false),
            Err(e) => return Err(e),
        };
        let in_check = self.is_check(color);
        self.undo_move(record);
        Ok(!in_check?)
    }
}

// -------------------------------------
// Snapshots
// ------------------------------------

impl GameState {
    /// Saves board, turn and history under `key`.
    pub fn save_snapshot(&mut self, key: &str) {
        let snap = Snapshot {
            board: self.board.clone(),
            turn: self.turn,
            history: self.history.clone(),
        };
        self.snapshots.insert(key.to_string(), snap);
    }

    /// Restores what was saved under `key`. Unknown keys are a usage error.
    pub fn restore_snapshot(&mut self, key: &str) -> ChessResult<()> {
        let snap = self
            .snapshots
            .get(key)
            .cloned()
            .ok_or_else(|| ChessError::UnknownSnapshot(key.to_string()))?;
        self.board = snap.board;
        self.turn = snap.turn;
        self.history = snap.history;
        Ok(())
    }

    pub fn discard_snapshots(&mut self) {
        self.snapshots.clear();
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Turn: {}  Player: {}\n{}",
            self.history.len(),
            self.turn,
            self.board
        )
    }
}

impl Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Turn: {}  Player: {}", self.history.len(), self.turn)?;
        writeln!(f, "History: {}", self.history_token())?;
        write!(f, "{}", self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square;

    fn custom(pieces: &[(Color, PieceKind, &str)], turn: Color) -> GameState {
        let mut g = GameState::empty();
        for (c, k, s) in pieces {
            g.add_piece(*c, *k, square!(*s)).unwrap();
        }
        g.set_turn(turn);
        g
    }

    #[test]
    fn test_standard_setup() {
        let mut g = GameState::standard_setup();
        assert_eq!(g.board().piece_count(), 32);
        assert!(g.board().pieces().all(|p| !p.has_moved));
        assert_eq!(g.turn(), Color::White);
        let e1 = g.board().piece_at(square!("E1")).unwrap();
        assert_eq!((e1.color, e1.kind), (Color::White, PieceKind::King));
        let d8 = g.board().piece_at(square!("D8")).unwrap();
        assert_eq!((d8.color, d8.kind), (Color::Black, PieceKind::Queen));
        assert_eq!(g.get_all_legal_moves(Color::White).unwrap().len(), 20);
        assert!(g.get_all_legal_moves(Color::Black).unwrap().is_empty());
        assert_eq!(g.material_value(Color::White), 139);
        assert_eq!(g.status().unwrap(), GameStatus::Ongoing);
    }

    #[test]
    fn test_white_pawn_move() {
        let mut g = GameState::standard_setup();
        let status = g.play_move(square!("A2"), square!("A4")).unwrap();
        assert_eq!(status, GameStatus::Ongoing);
        assert!(g.board().is_empty(square!("A2")));
        let p = g.board().piece_at(square!("A4")).unwrap();
        assert_eq!(p.color, Color::White);
        assert!(p.has_moved);
        assert_eq!(g.turn(), Color::Black);
        assert_eq!(g.history_token(), "A2A4");
    }

    #[test]
    fn test_black_cannot_move_first() {
        let mut g = GameState::standard_setup();
        assert!(!g.is_legal_move(Color::Black, square!("A7"), square!("A5")).unwrap());
    }

    #[test]
    fn test_illegal_move_rejected() {
        let mut g = GameState::standard_setup();
        let before = g.clone();
        assert_eq!(
            g.play_move(square!("A1"), square!("F3")),
            Err(ChessError::IllegalMove {
                start: square!("A1"),
                end: square!("F3")
            })
        );
        assert_eq!(g, before);
        assert_eq!(g.turn(), Color::White);
    }

    #[test]
    fn test_raw_take() {
        let mut g = GameState::standard_setup();
        let record = g.apply_move(square!("A2"), square!("A7"), false).unwrap();
        assert_eq!(g.board().piece_count(), 31);
        assert_eq!(g.board().piece_at(square!("A7")).unwrap().color, Color::White);
        assert_eq!(record.captured().unwrap().kind, PieceKind::Pawn);
    }

    #[test]
    fn test_apply_from_empty_square() {
        let mut g = GameState::standard_setup();
        assert_eq!(
            g.apply_move(square!("E4"), square!("E5"), false).unwrap_err(),
            ChessError::EmptySquare(square!("E4"))
        );
    }

    #[test]
    fn test_check() {
        let mut g = GameState::standard_setup();
        g.apply_move(square!("A2"), square!("D7"), false).unwrap();
        assert!(g.is_check(Color::Black).unwrap());
        assert!(!g.is_check(Color::White).unwrap());
        assert_eq!(g.status().unwrap(), GameStatus::Check);
    }

    #[test]
    fn test_checkmate() {
        let mut g = custom(
            &[
                (Color::Black, PieceKind::King, "H8"),
                (Color::White, PieceKind::Queen, "G7"),
                (Color::White, PieceKind::Rook, "G6"),
            ],
            Color::Black,
        );
        assert_eq!(g.board().piece_count(), 3);
        assert!(g.is_check(Color::Black).unwrap());
        assert!(g.is_checkmate(Color::Black).unwrap());
        assert!(!g.is_stalemate(Color::Black).unwrap());
        assert_eq!(g.status().unwrap(), GameStatus::Checkmate);

        // Only the side to move can be mated
        g.set_turn(Color::White);
        assert!(!g.is_checkmate(Color::Black).unwrap());
    }

    #[test]
    fn test_stalemate() {
        let mut g = custom(
            &[
                (Color::Black, PieceKind::King, "A8"),
                (Color::White, PieceKind::Queen, "B6"),
                (Color::White, PieceKind::King, "C1"),
            ],
            Color::Black,
        );
        assert!(!g.is_check(Color::Black).unwrap());
        assert!(g.is_stalemate(Color::Black).unwrap());
        assert!(!g.is_checkmate(Color::Black).unwrap());
        assert_eq!(g.status().unwrap(), GameStatus::Stalemate);
    }

    #[test]
    fn test_missing_king_is_an_error() {
        let g = custom(&[(Color::White, PieceKind::Rook, "A1")], Color::White);
        assert_eq!(
            g.is_check(Color::White),
            Err(ChessError::MissingKing(Color::White))
        );
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        let mut g = custom(
            &[
                (Color::White, PieceKind::King, "E1"),
                (Color::White, PieceKind::Rook, "E2"),
                (Color::Black, PieceKind::Rook, "E8"),
                (Color::Black, PieceKind::King, "A8"),
            ],
            Color::White,
        );
        let rook = g.board().piece_at(square!("E2")).unwrap();
        assert!(rook.moves().contains(&square!("D2")));
        assert!(!g.is_legal_move(Color::White, square!("E2"), square!("D2")).unwrap());
        assert!(g.is_legal_move(Color::White, square!("E2"), square!("E5")).unwrap());
        assert!(g.is_legal_move(Color::White, square!("E2"), square!("E8")).unwrap());
        let legal = g.get_all_legal_moves(Color::White).unwrap();
        assert!(legal
            .iter()
            .filter(|m| m.start == square!("E2"))
            .all(|m| m.end.file() == 4));
    }

    #[test]
    fn test_king_avoids_attacked_squares() {
        let g = custom(
            &[
                (Color::White, PieceKind::King, "E1"),
                (Color::Black, PieceKind::Rook, "D8"),
                (Color::Black, PieceKind::King, "A8"),
            ],
            Color::White,
        );
        let king = g.board().piece_at(square!("E1")).unwrap();
        assert!(!king.moves().contains(&square!("D1")));
        assert!(!king.moves().contains(&square!("D2")));
        assert!(king.moves().contains(&square!("F2")));
    }

    fn castle_position() -> GameState {
        custom(
            &[
                (Color::White, PieceKind::King, "E1"),
                (Color::White, PieceKind::Rook, "A1"),
                (Color::White, PieceKind::Rook, "H1"),
                (Color::Black, PieceKind::King, "E8"),
            ],
            Color::White,
        )
    }

    #[test]
    fn test_castle_candidates() {
        let g = castle_position();
        let king = g.board().piece_at(square!("E1")).unwrap();
        assert!(king.moves().contains(&square!("G1")));
        assert!(king.moves().contains(&square!("C1")));
    }

    #[test]
    fn test_castle_kingside() {
        let mut g = castle_position();
        assert_eq!(
            g.classify_move(square!("E1"), square!("G1")).unwrap(),
            MoveKind::Castle
        );
        g.play_move(square!("E1"), square!("G1")).unwrap();
        let king = g.board().piece_at(square!("G1")).unwrap();
        assert!(king.has_castled);
        let rook = g.board().piece_at(square!("F1")).unwrap();
        assert_eq!(rook.kind, PieceKind::Rook);
        assert!(rook.has_moved);
        assert!(g.board().is_empty(square!("H1")));
        assert!(g.board().is_empty(square!("E1")));
        assert_eq!(g.turn(), Color::Black);
    }

    #[test]
    fn test_castle_queenside() {
        let mut g = castle_position();
        g.play_move(square!("E1"), square!("C1")).unwrap();
        assert_eq!(
            g.board().piece_at(square!("D1")).unwrap().kind,
            PieceKind::Rook
        );
        assert!(g.board().is_empty(square!("A1")));
    }

    #[test]
    fn test_no_castle_after_king_moved() {
        let mut g = castle_position();
        g.apply_move(square!("E1"), square!("E2"), false).unwrap();
        g.apply_move(square!("E8"), square!("E7"), false).unwrap();
        g.apply_move(square!("E2"), square!("E1"), false).unwrap();
        let king = g.board().piece_at(square!("E1")).unwrap();
        assert!(!king.moves().contains(&square!("G1")));
        assert!(!king.moves().contains(&square!("C1")));
    }

    #[test]
    fn test_no_castle_through_attack() {
        let mut g = castle_position();
        g.add_piece(Color::Black, PieceKind::Rook, square!("F8")).unwrap();
        let king = g.board().piece_at(square!("E1")).unwrap();
        assert!(!king.moves().contains(&square!("G1")));
        assert!(king.moves().contains(&square!("C1")));
    }

    #[test]
    fn test_no_castle_through_occupied_square() {
        let mut g = castle_position();
        g.add_piece(Color::White, PieceKind::Knight, square!("G1")).unwrap();
        let king = g.board().piece_at(square!("E1")).unwrap();
        assert!(!king.moves().contains(&square!("G1")));
        assert!(king.moves().contains(&square!("C1")));

        let mut g = castle_position();
        g.add_piece(Color::White, PieceKind::Knight, square!("B1")).unwrap();
        let king = g.board().piece_at(square!("E1")).unwrap();
        assert!(!king.moves().contains(&square!("C1")));
        assert!(king.moves().contains(&square!("G1")));
        assert_eq!(
            g.apply_move(square!("E1"), square!("C1"), false).unwrap_err(),
            ChessError::CastleBlocked {
                start: square!("E1"),
                end: square!("C1")
            }
        );
        assert!(!g.is_legal_move(Color::White, square!("E1"), square!("C1")).unwrap());
    }

    #[test]
    fn test_castle_rechecked_on_apply() {
        let mut g = custom(
            &[
                (Color::White, PieceKind::King, "E1"),
                (Color::Black, PieceKind::King, "E8"),
            ],
            Color::White,
        );
        let before = g.clone();
        assert_eq!(
            g.apply_move(square!("E1"), square!("G1"), false).unwrap_err(),
            ChessError::CastleBlocked {
                start: square!("E1"),
                end: square!("G1")
            }
        );
        assert_eq!(g, before);
    }

    #[test]
    fn test_promotion() {
        let mut g = custom(
            &[
                (Color::White, PieceKind::Pawn, "B7"),
                (Color::White, PieceKind::King, "E1"),
                (Color::Black, PieceKind::King, "H5"),
            ],
            Color::White,
        );
        let count = g.board().piece_count();
        g.play_move(square!("B7"), square!("B8")).unwrap();
        let q = g.board().piece_at(square!("B8")).unwrap();
        assert_eq!(q.kind, PieceKind::Queen);
        assert_eq!(q.color, Color::White);
        assert_eq!(g.board().piece_count(), count);
    }

    #[test]
    fn test_undo_restores_position() {
        let mut g = GameState::standard_setup();
        g.play_move(square!("E2"), square!("E4")).unwrap();
        let before = g.clone();

        let r1 = g.apply_move(square!("D7"), square!("D5"), false).unwrap();
        let r2 = g.apply_move(square!("E4"), square!("D5"), false).unwrap();
        let r3 = g.apply_move(square!("D8"), square!("D5"), true).unwrap();
        assert_eq!(g.history_token(), "E2E4D7D5E4D5");
        g.undo_move(r3);
        g.undo_move(r2);
        g.undo_move(r1);
        assert_eq!(g, before);
    }

    #[test]
    fn test_undo_castle_and_promotion() {
        let mut g = castle_position();
        g.add_piece(Color::White, PieceKind::Pawn, square!("C7")).unwrap();
        let before = g.clone();
        let r1 = g.apply_move(square!("E1"), square!("G1"), false).unwrap();
        let r2 = g.apply_move(square!("E8"), square!("F7"), false).unwrap();
        let r3 = g.apply_move(square!("C7"), square!("C8"), false).unwrap();
        assert_eq!(r3.kind, MoveKind::Promotion);
        g.undo_move(r3);
        g.undo_move(r2);
        g.undo_move(r1);
        assert_eq!(g, before);
    }

    #[test]
    fn test_trial_move_keeps_turn_and_history() {
        let mut g = GameState::standard_setup();
        let record = g.apply_move(square!("G1"), square!("F3"), true).unwrap();
        assert_eq!(g.turn(), Color::White);
        assert!(g.history().is_empty());
        g.undo_move(record);
        assert_eq!(g, GameState::standard_setup());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut g = GameState::standard_setup();
        let key = g.history_token();
        g.save_snapshot(&key);
        let before = g.clone();
        g.play_move(square!("B1"), square!("C3")).unwrap();
        g.play_move(square!("E7"), square!("E5")).unwrap();
        g.restore_snapshot(&key).unwrap();
        assert_eq!(g, before);
        assert_eq!(g.turn(), Color::White);
        assert!(g.board().is_empty(square!("C3")));
    }

    #[test]
    fn test_restore_unknown_snapshot() {
        let mut g = GameState::standard_setup();
        assert_eq!(
            g.restore_snapshot("A2A4"),
            Err(ChessError::UnknownSnapshot("A2A4".to_string()))
        );
        g.save_snapshot("A2A4");
        g.discard_snapshots();
        assert!(g.restore_snapshot("A2A4").is_err());
    }

    #[test]
    fn test_score_take_pawn() {
        let g = custom(
            &[
                (Color::Black, PieceKind::Pawn, "C3"),
                (Color::White, PieceKind::Queen, "C1"),
            ],
            Color::White,
        );
        assert_eq!(g.score_move(Color::White, square!("C1"), square!("C3")), 1);
    }

    #[test]
    fn test_score_queen_escape() {
        let g = custom(
            &[
                (Color::Black, PieceKind::Pawn, "C3"),
                (Color::White, PieceKind::Queen, "B2"),
            ],
            Color::White,
        );
        assert_eq!(g.score_move(Color::White, square!("B2"), square!("B3")), 9);
    }

    #[test]
    fn test_score_rook_threatened() {
        let g = custom(
            &[
                (Color::White, PieceKind::Pawn, "A3"),
                (Color::Black, PieceKind::Rook, "B8"),
            ],
            Color::Black,
        );
        assert_eq!(g.score_move(Color::Black, square!("B8"), square!("B4")), -5);
    }
}
