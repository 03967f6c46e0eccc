use crate::chess_errors::*;
use crate::game_state::*;
use crate::moves::Move;
use crate::pieces::*;
use crate::positions::Square;
use std::cmp::Reverse;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const DEFAULT_DEPTH: u16 = 3;

/// Weights of the static evaluation terms, on top of material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalWeights {
    /// Per candidate move of a piece
    pub mobility: f64,
    /// For a king that has castled
    pub castled: f64,
    /// Per center square a piece attacks
    pub center: f64,
    /// Score of a checkmate
    pub mate: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            mobility: 0.1,
            castled: 0.5,
            center: 0.2,
            mate: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Plies searched from the root
    pub depth: u16,
    /// Maximum number of nodes visited per search
    pub node_budget: Option<u64>,
    /// Wall-clock budget per search
    pub time_budget: Option<Duration>,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: DEFAULT_DEPTH,
            node_budget: None,
            time_budget: None,
            weights: EvalWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best: Move,
    pub score: f64,
    pub nodes: u64,
    /// False if the search ran out of budget before finishing
    pub completed: bool,
}

/// Counts nodes and watches the clock for one search.
#[derive(Debug)]
pub struct SearchBudget {
    nodes: u64,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    expired: bool,
}

impl SearchBudget {
    pub fn new(config: &SearchConfig) -> Self {
        SearchBudget {
            nodes: 0,
            node_limit: config.node_budget,
            deadline: config.time_budget.map(|d| Instant::now() + d),
            expired: false,
        }
    }

    /// Counts a node. Returns false once the budget is used up.
    pub fn tick(&mut self) -> bool {
        if self.expired {
            return false;
        }
        self.nodes += 1;
        let over_nodes = self.node_limit.map_or(false, |l| self.nodes > l);
        let over_time = self.deadline.map_or(false, |d| Instant::now() >= d);
        if over_nodes || over_time {
            warn!(nodes = self.nodes, "search budget expired");
            self.expired = true;
        }
        !self.expired
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn expired(&self) -> bool {
        self.expired
    }
}

// ---------------------------------------------
// Static evaluation
// ---------------------------------------------

fn is_center(sq: Square) -> bool {
    (3..=4).contains(&sq.file()) && (4..=5).contains(&sq.rank())
}

fn piece_score(p: &Piece, w: &EvalWeights) -> f64 {
    let mut s = p.value() as f64 + w.mobility * p.moves().len() as f64;
    if p.has_castled {
        s += w.castled;
    }
    let center = p.attacks().iter().filter(|&&sq| is_center(sq)).count();
    s + w.center * center as f64
}

/// Material, mobility, castling and center control, positive when good for `perspective`.
pub fn static_score(game: &GameState, perspective: Color, w: &EvalWeights) -> f64 {
    game.board()
        .pieces()
        .map(|p| {
            let sign = if p.color == perspective { 1.0 } else { -1.0 };
            sign * piece_score(p, w)
        })
        .sum()
}

/// Static evaluation with a terminal shortcut: a checkmated side to move scores
/// `-mate` if it is `perspective`, `+mate` otherwise. Any other position,
/// stalemate included, gets the summed `static_score`.
pub fn evaluate(game: &mut GameState, perspective: Color, w: &EvalWeights) -> ChessResult<f64> {
    let to_move = game.turn();
    match game.status()? {
        GameStatus::Checkmate if to_move == perspective => Ok(-w.mate),
        GameStatus::Checkmate => Ok(w.mate),
        GameStatus::Ongoing | GameStatus::Check | GameStatus::Stalemate => {
            Ok(static_score(game, perspective, w))
        }
    }
}

// ---------------------------------------------
// Search
// ---------------------------------------------

/// Depth-limited minimax with alpha-beta pruning.
///
/// Every probe is applied with `apply_move` and taken back with `undo_move`
/// on all return paths, including cut-offs, so the game is left as found.
pub trait AlphaBetaSearch {
    fn config(&self) -> &SearchConfig;

    fn score(&self, game: &mut GameState, perspective: Color) -> ChessResult<f64> {
        evaluate(game, perspective, &self.config().weights)
    }

    /// Legal moves of the side to move, best one-ply score first.
    /// Ties keep board order, so the search is deterministic.
    fn ordered_moves(&self, game: &mut GameState) -> ChessResult<Vec<Move>> {
        let color = game.turn();
        let mut moves = game.get_all_legal_moves(color)?;
        moves.sort_by_cached_key(|m| Reverse(game.score_move(color, m.start, m.end)));
        Ok(moves)
    }

    fn alphabeta(&self, game: &mut GameState) -> ChessResult<SearchOutcome> {
        let perspective = game.turn();
        let depth = self.config().depth.max(1);
        let mut budget = SearchBudget::new(self.config());
        budget.tick();

        let moves = self.ordered_moves(game)?;
        let mut best = *moves
            .first()
            .ok_or(ChessError::NoLegalMoves(perspective))?;
        let mut best_val = f64::NEG_INFINITY;
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;

        for mv in moves {
            let record = game.apply_move(mv.start, mv.end, false)?;
            let move_val = self.alphabeta_helper(game, &mut budget, depth - 1, alpha, beta, perspective);
            game.undo_move(record);
            let move_val = move_val?;

            if move_val > best_val {
                best_val = move_val;
                best = mv;
            }
            alpha = alpha.max(best_val);
            if budget.expired() {
                break;
            }
        }

        debug!(
            best = %best,
            score = best_val,
            nodes = budget.nodes(),
            depth,
            "search finished"
        );
        Ok(SearchOutcome {
            best,
            score: best_val,
            nodes: budget.nodes(),
            completed: !budget.expired(),
        })
    }

    #[doc(hidden)]
    fn alphabeta_helper(
        &self,
        game: &mut GameState,
        budget: &mut SearchBudget,
        depth: u16,
        alpha: f64,
        beta: f64,
        perspective: Color,
    ) -> ChessResult<f64> {
        if !budget.tick() || depth == 0 {
            return self.score(game, perspective);
        }

        let moves = self.ordered_moves(game)?;
        // Checkmate or stalemate
        if moves.is_empty() {
            return self.score(game, perspective);
        }

        let maximizing = game.turn() == perspective;
        let mut alpha_ = alpha;
        let mut beta_ = beta;
        let mut val;
        if maximizing {
            val = f64::NEG_INFINITY;
            for mv in moves {
                let record = game.apply_move(mv.start, mv.end, false)?;
                let child = self.alphabeta_helper(game, budget, depth - 1, alpha_, beta_, perspective);
                game.undo_move(record);
                val = val.max(child?);
                alpha_ = alpha_.max(val);
                if alpha_ >= beta_ {
                    trace!(depth, "beta cut-off");
                    break;
                }
            }
        } else {
            val = f64::INFINITY;
            for mv in moves {
                let record = game.apply_move(mv.start, mv.end, false)?;
                let child = self.alphabeta_helper(game, budget, depth - 1, alpha_, beta_, perspective);
                game.undo_move(record);
                val = val.min(child?);
                beta_ = beta_.min(val);
                if alpha_ >= beta_ {
                    trace!(depth, "alpha cut-off");
                    break;
                }
            }
        }
        Ok(val)
    }
}
