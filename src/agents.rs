/// Differing kinds of agents that can play the game
use crate::algorithms::*;
use crate::chess_errors::*;
use crate::game_state::GameState;
use crate::moves::Move;
use crate::pieces::Color;
use crate::positions::Square;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::{stdin, stdout, Read, Write};
use text_io::try_read;
use tracing::debug;

/// An agent is an object that can play chess by choosing moves appropriate to a
/// current game state. The move returned is legal in that state.
pub trait Agent {
    fn choose_move(&mut self, state: &mut GameState) -> ChessResult<Move>;
}

fn check_turn(color: Color, state: &GameState) -> ChessResult<()> {
    if state.turn() != color {
        return Err(ChessError::WrongTurn(color));
    }
    Ok(())
}

fn rng_from(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    }
}

/// Reads moves as two squares, e.g. "e2 e4", from a byte source (stdin by default).
pub struct HumanAgent {
    color: Color,
    input: Box<dyn Iterator<Item = u8>>,
}

impl HumanAgent {
    pub fn new(color: Color) -> Self {
        HumanAgent::with_input(color, stdin().bytes().map_while(Result::ok))
    }

    pub fn with_input(color: Color, input: impl Iterator<Item = u8> + 'static) -> Self {
        HumanAgent {
            color,
            input: Box::new(input),
        }
    }

    fn read_token(&mut self, prompt: &str) -> ChessResult<String> {
        print!("{}", prompt);
        stdout().flush().ok();
        let token: String =
            try_read!("{}", self.input).map_err(|e| ChessError::Input(format!("{:?}", e)))?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(ChessError::Input("end of input".to_string()));
        }
        Ok(token)
    }
}

impl Agent for HumanAgent {
    fn choose_move(&mut self, state: &mut GameState) -> ChessResult<Move> {
        check_turn(self.color, state)?;
        println!("{}", state);
        loop {
            println!("Your turn ({}): ", self.color);
            let from = self.read_token("From: ")?;
            let to = self.read_token("To: ")?;
            match (from.parse::<Square>(), to.parse::<Square>()) {
                (Ok(start), Ok(end)) => return Ok(Move::new(start, end)),
                (Err(e), _) | (_, Err(e)) => println!("{}, please try again", e),
            }
        }
    }
}

/// Picks uniformly among the legal moves.
pub struct RandomAgent {
    color: Color,
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(color: Color, seed: Option<u64>) -> Self {
        RandomAgent {
            color,
            rng: rng_from(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn choose_move(&mut self, state: &mut GameState) -> ChessResult<Move> {
        check_turn(self.color, state)?;
        let moves = state.get_all_legal_moves(self.color)?;
        moves
            .choose(&mut self.rng)
            .copied()
            .ok_or(ChessError::NoLegalMoves(self.color))
    }
}

/// Scores every legal move one ply deep and picks uniformly among the best.
pub struct GreedyAgent {
    color: Color,
    rng: SmallRng,
}

impl GreedyAgent {
    pub fn new(color: Color, seed: Option<u64>) -> Self {
        GreedyAgent {
            color,
            rng: rng_from(seed),
        }
    }

    /// All legal moves sharing the highest one-ply score.
    pub fn best_moves(&self, state: &mut GameState) -> ChessResult<Vec<Move>> {
        let mut best_moves = Vec::new();
        let mut best_points = i32::MIN;
        for mv in state.get_all_legal_moves(self.color)? {
            let points = state.score_move(self.color, mv.start, mv.end);
            if points > best_points {
                best_points = points;
                best_moves.clear();
                best_moves.push(mv);
            } else if points == best_points {
                best_moves.push(mv);
            }
        }
        Ok(best_moves)
    }
}

impl Agent for GreedyAgent {
    fn choose_move(&mut self, state: &mut GameState) -> ChessResult<Move> {
        check_turn(self.color, state)?;
        let best_moves = self.best_moves(state)?;
        best_moves
            .choose(&mut self.rng)
            .copied()
            .ok_or(ChessError::NoLegalMoves(self.color))
    }
}

/// Alpha-beta search over the static evaluation.
pub struct MinimaxAgent {
    color: Color,
    config: SearchConfig,
}

impl MinimaxAgent {
    pub fn new(color: Color, config: SearchConfig) -> Self {
        MinimaxAgent { color, config }
    }
}

impl AlphaBetaSearch for MinimaxAgent {
    fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl Agent for MinimaxAgent {
    fn choose_move(&mut self, state: &mut GameState) -> ChessResult<Move> {
        check_turn(self.color, state)?;
        let key = state.history_token();
        state.save_snapshot(&key);
        let outcome = self.alphabeta(state);
        state.restore_snapshot(&key)?;
        state.discard_snapshots();

        let outcome = outcome?;
        debug!(
            color = %self.color,
            best = %outcome.best,
            score = outcome.score,
            nodes = outcome.nodes,
            completed = outcome.completed,
            "minimax chose move"
        );
        Ok(outcome.best)
    }
}

/// Names the move-selection policies a player can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    Human,
    Random,
    Greedy,
    Minimax,
}

pub enum PlayerKind {
    Human(HumanAgent),
    Random(RandomAgent),
    Greedy(GreedyAgent),
    Minimax(MinimaxAgent),
}

/// Binds a color to one way of choosing moves, fixed at construction.
pub struct Player {
    color: Color,
    kind: PlayerKind,
}

impl Player {
    pub fn new(color: Color, strategy: Strategy, config: &SearchConfig, seed: Option<u64>) -> Self {
        let kind = match strategy {
            Strategy::Human => PlayerKind::Human(HumanAgent::new(color)),
            Strategy::Random => PlayerKind::Random(RandomAgent::new(color, seed)),
            Strategy::Greedy => PlayerKind::Greedy(GreedyAgent::new(color, seed)),
            Strategy::Minimax => PlayerKind::Minimax(MinimaxAgent::new(color, config.clone())),
        };
        Player { color, kind }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, PlayerKind::Human(_))
    }
}

impl Agent for Player {
    fn choose_move(&mut self, state: &mut GameState) -> ChessResult<Move> {
        match &mut self.kind {
            PlayerKind::Human(a) => a.choose_move(state),
            PlayerKind::Random(a) => a.choose_move(state),
            PlayerKind::Greedy(a) => a.choose_move(state),
            PlayerKind::Minimax(a) => a.choose_move(state),
        }
    }
}
