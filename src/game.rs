use crate::agents::*;
use crate::chess_errors::*;
use crate::game_state::*;
use crate::pieces::*;
use tracing::{info, warn};

/// How often an AI player may hand in a rejected move before the match is aborted.
const MAX_AI_RETRIES: usize = 3;

pub const DEFAULT_MAX_PLIES: usize = 300;

/// How a match ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: GameStatus,
    /// Only set on checkmate
    pub winner: Option<Color>,
    pub plies: usize,
    pub history: String,
}

/// Two players taking turns on one game state.
pub struct Game {
    white: Player,
    black: Player,
    state: GameState,
    max_plies: usize,
}

impl Game {
    pub fn new(white: Player, black: Player) -> Game {
        Game::with_state(white, black, GameState::standard_setup())
    }

    /// Starts from a custom position. The side to move is taken from `state`.
    pub fn with_state(white: Player, black: Player, state: GameState) -> Game {
        debug_assert_eq!(white.color(), Color::White);
        debug_assert_eq!(black.color(), Color::Black);
        Game {
            white,
            black,
            state,
            max_plies: DEFAULT_MAX_PLIES,
        }
    }

    pub fn max_plies(mut self, max_plies: usize) -> Game {
        self.max_plies = max_plies;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Plays until checkmate, stalemate or the ply limit.
    pub fn play(&mut self) -> ChessResult<Outcome> {
        let mut status = self.state.status()?;
        let mut plies = 0;
        while !status.is_terminal() && plies < self.max_plies {
            status = self.play_turn()?;
            plies += 1;
        }

        let winner = match status {
            GameStatus::Checkmate => Some(self.state.turn().opposite()),
            _ => None,
        };
        match winner {
            Some(color) => info!(%color, plies, "checkmate"),
            None => info!(%status, plies, "game over"),
        }
        Ok(Outcome {
            status,
            winner,
            plies,
            history: self.state.history_token(),
        })
    }

    fn play_turn(&mut self) -> ChessResult<GameStatus> {
        let color = self.state.turn();
        let player = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };

        let mut rejected = 0;
        loop {
            let mv = player.choose_move(&mut self.state)?;
            match self.state.play_move(mv.start, mv.end) {
                Ok(status) => {
                    info!(%color, %mv, %status, "move played");
                    return Ok(status);
                }
                Err(e) if e.is_rejection() && (player.is_human() || rejected < MAX_AI_RETRIES) => {
                    rejected += 1;
                    warn!(%color, %mv, error = %e, "move rejected");
                    if player.is_human() {
                        println!("{}, please try again", e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
