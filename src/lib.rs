#[macro_use]
extern crate impl_ops;

pub mod agents;
pub mod algorithms;
pub mod attacks;
pub mod boards;
pub mod chess_errors;
pub mod game;
pub mod game_state;
pub mod moves;
pub mod pieces;
pub mod positions;
pub mod utils;
