use chess_ai::agents::{Player, Strategy};
use chess_ai::algorithms::SearchConfig;
use chess_ai::game::{Game, DEFAULT_MAX_PLIES};
use chess_ai::pieces::Color;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Plays a game of chess between two players, human or computer.
#[derive(Parser, Debug)]
#[command(name = "chess-ai", version)]
struct Args {
    /// Who plays white
    #[arg(long, value_enum, default_value_t = Strategy::Human)]
    white: Strategy,

    /// Who plays black
    #[arg(long, value_enum, default_value_t = Strategy::Minimax)]
    black: Strategy,

    /// Search depth in plies for minimax players
    #[arg(long, default_value_t = 3)]
    depth: u16,

    /// Maximum nodes per search
    #[arg(long)]
    node_budget: Option<u64>,

    /// Maximum milliseconds per search
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// Stop the game after this many plies
    #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
    max_plies: usize,

    /// Seed for the random and greedy players
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = SearchConfig {
        depth: args.depth,
        node_budget: args.node_budget,
        time_budget: args.time_budget_ms.map(Duration::from_millis),
        ..SearchConfig::default()
    };
    // Different seeds per side, so two random players do not mirror each other
    let white = Player::new(Color::White, args.white, &config, args.seed);
    let black = Player::new(Color::Black, args.black, &config, args.seed.map(|s| s.wrapping_add(1)));

    let mut game = Game::new(white, black).max_plies(args.max_plies);
    match game.play() {
        Ok(outcome) => {
            println!("{}", game.state());
            match outcome.winner {
                Some(color) => println!("Checkmate, {} wins after {} plies", color, outcome.plies),
                None => println!("Game ended ({}) after {} plies", outcome.status, outcome.plies),
            }
            println!("History: {}", outcome.history);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "game aborted");
            println!("{:?}", game.state());
            ExitCode::FAILURE
        }
    }
}
