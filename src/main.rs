use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use board_tracker::config::{BoardConfig, StartPosition};
use board_tracker::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "board-tracker", version, about = "Click-driven chess board in the terminal")]
struct Args {
    /// Board edge length in pixels, used to map `click X Y`
    #[arg(long, default_value_t = 500)]
    size: u32,

    /// Start from a placement string instead of the standard position
    #[arg(long, conflicts_with = "fen")]
    placement: Option<String>,

    /// Start from a FEN record
    #[arg(long)]
    fen: Option<String>,

    /// Ignore all clicks
    #[arg(long)]
    inactive: bool,

    /// Play this many random legal moves, print the result and exit
    #[arg(long, conflicts_with = "inactive")]
    random_moves: Option<usize>,

    #[arg(long, requires = "random_moves")]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> BoardConfig {
        let start = match (&self.placement, &self.fen) {
            (Some(placement), _) => StartPosition::Placement(placement.clone()),
            (None, Some(fen)) => StartPosition::Fen(fen.clone()),
            (None, None) => StartPosition::Standard,
        };
        BoardConfig {
            size_px: self.size,
            active: !self.inactive,
            start,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut shell = Shell::new(args.config())?;

    match args.random_moves {
        Some(count) => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            print!("{}", shell.play_random(count, &mut rng)?);
            Ok(())
        }
        None => shell.run(),
    }
}
