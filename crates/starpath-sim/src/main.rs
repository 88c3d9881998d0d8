//! Headless simulation harness for Starpath.
//!
//! Plays a complete game with simple scripted players and prints the final
//! standings as JSON. Useful for balancing the economy and for checking that
//! long games never wedge the turn engine.
//!
//! ```text
//! starpath-sim --seed 7 --players 3 --size 8x6
//! RUST_LOG=starpath_core=debug starpath-sim --settings hard.json
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starpath_core::{
    Board, BoardLayout, GameSettings, GameState, PlayerProfile, StockMarket, TileKind, TurnPhase,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for a simulated game.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// JSON settings file. Missing fields take their defaults.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
    /// JSON board layout file. A loop track is generated when absent.
    #[arg(long, value_name = "FILE")]
    board: Option<PathBuf>,
    /// Loop track dimensions expressed as WIDTHxHEIGHT.
    #[arg(short = 's', long = "size", value_name = "WIDTHxHEIGHT", default_value = "8x6")]
    size: TrackSize,
    /// Number of players, overriding the settings file.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=8))]
    players: Option<u8>,
    /// Rounds to play, overriding the settings file.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    rounds: Option<u32>,
    /// Seed for every random draw in the game.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Loop track dimensions parsed from a WIDTHxHEIGHT argument.
#[derive(Clone, Copy, Debug)]
struct TrackSize {
    width: u32,
    height: u32,
}

impl FromStr for TrackSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (width, height) = value
            .split_once(['x', 'X'])
            .ok_or_else(|| "expected format WIDTHxHEIGHT".to_string())?;
        let width: u32 = width
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{width}'"))?;
        let height: u32 = height
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{height}'"))?;
        if width < 2 || height < 2 {
            return Err("track must be at least 2x2".to_string());
        }
        Ok(Self { width, height })
    }
}

fn load_settings(args: &CliArgs) -> Result<GameSettings, Box<dyn std::error::Error>> {
    let mut settings = match &args.settings {
        Some(path) => GameSettings::from_json(&std::fs::read_to_string(path)?)?,
        None => GameSettings::new("Simulation".to_string()),
    };
    if let Some(players) = args.players {
        settings.player_count = usize::from(players);
    }
    if let Some(rounds) = args.rounds {
        settings.max_rounds = rounds;
    }
    settings.validate()?;
    Ok(settings)
}

fn load_board(args: &CliArgs) -> Result<Board, Box<dyn std::error::Error>> {
    let layout = match &args.board {
        Some(path) => BoardLayout::from_json(&std::fs::read_to_string(path)?)?,
        None => BoardLayout::loop_track(args.size.width, args.size.height),
    };
    Ok(Board::build(&layout)?)
}

/// Pick a destination: an unclaimed star if one is in reach, otherwise the
/// first tile offered.
fn choose_destination(game: &GameState) -> Option<starpath_core::Coord> {
    let destinations = game.reachable_destinations();
    destinations
        .iter()
        .find(|c| {
            game.board
                .get(c)
                .is_some_and(|t| t.kind == TileKind::Star { has_star: true })
        })
        .or_else(|| destinations.first())
        .copied()
}

/// Drive one scripted action. Returns false once the game is over.
fn play_step(game: &mut GameState, rng: &mut StdRng) -> Result<bool, Box<dyn std::error::Error>> {
    match game.phase {
        TurnPhase::GameOver => return Ok(false),
        TurnPhase::AwaitingRoll => {
            let player = game.current();
            if player.rolls_remaining == 0 {
                game.advance_turn(rng)?;
                return Ok(true);
            }
            // Keep a cash buffer for stars
            if player.money > 300 && rng.gen_bool(0.5) {
                let ticker = ["BANK", "SOLR", "RAIL", "DRGN", "MOON"][rng.gen_range(0..5)];
                if let Ok(cost) = game.buy_shares(ticker, 1) {
                    debug!(player = game.current_player, ticker, cost, "Bought share");
                }
            }
            game.roll(rng)?;
        }
        TurnPhase::AwaitingDestination { .. } => match choose_destination(game) {
            Some(dest) => {
                game.commit_move(dest, rng)?;
            }
            None => game.advance_turn(rng)?,
        },
        TurnPhase::Resolving => {
            let reward = rng.gen_range(0..=50);
            game.finish_challenge(reward, rng)?;
        }
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let settings = load_settings(&args)?;
    let board = load_board(&args)?;
    info!(
        players = settings.player_count,
        rounds = settings.max_rounds,
        tiles = board.tile_count(),
        seed = args.seed,
        "configuration loaded"
    );

    let profiles: Vec<PlayerProfile> = (1..=settings.player_count)
        .map(|i| PlayerProfile::new(format!("Bot {i}")))
        .collect();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut game = GameState::new(settings, board, &profiles, StockMarket::standard()?, &mut rng)?;

    let mut actions = 0u64;
    while play_step(&mut game, &mut rng)? {
        actions += 1;
    }
    info!(actions, turns = game.turn, "simulation finished");

    println!("{}", serde_json::to_string_pretty(&game.final_standings())?);
    Ok(())
}
