//! Starpath Core Library
//!
//! This crate contains the core game logic for Starpath, a turn-based party
//! board game. Players roll dice, walk a tile graph, collect stars and trade
//! shares in a small stock market between rounds.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: Rendering, minigames and menus live elsewhere
//! - **Deterministic**: All randomness comes from a caller-supplied `Rng`
//! - **Serializable**: All state can be saved/loaded via serde
//! - **Atomic commands**: A rejected command leaves the game untouched

// Core modules
pub mod board;
pub mod types;

// Movement
pub mod pathfinding;

// Game state modules
pub mod effects;
pub mod game_state;
pub mod player;
pub mod settings;

// Stock market
pub mod market;

// Notifications for the UI layer
pub mod events;

// Re-exports for convenience
pub use board::{Board, BoardError, BoardLayout, Tile, TileKind, TileSpec};
pub use effects::{apply_effect, apply_penalty, EffectResult, PenaltyOutcome};
pub use events::GameEvent;
pub use game_state::{GameError, GameState, MoveOutcome, Standing, TurnPhase};
pub use market::{DividendTier, MarketError, Stock, StockMarket, StockMove, Tuning};
pub use pathfinding::{reachable, Path, PathError};
pub use player::{LevelOutOfRange, Player, PlayerProfile, PlayerView};
pub use settings::{Difficulty, Economy, GameSettings, SettingsError};
pub use types::*;
