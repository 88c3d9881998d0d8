//! Notifications produced by game commands.
//!
//! Every command on [`GameState`](crate::game_state::GameState) clears the
//! event log and records what happened while it ran, in order. The UI layer
//! drains the log to animate and announce changes; the engine never reads it
//! back.

use crate::effects::{EffectResult, PenaltyOutcome};
use crate::types::{Coord, PlayerId};
use serde::{Deserialize, Serialize};

/// Something that happened during a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player rolled the dice.
    Rolled { player: PlayerId, distance: u32 },
    /// A roll led nowhere; the player stays put.
    NoMoves { player: PlayerId, distance: u32 },
    /// A player used a free-movement item.
    Teleporting { player: PlayerId },
    /// A player moved to a new tile.
    Moved {
        player: PlayerId,
        from: Coord,
        to: Coord,
    },
    /// A tile effect ran.
    Landed {
        player: PlayerId,
        tile: Coord,
        effect: EffectResult,
    },
    /// A penalty was charged to every player.
    GlobalPenalty {
        amount: i64,
        outcomes: Vec<PenaltyOutcome>,
    },
    /// A player finished a minigame.
    ChallengeFinished { player: PlayerId, reward: i64 },
    /// A frozen player's turn was skipped.
    FrozenSkipped { player: PlayerId },
    /// It is now this player's turn.
    TurnStarted { player: PlayerId, turn: u32 },
    /// A full round of turns completed.
    RoundCompleted { round: u32 },
    /// Every player's level was raised (where below the cap).
    LevelUp { round: u32 },
    /// Stocks moved and dividends were paid.
    MarketUpdated { dividends_paid: i64 },
    /// A star appeared on a tile.
    StarPlaced { tile: Coord },
    /// A spent star tile went back to normal.
    StarRemoved { tile: Coord },
    /// The game is over.
    GameOver { rounds: u32 },
}
