//! Root game state and the turn engine.
//!
//! A turn moves through three phases:
//!
//! ```text
//! AwaitingRoll -> AwaitingDestination -> (Resolving) -> AwaitingRoll of next player
//!                                                     \-> GameOver
//! ```
//!
//! `Resolving` is only entered when a tile hands control to an external
//! minigame. Commands that fail return an error and leave the state as it was.

use crate::board::{Board, BoardError, TileKind};
use crate::effects::{apply_effect, apply_penalty, EffectResult, PenaltyOutcome};
use crate::events::GameEvent;
use crate::market::{MarketError, StockMarket};
use crate::pathfinding::{all_other_tiles, destinations, reachable, PathError};
use crate::player::{LevelOutOfRange, Player, PlayerProfile, PlayerView};
use crate::settings::{GameSettings, SettingsError};
use crate::types::{Coord, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The complete state of a game at any point in time.
///
/// Holds only plain data so it can be snapshotted with serde at any point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Game configuration (immutable after start).
    pub settings: GameSettings,
    /// All players, in turn order.
    pub players: Vec<Player>,
    /// Index of the player whose turn it is.
    pub current_player: PlayerId,
    /// Turns taken so far (starts at 0).
    pub turn: u32,
    /// The board.
    pub board: Board,
    /// Listed stocks.
    pub market: StockMarket,
    /// Where the current turn stands.
    pub phase: TurnPhase,
    /// Distance of the most recent roll this turn.
    pub last_roll: Option<u32>,
    /// What the last command did.
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Set up a new game. The first player is ready to roll.
    pub fn new(
        settings: GameSettings,
        board: Board,
        profiles: &[PlayerProfile],
        market: StockMarket,
        rng: &mut impl Rng,
    ) -> Result<Self, GameError> {
        settings.validate()?;
        if profiles.len() != settings.player_count {
            return Err(GameError::ProfileCountMismatch {
                expected: settings.player_count,
                got: profiles.len(),
            });
        }
        board.validate()?;

        let start = settings
            .start_tile
            .or_else(|| board.first_coord())
            .ok_or(BoardError::EmptyLayout)?;
        board.tile(&start)?;

        let players = profiles
            .iter()
            .map(|p| Player::from_profile(p, start, settings.starting_money, settings.max_level))
            .collect::<Result<Vec<_>, _>>()?;

        let mut game = Self {
            settings,
            players,
            current_player: 0,
            turn: 0,
            board,
            market,
            phase: TurnPhase::AwaitingRoll,
            last_roll: None,
            events: Vec::new(),
        };
        game.players[0].begin_turn();
        game.place_star(rng);
        game.events.push(GameEvent::TurnStarted { player: 0, turn: 0 });
        info!(players = game.players.len(), %start, "Game started");
        Ok(game)
    }

    /// Restore a game from a JSON snapshot.
    ///
    /// Settings, board, market and players are validated as for a new game.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let game: Self =
            serde_json::from_str(json).map_err(|e| GameError::Snapshot(e.to_string()))?;
        game.settings.validate()?;
        game.board.validate()?;
        game.market.validate()?;
        if game.players.len() != game.settings.player_count {
            return Err(GameError::ProfileCountMismatch {
                expected: game.settings.player_count,
                got: game.players.len(),
            });
        }
        if game.current_player >= game.players.len() {
            return Err(GameError::Snapshot(format!(
                "current player {} out of range for {} players",
                game.current_player,
                game.players.len()
            )));
        }
        for player in &game.players {
            if player.level > game.settings.max_level {
                return Err(LevelOutOfRange {
                    level: player.level,
                    max: game.settings.max_level,
                }
                .into());
            }
            game.board.tile(&player.tile)?;
        }
        Ok(game)
    }

    /// Snapshot the game as JSON.
    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    /// The current round, starting at 1.
    pub fn round(&self) -> u32 {
        self.completed_rounds() + 1
    }

    /// Rounds in which every player has had a turn.
    pub fn completed_rounds(&self) -> u32 {
        self.turn / self.players.len() as u32
    }

    /// Check if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.phase == TurnPhase::GameOver
    }

    /// The player whose turn it is.
    pub fn current(&self) -> &Player {
        &self.players[self.current_player]
    }

    /// Presentation summary of the current player.
    pub fn current_player(&self) -> PlayerView {
        self.current().view()
    }

    /// Distinct tiles the current player may move to.
    pub fn reachable_destinations(&self) -> Vec<Coord> {
        destinations(&self.current().reachable)
    }

    fn ensure_not_over(&self) -> Result<(), GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::GameOver => Err(GameError::GameOver),
            TurnPhase::Resolving => Err(GameError::ChallengePending),
            _ => Ok(()),
        }
    }

    /// Roll the dice for the current player and work out where they can go.
    pub fn roll(&mut self, rng: &mut impl Rng) -> Result<u32, GameError> {
        self.ensure_active()?;
        if let TurnPhase::AwaitingDestination { .. } = self.phase {
            return Err(GameError::MovePending);
        }
        let idx = self.current_player;
        let player = &self.players[idx];
        if player.rolls_remaining == 0 {
            return Err(GameError::NoRollsLeft);
        }

        let dice = player.dice.max(1);
        let distance: u32 = (0..dice)
            .map(|_| rng.gen_range(1..=self.settings.die_sides))
            .sum();

        let mut paths = reachable(&self.board, player.tile, distance, player.previous_tile)?;
        if paths.is_empty() && player.previous_tile.is_some() {
            // Dead end ahead: allow turning back
            paths = reachable(&self.board, player.tile, distance, None)?;
        }

        self.events.clear();
        let player = &mut self.players[idx];
        player.rolls_remaining -= 1;
        player.dice = 1;
        self.last_roll = Some(distance);
        self.events.push(GameEvent::Rolled {
            player: idx,
            distance,
        });

        if paths.is_empty() {
            debug!(player = idx, distance, "Roll has no destinations");
            self.events.push(GameEvent::NoMoves {
                player: idx,
                distance,
            });
            self.phase = TurnPhase::AwaitingRoll;
        } else {
            debug!(player = idx, distance, paths = paths.len(), "Rolled");
            player.reachable = paths;
            self.phase = TurnPhase::AwaitingDestination { distance };
        }
        Ok(distance)
    }

    /// Spend the current player's teleport item and a roll to move anywhere.
    pub fn use_teleport(&mut self) -> Result<Vec<Coord>, GameError> {
        self.ensure_active()?;
        if let TurnPhase::AwaitingDestination { .. } = self.phase {
            return Err(GameError::MovePending);
        }
        let idx = self.current_player;
        let player = &self.players[idx];
        if !player.teleport {
            return Err(GameError::NoTeleport);
        }
        if player.rolls_remaining == 0 {
            return Err(GameError::NoRollsLeft);
        }

        let paths = all_other_tiles(&self.board, player.tile);
        self.events.clear();
        let player = &mut self.players[idx];
        player.teleport = false;
        player.rolls_remaining -= 1;
        player.reachable = paths;
        self.phase = TurnPhase::AwaitingDestination { distance: 1 };
        self.events.push(GameEvent::Teleporting { player: idx });
        Ok(self.reachable_destinations())
    }

    /// Move the current player to one of the destinations offered by their
    /// last roll and resolve the landing.
    pub fn commit_move(
        &mut self,
        destination: Coord,
        rng: &mut impl Rng,
    ) -> Result<MoveOutcome, GameError> {
        self.ensure_active()?;
        if !matches!(self.phase, TurnPhase::AwaitingDestination { .. }) {
            return Err(GameError::NoMovePending);
        }
        let idx = self.current_player;
        // Several routes may end here; the smallest one sets `previous_tile`
        let path = self.players[idx]
            .reachable
            .iter()
            .filter(|p| p.last() == Some(&destination))
            .min()
            .ok_or(GameError::NotReachable(destination))?;
        let came_from = path.iter().rev().nth(1).copied();
        if !self.board.contains(&destination) {
            return Err(GameError::UnknownTile(destination));
        }

        self.events.clear();
        let player = &mut self.players[idx];
        let from = player.tile;
        player.previous_tile = came_from;
        player.tile = destination;
        player.reachable.clear();
        self.events.push(GameEvent::Moved {
            player: idx,
            from,
            to: destination,
        });

        let effect = self.resolve_landing(idx, destination)?;

        let turn_ended = if effect.holds_turn() {
            self.phase = TurnPhase::Resolving;
            false
        } else {
            self.continue_or_end_turn(rng)
        };

        Ok(MoveOutcome {
            destination,
            effect,
            turn_ended,
        })
    }

    /// Apply the effect of the tile a player just landed on.
    fn resolve_landing(&mut self, idx: PlayerId, coord: Coord) -> Result<EffectResult, GameError> {
        let tile = self
            .board
            .get_mut(&coord)
            .ok_or(GameError::UnknownTile(coord))?;
        let effect = apply_effect(
            tile,
            &mut self.players[idx],
            &self.settings.economy,
            self.settings.difficulty,
        );
        debug!(player = idx, tile = %coord, kind = tile.kind.name(), ?effect, "Landed");
        self.events.push(GameEvent::Landed {
            player: idx,
            tile: coord,
            effect,
        });

        if let EffectResult::GlobalPenalty { amount } = effect {
            self.broadcast_penalty(amount);
        }
        Ok(effect)
    }

    /// Report the result of a minigame started by an agility challenge tile.
    pub fn finish_challenge(&mut self, reward: i64, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.phase != TurnPhase::Resolving {
            return Err(GameError::NotInChallenge);
        }
        self.events.clear();
        let idx = self.current_player;
        self.players[idx].add_money(reward);
        self.events.push(GameEvent::ChallengeFinished {
            player: idx,
            reward,
        });
        self.continue_or_end_turn(rng);
        Ok(())
    }

    /// Hand over to the next player once the current one is done.
    fn continue_or_end_turn(&mut self, rng: &mut impl Rng) -> bool {
        if self.players[self.current_player].rolls_remaining > 0 {
            self.phase = TurnPhase::AwaitingRoll;
            false
        } else {
            self.end_turn(rng);
            true
        }
    }

    /// End the current player's turn, forfeiting any rolls they have left.
    ///
    /// Also accepted while a destination is still to be chosen: the pending
    /// move is dropped and the player stays where they are.
    pub fn advance_turn(&mut self, rng: &mut impl Rng) -> Result<(), GameError> {
        self.ensure_active()?;
        if let TurnPhase::AwaitingDestination { distance } = self.phase {
            debug!(
                player = self.current_player,
                distance, "Pending move forfeited"
            );
        }
        self.events.clear();
        self.end_turn(rng);
        Ok(())
    }

    fn end_turn(&mut self, rng: &mut impl Rng) {
        let outgoing = self.current_player;
        self.players[outgoing].end_turn();
        self.last_roll = None;

        let landed = self.players[outgoing].tile;
        if let Some(tile) = self.board.get_mut(&landed) {
            if tile.kind.is_spent_star() {
                tile.kind = TileKind::Normal;
                self.events.push(GameEvent::StarRemoved { tile: landed });
            }
        }

        self.step_turn(rng);
        while !self.is_game_over() && self.players[self.current_player].frozen {
            let skipped = self.current_player;
            self.players[skipped].frozen = false;
            debug!(player = skipped, "Skipping frozen player");
            self.events.push(GameEvent::FrozenSkipped { player: skipped });
            self.step_turn(rng);
        }
        if self.is_game_over() {
            return;
        }

        let idx = self.current_player;
        self.players[idx].begin_turn();
        self.phase = TurnPhase::AwaitingRoll;
        self.events.push(GameEvent::TurnStarted {
            player: idx,
            turn: self.turn,
        });
        self.place_star(rng);
    }

    /// Move the turn counter and index forward by one, running round
    /// maintenance whenever a round completes.
    fn step_turn(&mut self, rng: &mut impl Rng) {
        self.turn += 1;
        self.current_player = (self.current_player + 1) % self.players.len();
        if self.turn % self.players.len() as u32 == 0 {
            self.complete_round(rng);
        }
    }

    fn complete_round(&mut self, rng: &mut impl Rng) {
        let round = self.completed_rounds();
        info!(round, "Round completed");
        self.events.push(GameEvent::RoundCompleted { round });

        if round % self.settings.level_up_every == 0 {
            let max = self.settings.max_level;
            for player in &mut self.players {
                player.level_up(max);
            }
            info!(round, "Players levelled up");
            self.events.push(GameEvent::LevelUp { round });
        }

        self.market.advance_round(rng);
        let dividends_paid = self.market.pay_dividends(&mut self.players);
        self.events.push(GameEvent::MarketUpdated { dividends_paid });

        if round >= self.settings.max_rounds {
            self.phase = TurnPhase::GameOver;
            for player in &mut self.players {
                player.end_turn();
            }
            info!(rounds = round, "Game over");
            self.events.push(GameEvent::GameOver { rounds: round });
        }
    }

    /// Top the board up towards a random number of star tiles.
    ///
    /// Draws a target in the configured band and, if the board has fewer
    /// star tiles than that, turns one random `Normal` tile into a star.
    /// Returns the tile that received a star, if any.
    pub fn check_stars(&mut self, rng: &mut impl Rng) -> Result<Option<Coord>, GameError> {
        self.ensure_not_over()?;
        self.events.clear();
        Ok(self.place_star(rng))
    }

    fn place_star(&mut self, rng: &mut impl Rng) -> Option<Coord> {
        let count = self.board.star_tile_count();
        let target = rng.gen_range(self.settings.min_stars..=self.settings.max_stars);
        if count >= target {
            return None;
        }
        let coord = *self.board.normal_tiles().choose(rng)?;
        let tile = self.board.get_mut(&coord)?;
        tile.kind = TileKind::Star { has_star: true };
        debug!(tile = %coord, count, target, "Star placed");
        self.events.push(GameEvent::StarPlaced { tile: coord });
        Some(coord)
    }

    /// Charge every player a penalty, regardless of whose turn it is.
    pub fn global_penalty_event(&mut self, amount: i64) -> Result<Vec<PenaltyOutcome>, GameError> {
        self.ensure_not_over()?;
        self.events.clear();
        Ok(self.broadcast_penalty(amount))
    }

    fn broadcast_penalty(&mut self, amount: i64) -> Vec<PenaltyOutcome> {
        let outcomes: Vec<_> = self
            .players
            .iter_mut()
            .map(|p| apply_penalty(p, amount))
            .collect();
        debug!(amount, "Global penalty");
        self.events.push(GameEvent::GlobalPenalty {
            amount,
            outcomes: outcomes.clone(),
        });
        outcomes
    }

    /// Set a player's level directly. Fails outside `[0, max_level]`.
    pub fn set_level(&mut self, player: PlayerId, level: u32) -> Result<(), GameError> {
        self.ensure_not_over()?;
        let max = self.settings.max_level;
        let player = self
            .players
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        player.set_level(level, max)?;
        Ok(())
    }

    /// Change a tile's kind (debug tooling).
    pub fn reclassify_tile(&mut self, coord: Coord, kind: TileKind) -> Result<TileKind, GameError> {
        self.ensure_not_over()?;
        Ok(self.board.reclassify(&coord, kind)?)
    }

    /// Buy shares for the current player. Trading is closed while a
    /// challenge is running.
    pub fn buy_shares(&mut self, ticker: &str, shares: u32) -> Result<i64, GameError> {
        self.ensure_active()?;
        let idx = self.current_player;
        Ok(self.market.buy(&mut self.players[idx], ticker, shares)?)
    }

    /// Sell shares for the current player.
    pub fn sell_shares(&mut self, ticker: &str, shares: u32) -> Result<i64, GameError> {
        self.ensure_active()?;
        let idx = self.current_player;
        Ok(self.market.sell(&mut self.players[idx], ticker, shares)?)
    }

    /// Cash plus shares at current prices.
    pub fn net_worth(&self, player: &Player) -> i64 {
        player.money + self.market.portfolio_value(player)
    }

    /// Players ranked by stars, then net worth, then turn order.
    pub fn final_standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .players
            .iter()
            .enumerate()
            .map(|(id, p)| Standing {
                player: id,
                name: p.name.clone(),
                stars: p.stars,
                net_worth: self.net_worth(p),
                level: p.level,
            })
            .collect();
        standings.sort_by(|a, b| {
            b.stars
                .cmp(&a.stars)
                .then(b.net_worth.cmp(&a.net_worth))
                .then(a.player.cmp(&b.player))
        });
        standings
    }
}

/// Where the current turn stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TurnPhase {
    /// The current player may roll (or use an item).
    #[default]
    AwaitingRoll,
    /// The current player must pick one of the offered destinations.
    AwaitingDestination { distance: u32 },
    /// An external minigame is running for the current player.
    Resolving,
    /// The game has ended; no further commands are accepted.
    GameOver,
}

/// Result of a committed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub destination: Coord,
    pub effect: EffectResult,
    /// Whether play has passed to the next player.
    pub turn_ended: bool,
}

/// A player's final placing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player: PlayerId,
    pub name: String,
    pub stars: u32,
    pub net_worth: i64,
    pub level: u32,
}

/// Errors that can occur during game operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("The game is over")]
    GameOver,
    #[error("Waiting for the agility challenge result")]
    ChallengePending,
    #[error("No agility challenge is running")]
    NotInChallenge,
    #[error("A destination must be chosen first")]
    MovePending,
    #[error("No move to commit; roll first")]
    NoMovePending,
    #[error("No rolls left")]
    NoRollsLeft,
    #[error("No teleport item")]
    NoTeleport,
    #[error("Tile {0} is not reachable")]
    NotReachable(Coord),
    #[error("No tile at {0}")]
    UnknownTile(Coord),
    #[error("No player {0}")]
    UnknownPlayer(PlayerId),
    #[error("Expected {expected} player profiles, got {got}")]
    ProfileCountMismatch { expected: usize, got: usize },
    #[error("Invalid snapshot: {0}")]
    Snapshot(String),
    #[error(transparent)]
    Level(#[from] LevelOutOfRange),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
