//! Player state: position, economy, status flags and per-turn scratch data.

use crate::pathfinding::{destinations, Path};
use crate::types::Coord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A player in the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name.
    pub name: String,
    /// Tile the player is standing on.
    pub tile: Coord,
    /// Tile the player stood on before their last move.
    pub previous_tile: Option<Coord>,
    /// Cash on hand. May go negative.
    pub money: i64,
    /// Collected stars.
    pub stars: u32,
    /// Blocks the next penalty.
    pub shield: bool,
    /// The player's next turn is skipped.
    pub frozen: bool,
    /// Knowledge level, bounded by the game's `max_level`.
    pub level: u32,
    /// Persisted profile score, carried through unchanged.
    pub score: u32,
    /// Rolls left in the current turn.
    pub rolls_remaining: u32,
    /// Dice thrown on the next roll.
    pub dice: u32,
    /// Extra rolls granted at the start of the player's next turn.
    pub bonus_rolls: u32,
    /// Holds a free-movement item.
    pub teleport: bool,
    /// Shares held per ticker.
    pub portfolio: BTreeMap<String, u32>,
    /// Paths offered by the last roll, cleared once a move is made.
    pub reachable: Vec<Path>,
}

impl Player {
    /// Create a new player with default values.
    pub fn new(name: String, tile: Coord, money: i64) -> Self {
        Self {
            name,
            tile,
            previous_tile: None,
            money,
            stars: 0,
            shield: false,
            frozen: false,
            level: 0,
            score: 0,
            rolls_remaining: 0,
            dice: 1,
            bonus_rolls: 0,
            teleport: false,
            portfolio: BTreeMap::new(),
            reachable: Vec::new(),
        }
    }

    /// Create a player from a persisted profile.
    pub fn from_profile(
        profile: &PlayerProfile,
        tile: Coord,
        money: i64,
        max_level: u32,
    ) -> Result<Self, LevelOutOfRange> {
        let mut player = Self::new(profile.name.clone(), tile, money);
        player.set_level(profile.level, max_level)?;
        player.score = profile.score;
        Ok(player)
    }

    /// Add (or with a negative amount, remove) money without any floor.
    pub fn add_money(&mut self, amount: i64) {
        self.money += amount;
    }

    /// Check if the player can pay an amount without going negative.
    pub fn can_afford(&self, cost: i64) -> bool {
        self.money >= cost
    }

    /// Take one star away, never going below zero. Returns false if the
    /// player had none.
    pub fn lose_star(&mut self) -> bool {
        if self.stars == 0 {
            return false;
        }
        self.stars -= 1;
        true
    }

    /// Set the knowledge level directly.
    pub fn set_level(&mut self, level: u32, max_level: u32) -> Result<(), LevelOutOfRange> {
        if level > max_level {
            return Err(LevelOutOfRange {
                level,
                max: max_level,
            });
        }
        self.level = level;
        Ok(())
    }

    /// Gain one level unless already at the cap. Returns true if the level
    /// changed.
    pub fn level_up(&mut self, max_level: u32) -> bool {
        if self.level >= max_level {
            return false;
        }
        self.level += 1;
        true
    }

    /// Shares held of a ticker.
    pub fn shares(&self, ticker: &str) -> u32 {
        self.portfolio.get(ticker).copied().unwrap_or(0)
    }

    /// Drop all per-turn scratch state.
    pub fn end_turn(&mut self) {
        self.rolls_remaining = 0;
        self.reachable.clear();
    }

    /// Set up the rolls for a new turn.
    pub fn begin_turn(&mut self) {
        self.rolls_remaining = 1 + self.bonus_rolls;
        self.bonus_rolls = 0;
        self.reachable.clear();
    }

    /// Snapshot for the UI.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            name: self.name.clone(),
            tile: self.tile,
            money: self.money,
            stars: self.stars,
            shield: self.shield,
            frozen: self.frozen,
            level: self.level,
            rolls_remaining: self.rolls_remaining,
            teleport: self.teleport,
            destinations: destinations(&self.reachable),
        }
    }
}

/// Read-only summary of a player for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub tile: Coord,
    pub money: i64,
    pub stars: u32,
    pub shield: bool,
    pub frozen: bool,
    pub level: u32,
    pub rolls_remaining: u32,
    pub teleport: bool,
    /// Distinct tiles the player may move to right now.
    pub destinations: Vec<Coord>,
}

/// A persisted player profile, owned by the profile-management layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub score: u32,
}

impl PlayerProfile {
    /// A fresh profile at level zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 0,
            score: 0,
        }
    }
}

/// Attempt to set a level outside `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Level {level} is outside 0..={max}")]
pub struct LevelOutOfRange {
    pub level: u32,
    pub max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_player() -> Player {
        Player::new("Ada".to_string(), Coord::new(0, 0), 100)
    }

    #[test]
    fn test_new_player() {
        let player = create_test_player();
        assert_eq!(player.money, 100);
        assert_eq!(player.stars, 0);
        assert_eq!(player.dice, 1);
        assert!(!player.shield && !player.frozen && !player.teleport);
        assert!(player.reachable.is_empty());
    }

    #[test]
    fn test_money_can_go_negative() {
        let mut player = create_test_player();
        player.add_money(-150);
        assert_eq!(player.money, -50);
        assert!(!player.can_afford(1));
        assert!(player.can_afford(-50));
    }

    #[test]
    fn test_stars_floor_at_zero() {
        let mut player = create_test_player();
        player.stars = 1;
        assert!(player.lose_star());
        assert!(!player.lose_star());
        assert_eq!(player.stars, 0);
    }

    #[test]
    fn test_set_level_range() {
        let mut player = create_test_player();
        assert!(player.set_level(13, 13).is_ok());
        assert_eq!(player.level, 13);
        assert_eq!(
            player.set_level(14, 13),
            Err(LevelOutOfRange { level: 14, max: 13 })
        );
        // Rejected set leaves the level alone
        assert_eq!(player.level, 13);
    }

    #[test]
    fn test_level_up_caps_silently() {
        let mut player = create_test_player();
        player.level = 12;
        assert!(player.level_up(13));
        assert!(!player.level_up(13));
        assert_eq!(player.level, 13);
    }

    #[test]
    fn test_from_profile() {
        let profile = PlayerProfile {
            name: "Bea".to_string(),
            level: 4,
            score: 900,
        };
        let player = Player::from_profile(&profile, Coord::new(1, 2), 50, 13).unwrap();
        assert_eq!(player.name, "Bea");
        assert_eq!(player.level, 4);
        assert_eq!(player.score, 900);
        assert_eq!(player.tile, Coord::new(1, 2));

        let too_high = PlayerProfile {
            level: 20,
            ..profile
        };
        assert!(Player::from_profile(&too_high, Coord::new(0, 0), 50, 13).is_err());
    }

    #[test]
    fn test_turn_scratch_state() {
        let mut player = create_test_player();
        player.bonus_rolls = 1;
        player.begin_turn();
        assert_eq!(player.rolls_remaining, 2);
        assert_eq!(player.bonus_rolls, 0);

        player.reachable = vec![vec![Coord::new(0, 0), Coord::new(1, 0)]];
        assert_eq!(player.view().destinations, vec![Coord::new(1, 0)]);

        player.end_turn();
        assert_eq!(player.rolls_remaining, 0);
        assert!(player.reachable.is_empty());
    }

    #[test]
    fn test_shares_default_zero() {
        let mut player = create_test_player();
        assert_eq!(player.shares("ACME"), 0);
        player.portfolio.insert("ACME".to_string(), 3);
        assert_eq!(player.shares("ACME"), 3);
    }
}
