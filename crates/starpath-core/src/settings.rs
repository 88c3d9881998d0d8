//! Game settings and configuration.

use crate::types::Coord;
use serde::{Deserialize, Serialize};

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Display name for the game.
    pub name: String,
    /// Number of players (2-8).
    pub player_count: usize,
    /// Difficulty mode.
    pub difficulty: Difficulty,
    /// The game ends after this many completed rounds.
    pub max_rounds: u32,
    /// Highest knowledge level a player can reach.
    pub max_level: u32,
    /// Every player gains a level after this many completed rounds.
    pub level_up_every: u32,
    /// Lower bound of the star-tile target drawn each turn.
    pub min_stars: usize,
    /// Upper bound of the star-tile target drawn each turn.
    pub max_stars: usize,
    /// Faces on each die.
    pub die_sides: u32,
    /// Where every player starts (first tile in row-major order if unset).
    pub start_tile: Option<Coord>,
    /// Money each player starts with.
    pub starting_money: i64,
    /// Tile payouts and penalties.
    pub economy: Economy,
}

impl GameSettings {
    /// Create default settings for a new game.
    pub fn new(name: String) -> Self {
        Self {
            name,
            player_count: 4,
            difficulty: Difficulty::Normal,
            max_rounds: 26,
            max_level: 13,
            level_up_every: 3,
            min_stars: 1,
            max_stars: 3,
            die_sides: 6,
            start_tile: None,
            starting_money: 100,
            economy: Economy::default(),
        }
    }

    /// Create settings for a hard-mode game.
    pub fn hard(name: String) -> Self {
        Self {
            difficulty: Difficulty::Hard,
            ..Self::new(name)
        }
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.name.is_empty() {
            return Err(SettingsError::EmptyName);
        }
        if self.player_count < 2 {
            return Err(SettingsError::TooFewPlayers);
        }
        if self.player_count > 8 {
            return Err(SettingsError::TooManyPlayers);
        }
        if self.max_rounds == 0 {
            return Err(SettingsError::NoRounds);
        }
        if self.level_up_every == 0 {
            return Err(SettingsError::ZeroLevelInterval);
        }
        if self.min_stars > self.max_stars {
            return Err(SettingsError::EmptyStarBand {
                min: self.min_stars,
                max: self.max_stars,
            });
        }
        if self.die_sides == 0 {
            return Err(SettingsError::NoDieFaces);
        }
        self.economy.validate()
    }

    /// Multiplier applied to penalties for the current difficulty.
    pub const fn penalty_multiplier(&self) -> i64 {
        self.difficulty.penalty_multiplier()
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new("New Game".to_string())
    }
}

/// Difficulty mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Normal,
    /// Penalty and global-event amounts are doubled.
    Hard,
}

impl Difficulty {
    /// Get the penalty multiplier.
    pub const fn penalty_multiplier(&self) -> i64 {
        match self {
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
        }
    }
}

/// Money amounts used by tile effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    /// Paid out on `Normal` tiles.
    pub stipend: i64,
    /// Charged on `Penalty` tiles (before difficulty).
    pub penalty: i64,
    /// Charged to the acting player on `Event` tiles.
    pub event_penalty: i64,
    /// Charged to every player on `GlobalEvent` tiles (before difficulty).
    pub global_penalty: i64,
    /// Price of a star.
    pub star_cost: i64,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            stipend: 25,
            penalty: 20,
            event_penalty: 15,
            global_penalty: 10,
            star_cost: 50,
        }
    }
}

impl Economy {
    /// All amounts must be non-negative.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let amounts = [
            ("stipend", self.stipend),
            ("penalty", self.penalty),
            ("event_penalty", self.event_penalty),
            ("global_penalty", self.global_penalty),
            ("star_cost", self.star_cost),
        ];
        for (field, value) in amounts {
            if value < 0 {
                return Err(SettingsError::NegativeAmount { field, value });
            }
        }
        Ok(())
    }
}

/// Errors from invalid game settings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Game name cannot be empty")]
    EmptyName,
    #[error("Need at least 2 players")]
    TooFewPlayers,
    #[error("Maximum 8 players allowed")]
    TooManyPlayers,
    #[error("Game must last at least one round")]
    NoRounds,
    #[error("Level-up interval must be at least one round")]
    ZeroLevelInterval,
    #[error("Star band is empty ({min} > {max})")]
    EmptyStarBand { min: usize, max: usize },
    #[error("Dice need at least one face")]
    NoDieFaces,
    #[error("Economy amount {field} cannot be negative ({value})")]
    NegativeAmount { field: &'static str, value: i64 },
    #[error("Invalid settings: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.player_count, 4);
        assert_eq!(settings.max_rounds, 26);
        assert_eq!(settings.max_level, 13);
        assert_eq!(settings.economy.stipend, 25);
        assert_eq!(settings.difficulty, Difficulty::Normal);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_hard_settings() {
        let settings = GameSettings::hard("Hard".to_string());
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.penalty_multiplier(), 2);
        assert_eq!(GameSettings::default().penalty_multiplier(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let settings = GameSettings {
            name: String::new(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::EmptyName));

        let settings = GameSettings {
            player_count: 1,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::TooFewPlayers));

        let settings = GameSettings {
            player_count: 9,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::TooManyPlayers));

        let settings = GameSettings {
            min_stars: 4,
            max_stars: 2,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::EmptyStarBand { min: 4, max: 2 })
        );

        let settings = GameSettings {
            die_sides: 0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::NoDieFaces));
    }

    #[test]
    fn test_negative_economy_rejected() {
        let settings = GameSettings {
            economy: Economy {
                star_cost: -1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NegativeAmount {
                field: "star_cost",
                value: -1
            })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            GameSettings::from_json(r#"{"name": "Quick", "player_count": 2, "max_rounds": 5}"#)
                .unwrap();
        assert_eq!(settings.player_count, 2);
        assert_eq!(settings.max_rounds, 5);
        assert_eq!(settings.die_sides, 6);
        assert_eq!(settings.economy, Economy::default());
    }

    #[test]
    fn test_json_validation_and_parse_errors() {
        assert_eq!(
            GameSettings::from_json(r#"{"player_count": 1}"#),
            Err(SettingsError::TooFewPlayers)
        );
        assert!(matches!(
            GameSettings::from_json("{"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = GameSettings::hard("Test".to_string());
        let json = settings.to_json().unwrap();
        let restored = GameSettings::from_json(&json).unwrap();
        assert_eq!(restored, settings);
    }
}
