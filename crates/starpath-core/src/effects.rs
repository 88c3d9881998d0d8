//! Landing effects for each tile kind.
//!
//! Effects never fail for lack of funds: being unable to pay is an ordinary
//! outcome reported in the returned [`EffectResult`].

use crate::board::{Tile, TileKind};
use crate::player::Player;
use crate::settings::{Difficulty, Economy};
use serde::{Deserialize, Serialize};

/// What happened when a penalty was charged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenaltyOutcome {
    /// The player's shield absorbed it.
    Shielded,
    /// The player paid in cash.
    Paid(i64),
    /// The player could not pay and gave up a star instead.
    LostStar,
    /// The player could not pay and had no stars; money went negative.
    Debt(i64),
}

/// Outcome of landing on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectResult {
    /// A `Normal` tile paid out.
    Stipend(i64),
    /// A `Penalty` or `Event` tile charged the acting player.
    Penalty(PenaltyOutcome),
    /// The player bought the tile's star.
    StarCollected { cost: i64 },
    /// The tile has a star but the player cannot afford it.
    StarUnaffordable { cost: i64 },
    /// The star tile has no star on offer.
    NoStar,
    /// Every player must be charged; the turn engine broadcasts this.
    GlobalPenalty { amount: i64 },
    /// The player enters an external minigame; the turn is not over yet.
    ChallengePending,
}

impl EffectResult {
    /// Does the caller still owe the game a result before the turn ends?
    pub const fn holds_turn(&self) -> bool {
        matches!(self, EffectResult::ChallengePending)
    }
}

/// Charge a penalty, falling back from shield to cash to a star to debt.
pub fn apply_penalty(player: &mut Player, amount: i64) -> PenaltyOutcome {
    if player.shield {
        player.shield = false;
        return PenaltyOutcome::Shielded;
    }
    if player.can_afford(amount) {
        player.add_money(-amount);
        return PenaltyOutcome::Paid(amount);
    }
    if player.lose_star() {
        return PenaltyOutcome::LostStar;
    }
    player.add_money(-amount);
    PenaltyOutcome::Debt(amount)
}

/// Run the landing logic of `tile` for `player`.
pub fn apply_effect(
    tile: &mut Tile,
    player: &mut Player,
    economy: &Economy,
    difficulty: Difficulty,
) -> EffectResult {
    let multiplier = difficulty.penalty_multiplier();
    match tile.kind {
        TileKind::Normal => {
            player.add_money(economy.stipend);
            EffectResult::Stipend(economy.stipend)
        }
        TileKind::Penalty => {
            EffectResult::Penalty(apply_penalty(player, economy.penalty * multiplier))
        }
        TileKind::Star { has_star: false } => EffectResult::NoStar,
        TileKind::Star { has_star: true } => {
            let cost = economy.star_cost;
            if !player.can_afford(cost) {
                return EffectResult::StarUnaffordable { cost };
            }
            player.add_money(-cost);
            player.stars += 1;
            tile.kind = TileKind::Star { has_star: false };
            EffectResult::StarCollected { cost }
        }
        TileKind::Event => EffectResult::Penalty(apply_penalty(player, economy.event_penalty)),
        TileKind::GlobalEvent => EffectResult::GlobalPenalty {
            amount: economy.global_penalty * multiplier,
        },
        TileKind::AgilityChallenge => EffectResult::ChallengePending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, Links};

    fn tile(kind: TileKind) -> Tile {
        Tile::new(Coord::new(0, 0), Links::default(), kind)
    }

    fn player(money: i64) -> Player {
        Player::new("Test".to_string(), Coord::new(0, 0), money)
    }

    #[test]
    fn test_normal_pays_stipend() {
        let mut p = player(0);
        let result = apply_effect(
            &mut tile(TileKind::Normal),
            &mut p,
            &Economy::default(),
            Difficulty::Normal,
        );
        assert_eq!(result, EffectResult::Stipend(25));
        assert_eq!(p.money, 25);
    }

    #[test]
    fn test_penalty_into_debt() {
        let economy = Economy {
            penalty: 5,
            ..Default::default()
        };
        let mut t = tile(TileKind::Penalty);
        let mut p = player(5);

        let first = apply_effect(&mut t, &mut p, &economy, Difficulty::Normal);
        assert_eq!(first, EffectResult::Penalty(PenaltyOutcome::Paid(5)));
        assert_eq!(p.money, 0);

        let second = apply_effect(&mut t, &mut p, &economy, Difficulty::Normal);
        assert_eq!(second, EffectResult::Penalty(PenaltyOutcome::Debt(5)));
        assert_eq!(p.money, -5);
        assert_eq!(p.stars, 0);
    }

    #[test]
    fn test_penalty_fallback_order() {
        let mut p = player(3);
        p.shield = true;
        p.stars = 1;

        assert_eq!(apply_penalty(&mut p, 10), PenaltyOutcome::Shielded);
        assert!(!p.shield);
        assert_eq!(p.money, 3);

        assert_eq!(apply_penalty(&mut p, 10), PenaltyOutcome::LostStar);
        assert_eq!(p.stars, 0);
        assert_eq!(p.money, 3);

        assert_eq!(apply_penalty(&mut p, 10), PenaltyOutcome::Debt(10));
        assert_eq!(p.money, -7);
    }

    #[test]
    fn test_hard_mode_doubles_penalty() {
        let mut p = player(100);
        let result = apply_effect(
            &mut tile(TileKind::Penalty),
            &mut p,
            &Economy::default(),
            Difficulty::Hard,
        );
        assert_eq!(result, EffectResult::Penalty(PenaltyOutcome::Paid(40)));
        assert_eq!(p.money, 60);
    }

    #[test]
    fn test_star_purchase() {
        let mut t = tile(TileKind::Star { has_star: true });
        let mut p = player(60);
        let result = apply_effect(&mut t, &mut p, &Economy::default(), Difficulty::Normal);
        assert_eq!(result, EffectResult::StarCollected { cost: 50 });
        assert_eq!(p.stars, 1);
        assert_eq!(p.money, 10);
        assert_eq!(t.kind, TileKind::Star { has_star: false });

        // Star is gone now
        let again = apply_effect(&mut t, &mut p, &Economy::default(), Difficulty::Normal);
        assert_eq!(again, EffectResult::NoStar);
        assert_eq!(p.stars, 1);
    }

    #[test]
    fn test_star_unaffordable_keeps_star() {
        let mut t = tile(TileKind::Star { has_star: true });
        let mut p = player(49);
        let result = apply_effect(&mut t, &mut p, &Economy::default(), Difficulty::Normal);
        assert_eq!(result, EffectResult::StarUnaffordable { cost: 50 });
        assert_eq!(p.money, 49);
        assert_eq!(t.kind, TileKind::Star { has_star: true });
    }

    #[test]
    fn test_event_hits_only_actor() {
        let mut p = player(100);
        let result = apply_effect(
            &mut tile(TileKind::Event),
            &mut p,
            &Economy::default(),
            Difficulty::Hard,
        );
        assert_eq!(result, EffectResult::Penalty(PenaltyOutcome::Paid(15)));
    }

    #[test]
    fn test_global_event_is_broadcast() {
        let mut p = player(100);
        let result = apply_effect(
            &mut tile(TileKind::GlobalEvent),
            &mut p,
            &Economy::default(),
            Difficulty::Hard,
        );
        assert_eq!(result, EffectResult::GlobalPenalty { amount: 20 });
        // The engine charges everyone, including the actor
        assert_eq!(p.money, 100);
    }

    #[test]
    fn test_challenge_holds_turn() {
        let mut p = player(100);
        let result = apply_effect(
            &mut tile(TileKind::AgilityChallenge),
            &mut p,
            &Economy::default(),
            Difficulty::Normal,
        );
        assert!(result.holds_turn());
        assert!(!EffectResult::NoStar.holds_turn());
    }
}
