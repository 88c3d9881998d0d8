//! Stock market simulation.
//!
//! Each listed stock moves once per completed round. A risk tier `r` in
//! `0..=9` gives the stock an `r`-in-10 chance of declining; otherwise it
//! grows. Dividend pay moves on an independent draw using a fixed magnitude
//! table per dividend tier.

use crate::player::Player;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Highest allowed price risk tier.
pub const MAX_RISK: u8 = 9;

/// Dividend volatility tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DividendTier {
    /// Dividend pay never changes.
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl DividendTier {
    /// Decline threshold out of 10 (the tier's numeric value).
    pub const fn threshold(&self) -> u8 {
        match self {
            DividendTier::None => 0,
            DividendTier::Low => 1,
            DividendTier::Medium => 3,
            DividendTier::High => 5,
        }
    }

    /// Relative `(growth %, decline %)` applied to dividend pay.
    pub const fn magnitudes(&self) -> Option<(f64, f64)> {
        match self {
            DividendTier::None => None,
            DividendTier::Low => Some((1.0, 0.5)),
            DividendTier::Medium => Some((10.0, 2.0)),
            DividendTier::High => Some((30.0, 50.0)),
        }
    }
}

impl TryFrom<u8> for DividendTier {
    type Error = MarketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DividendTier::None),
            1 => Ok(DividendTier::Low),
            3 => Ok(DividendTier::Medium),
            5 => Ok(DividendTier::High),
            other => Err(MarketError::InvalidDividendTier(other)),
        }
    }
}

/// Bounds of the per-round percentage moves.
///
/// Growth is drawn from `[min_growth, min_growth + max_growth)` and decline
/// from `[min_decline, min_decline + max_decline)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub min_growth: f64,
    pub max_growth: f64,
    pub min_decline: f64,
    pub max_decline: f64,
}

impl Tuning {
    pub const fn new(min_growth: f64, max_growth: f64, min_decline: f64, max_decline: f64) -> Self {
        Self {
            min_growth,
            max_growth,
            min_decline,
            max_decline,
        }
    }

    fn validate(&self, ticker: &str) -> Result<(), MarketError> {
        let bounds = [
            self.min_growth,
            self.max_growth,
            self.min_decline,
            self.max_decline,
        ];
        if bounds.iter().any(|b| !b.is_finite() || *b < 0.0) {
            return Err(MarketError::InvalidTuning(ticker.to_string()));
        }
        Ok(())
    }
}

/// A listed stock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub ticker: String,
    pub description: String,
    /// Current price, never negative.
    pub price: f64,
    /// Percentage price change applied last round.
    pub last_change: f64,
    /// Dividend paid per round as a percentage of price, never negative.
    pub dividend_pay: f64,
    /// Relative percentage change in dividend pay last round.
    pub last_dividend_change: f64,
    pub tuning: Tuning,
    /// Chance out of 10 that the price declines in a round.
    pub risk: u8,
    pub dividend_tier: DividendTier,
}

impl Stock {
    /// Create a stock, validating its tiers and tuning.
    pub fn new(
        ticker: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        dividend_pay: f64,
        tuning: Tuning,
        risk: u8,
        dividend_tier: DividendTier,
    ) -> Result<Self, MarketError> {
        let stock = Self {
            ticker: ticker.into(),
            description: description.into(),
            price,
            last_change: 0.0,
            dividend_pay,
            last_dividend_change: 0.0,
            tuning,
            risk,
            dividend_tier,
        };
        stock.validate()?;
        Ok(stock)
    }

    /// Check the risk tier, tuning bounds, price and dividend pay.
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.risk > MAX_RISK {
            return Err(MarketError::InvalidRisk(self.risk));
        }
        self.tuning.validate(&self.ticker)?;
        let amounts = [self.price, self.dividend_pay];
        if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(MarketError::InvalidTuning(self.ticker.clone()));
        }
        Ok(())
    }

    /// Cash paid per share this round, rounded up to a whole unit.
    pub fn dividend_payout(&self) -> i64 {
        (self.price * self.dividend_pay / 100.0).ceil() as i64
    }
}

/// Which way a stock moved in one round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    /// Percentage applied to the price (negative on decline).
    pub price_change: f64,
    /// Relative percentage applied to dividend pay, if the tier allows it.
    pub dividend_change: Option<f64>,
}

/// Uniform draw from `[base, base + span)`, or exactly `base` if the span is
/// empty.
fn draw_percent(rng: &mut impl Rng, base: f64, span: f64) -> f64 {
    if span > 0.0 {
        rng.gen_range(base..base + span)
    } else {
        base
    }
}

/// Move one stock's price and dividend pay by one round.
pub fn advance_round(stock: &mut Stock, rng: &mut impl Rng) -> StockMove {
    let t = stock.tuning;
    let draw: u8 = rng.gen_range(1..=10);
    let price_change = if draw > stock.risk {
        draw_percent(rng, t.min_growth, t.max_growth)
    } else {
        -draw_percent(rng, t.min_decline, t.max_decline)
    };
    stock.price = (stock.price + stock.price * (price_change / 100.0)).max(0.0);
    stock.last_change = price_change;

    let dividend_change = stock.dividend_tier.magnitudes().map(|(grow, shrink)| {
        let draw: u8 = rng.gen_range(1..=10);
        let change = if draw > stock.dividend_tier.threshold() {
            grow
        } else {
            -shrink
        };
        stock.dividend_pay = (stock.dividend_pay + stock.dividend_pay * (change / 100.0)).max(0.0);
        stock.last_dividend_change = change;
        change
    });

    StockMove {
        price_change,
        dividend_change,
    }
}

/// All listed stocks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StockMarket {
    stocks: Vec<Stock>,
}

impl StockMarket {
    /// Create a market from a list of stocks. Tickers must be unique.
    pub fn new(stocks: Vec<Stock>) -> Result<Self, MarketError> {
        let market = Self { stocks };
        market.validate()?;
        Ok(market)
    }

    /// Check every stock and that no ticker is listed twice.
    pub fn validate(&self) -> Result<(), MarketError> {
        for (i, stock) in self.stocks.iter().enumerate() {
            stock.validate()?;
            if self.stocks[..i].iter().any(|s| s.ticker == stock.ticker) {
                return Err(MarketError::DuplicateTicker(stock.ticker.clone()));
            }
        }
        Ok(())
    }

    /// The default listing used by new games.
    pub fn standard() -> Result<Self, MarketError> {
        Self::new(vec![
            Stock::new(
                "BANK",
                "Old Harbor Bank. Slow and steady.",
                200.0,
                4.0,
                Tuning::new(0.5, 1.5, 0.5, 1.0),
                2,
                DividendTier::Medium,
            )?,
            Stock::new(
                "SOLR",
                "Solar farms on the eastern plains.",
                120.0,
                2.0,
                Tuning::new(1.0, 4.0, 1.0, 3.0),
                3,
                DividendTier::Low,
            )?,
            Stock::new(
                "RAIL",
                "Regional railway operator.",
                150.0,
                3.0,
                Tuning::new(1.0, 3.0, 1.0, 2.0),
                4,
                DividendTier::Low,
            )?,
            Stock::new(
                "DRGN",
                "Dragon Biotech. No dividends, big swings.",
                80.0,
                0.0,
                Tuning::new(5.0, 20.0, 5.0, 25.0),
                6,
                DividendTier::None,
            )?,
            Stock::new(
                "MOON",
                "Moonshot Mining. High risk, high payout.",
                40.0,
                8.0,
                Tuning::new(10.0, 40.0, 10.0, 40.0),
                7,
                DividendTier::High,
            )?,
        ])
    }

    /// Iterate over listed stocks.
    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.iter()
    }

    /// Get a stock by ticker.
    pub fn get(&self, ticker: &str) -> Option<&Stock> {
        self.stocks.iter().find(|s| s.ticker == ticker)
    }

    fn stock(&self, ticker: &str) -> Result<&Stock, MarketError> {
        self.get(ticker)
            .ok_or_else(|| MarketError::UnknownTicker(ticker.to_string()))
    }

    /// Advance every stock by one round.
    pub fn advance_round(&mut self, rng: &mut impl Rng) -> Vec<(String, StockMove)> {
        self.stocks
            .iter_mut()
            .map(|stock| {
                let moved = advance_round(stock, rng);
                tracing::debug!(
                    ticker = %stock.ticker,
                    price = stock.price,
                    change = moved.price_change,
                    "Stock moved"
                );
                (stock.ticker.clone(), moved)
            })
            .collect()
    }

    /// Buy shares at the current price, rounded up.
    pub fn buy(&self, player: &mut Player, ticker: &str, shares: u32) -> Result<i64, MarketError> {
        if shares == 0 {
            return Err(MarketError::ZeroShares);
        }
        let stock = self.stock(ticker)?;
        let cost = (stock.price * f64::from(shares)).ceil() as i64;
        if !player.can_afford(cost) {
            return Err(MarketError::InsufficientFunds {
                cost,
                available: player.money,
            });
        }
        player.add_money(-cost);
        *player.portfolio.entry(stock.ticker.clone()).or_insert(0) += shares;
        Ok(cost)
    }

    /// Sell shares at the current price, rounded down.
    pub fn sell(&self, player: &mut Player, ticker: &str, shares: u32) -> Result<i64, MarketError> {
        if shares == 0 {
            return Err(MarketError::ZeroShares);
        }
        let stock = self.stock(ticker)?;
        let held = player.shares(ticker);
        if held < shares {
            return Err(MarketError::InsufficientShares {
                ticker: ticker.to_string(),
                held,
                requested: shares,
            });
        }
        let proceeds = (stock.price * f64::from(shares)).floor() as i64;
        if held == shares {
            player.portfolio.remove(ticker);
        } else {
            player.portfolio.insert(ticker.to_string(), held - shares);
        }
        player.add_money(proceeds);
        Ok(proceeds)
    }

    /// Pay each holder the current dividend on every share. Returns the total
    /// paid out.
    pub fn pay_dividends(&self, players: &mut [Player]) -> i64 {
        let mut total = 0;
        for player in players.iter_mut() {
            let mut paid = 0;
            for (ticker, shares) in &player.portfolio {
                if let Some(stock) = self.get(ticker) {
                    paid += stock.dividend_payout() * i64::from(*shares);
                }
            }
            player.add_money(paid);
            total += paid;
        }
        total
    }

    /// Value of a player's shares at current prices, rounded down.
    pub fn portfolio_value(&self, player: &Player) -> i64 {
        let value: f64 = player
            .portfolio
            .iter()
            .filter_map(|(ticker, shares)| self.get(ticker).map(|s| s.price * f64::from(*shares)))
            .sum();
        value.floor() as i64
    }
}

/// Errors from stock setup and trading.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("Risk tier {0} is outside 0..=9")]
    InvalidRisk(u8),
    #[error("Dividend tier {0} is not one of 0, 1, 3, 5")]
    InvalidDividendTier(u8),
    #[error("Stock {0} has negative or non-finite tuning")]
    InvalidTuning(String),
    #[error("Ticker {0} is listed twice")]
    DuplicateTicker(String),
    #[error("No stock with ticker {0}")]
    UnknownTicker(String),
    #[error("Must trade at least one share")]
    ZeroShares,
    #[error("Holding {held} shares of {ticker}, cannot sell {requested}")]
    InsufficientShares {
        ticker: String,
        held: u32,
        requested: u32,
    },
    #[error("Purchase costs {cost} but only {available} is available")]
    InsufficientFunds { cost: i64, available: i64 },
}
