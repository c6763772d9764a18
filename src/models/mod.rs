use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// One bid/ask observation at a point in time.
///
/// Ask and bid are independently meaningful; nothing here assumes ask >= bid,
/// feeds do produce crossed quotes transiently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ask: f64,
    pub bid: f64,
    pub timestamp: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(ask: f64, bid: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            ask,
            bid,
            timestamp,
        }
    }
}

/// Current quote as returned by the exchange ticker endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub ask: f64,
    pub bid: f64,
}

/// One tradable currency pair as listed by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairInfo {
    pub currency_pair: String,
    pub event_number: i64,
    pub item_unit_min: f64,
    pub item_unit_step: f64,
}

impl PairInfo {
    /// Pairs with a non-zero event number are campaign pairs the public API
    /// refuses to quote, so they are skipped during discovery.
    pub fn is_active(&self) -> bool {
        self.event_number == 0
    }

    pub fn is_quoted_in(&self, quote: &str) -> bool {
        self.currency_pair.ends_with(&format!("_{}", quote))
    }
}

/// Instantaneous trading decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// The six knobs of the crossover rule.
///
/// - `ask_short` / `ask_long`: window lengths of the ask moving averages the
///   buy rule compares
/// - `ask_ratio`: short/long ask-average ratio that must be reached to buy
/// - `bid_short` / `bid_long`: window lengths of the bid moving averages the
///   sell rule compares
/// - `max_spread`: largest ask/bid ratio at which buying is still allowed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub ask_short: usize,
    pub ask_long: usize,
    pub ask_ratio: f64,
    pub bid_short: usize,
    pub bid_long: usize,
    pub max_spread: f64,
}

const SHORT_WINDOW_MAX: usize = 50;
const LONG_WINDOW_MAX: usize = 200;
const ASK_RATIO_SPREAD: f64 = 0.2;
const MAX_SPREAD_SPAN: f64 = 0.15;

impl Param {
    /// Draw a random candidate. Window pairs are resampled until the short
    /// window does not exceed the long one, so a malformed set never enters
    /// a backtest.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (ask_short, ask_long) = random_window_pair(rng);
        let (bid_short, bid_long) = random_window_pair(rng);

        Self {
            ask_short,
            ask_long,
            ask_ratio: 1.0 + (rng.gen::<f64>() - 0.5) * ASK_RATIO_SPREAD,
            bid_short,
            bid_long,
            max_spread: 1.0 + rng.gen::<f64>() * MAX_SPREAD_SPAN,
        }
    }

    /// Reject window sizes that are zero or inverted. Applied to anything
    /// read back from a store, since persisted files can be hand-edited.
    pub fn validate(&self) -> Result<()> {
        if self.ask_short == 0 || self.ask_long == 0 || self.bid_short == 0 || self.bid_long == 0 {
            return Err(BotError::MalformedParam(
                "window sizes must be positive".into(),
            ));
        }
        if self.ask_short > self.ask_long || self.bid_short > self.bid_long {
            return Err(BotError::MalformedParam(
                "short window exceeds long window".into(),
            ));
        }
        Ok(())
    }

    /// Longest lookback any of the four averages needs.
    pub fn max_window(&self) -> usize {
        self.ask_short
            .max(self.ask_long)
            .max(self.bid_short)
            .max(self.bid_long)
    }
}

fn random_window_pair<R: Rng + ?Sized>(rng: &mut R) -> (usize, usize) {
    loop {
        let short = rng.gen_range(1..=SHORT_WINDOW_MAX);
        let long = rng.gen_range(1..=LONG_WINDOW_MAX);
        if short <= long {
            return (short, long);
        }
    }
}

/// A candidate parameter set together with its backtested profit. The unit
/// of ranking and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamProfit {
    pub param: Param,
    pub profit: f64,
}

impl ParamProfit {
    pub fn new(param: Param, profit: f64) -> Self {
        Self { param, profit }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            param: Param::random(rng),
            profit: 0.0,
        }
    }
}
