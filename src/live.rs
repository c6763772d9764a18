use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration};

use crate::api::PriceFeed;
use crate::error::{BotError, Result};
use crate::execution::{PositionLedger, Side};
use crate::history::PriceHistory;
use crate::indicators::MovingAverageCursor;
use crate::models::{PairInfo, Param};
use crate::notify::IftttNotifier;
use crate::persistence::{ParamStore, PriceStore};
use crate::strategy::CrossoverAgent;
use crate::util::{calc_amount, TRADE_BUDGET};

#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Retained history length; also the fetch page size.
    pub history_limit: usize,
    /// Quote-currency budget per buy.
    pub notional: f64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            notional: TRADE_BUDGET,
        }
    }
}

/// Live decision loop for one currency pair.
///
/// Each tick: fetch the current quote, record it, merge anything newer than
/// what is already retained, then evaluate the active parameter set at the
/// newest observation and apply the decision edge-triggered. The active
/// parameter set follows the optimizer's top-ranked candidate, but only
/// while no position is open; swapping mid-trade would abandon the cost
/// basis.
pub struct LiveTrader<F, P, S> {
    pair: PairInfo,
    feed: F,
    price_store: P,
    param_store: S,
    notifier: Option<IftttNotifier>,
    config: LiveConfig,
    history: PriceHistory,
    last_seen: DateTime<Utc>,
    ledger: PositionLedger,
    active_param: Option<Param>,
}

impl<F: PriceFeed, P: PriceStore, S: ParamStore> LiveTrader<F, P, S> {
    pub fn new(
        pair: PairInfo,
        feed: F,
        price_store: P,
        param_store: S,
        notifier: Option<IftttNotifier>,
        config: LiveConfig,
    ) -> Self {
        Self {
            pair,
            feed,
            price_store,
            param_store,
            notifier,
            config,
            history: PriceHistory::new(),
            last_seen: DateTime::<Utc>::UNIX_EPOCH,
            ledger: PositionLedger::new(),
            active_param: None,
        }
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn active_param(&self) -> Option<&Param> {
        self.active_param.as_ref()
    }

    /// One full live tick. Any feed or store failure aborts the tick; the
    /// loop logs it and waits for the next scheduled tick.
    pub async fn tick(&mut self) -> Result<()> {
        let pair = self.pair.currency_pair.clone();

        // 1. Fetch the current quote and record it.
        let ticker = self.feed.ticker(&pair).await?;
        tracing::info!(pair = %pair, ask = ticker.ask, bid = ticker.bid, "quote");
        self.price_store
            .insert(&pair, ticker.ask, ticker.bid, Utc::now())
            .await?;

        // 2. Merge records newer than the retained history.
        let newer = self
            .price_store
            .fetch_since(&pair, self.last_seen, self.config.history_limit)
            .await?;
        match PriceHistory::from_batch(newer) {
            Ok(chain) => {
                if let Some(newest) = chain.newest() {
                    self.last_seen = newest.timestamp;
                }
                self.history.prepend(chain);
                self.history.truncate(self.config.history_limit);
            }
            Err(BotError::EmptyFetch) => {
                tracing::debug!(pair = %pair, "no records newer than retained history");
            }
            Err(e) => return Err(e),
        }
        if self.history.is_empty() {
            return Ok(());
        }

        // 3. While flat, follow the optimizer's current winner.
        if !self.ledger.is_holding() {
            let ranked = self.param_store.find_ranked(&pair).await?;
            if let Some(best) = ranked.into_iter().next() {
                match best.param.validate() {
                    Ok(()) => {
                        if self.active_param.as_ref() != Some(&best.param) {
                            tracing::info!(
                                pair = %pair,
                                param = ?best.param,
                                backtest_profit = best.profit,
                                "adopting top-ranked parameter set"
                            );
                        }
                        self.active_param = Some(best.param);
                    }
                    Err(e) => {
                        tracing::warn!(pair = %pair, error = %e,
                            "ignoring malformed top-ranked parameter set");
                    }
                }
            }
        }
        let Some(param) = self.active_param.clone() else {
            tracing::debug!(pair = %pair, "no parameter ranking available yet");
            return Ok(());
        };

        // 4. Decide at the newest observation and apply edge-triggered.
        let mut avg = MovingAverageCursor::at_newest(&self.history)
            .expect("history checked non-empty");
        let amount = calc_amount(
            avg.ask(),
            self.config.notional,
            self.pair.item_unit_min,
            self.pair.item_unit_step,
        );
        let agent = CrossoverAgent::new(param);
        let action = agent.update(&mut avg);

        if let Some(fill) = self.ledger.apply(action, &mut avg, amount) {
            let verb = match fill.side {
                Side::Buy => "bought",
                Side::Sell => "sold",
            };
            let message = format!(
                "{} {} {} @ {} (realized profit {})",
                verb,
                pair,
                fill.amount,
                fill.price,
                self.ledger.realized_profit()
            );
            tracing::info!(pair = %pair, "{}", message);

            if let Some(notifier) = &self.notifier {
                // Fire-and-forget: delivery must not hold up the tick.
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    notifier.notify(&message).await;
                });
            }
        }

        Ok(())
    }

    /// Watch forever on a fixed cadence. Failed ticks are logged and the
    /// loop stays on schedule.
    pub async fn run(mut self, period: Duration) {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                tracing::error!(pair = %self.pair.currency_pair, error = %e, "tick failed");
            }
        }
    }
}
