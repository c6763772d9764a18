use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration};

use crate::backtest::Backtester;
use crate::error::Result;
use crate::history::PriceHistory;
use crate::indicators::MovingAverageCursor;
use crate::models::{PairInfo, Param, ParamProfit};
use crate::persistence::{ParamStore, PriceStore};
use crate::util::{calc_amount, TRADE_BUDGET};

/// Which candidate survives a round unchanged while the rest of the
/// population is re-randomized.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Keep the top-ranked candidate of the previous round.
    KeepBest,
    /// Keep the given parameter set (the one a live runner is trading with),
    /// wherever it ranks; falls back to the top-ranked candidate when it is
    /// no longer in the population.
    Keep(Param),
}

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub population_size: usize,
    pub history_limit: usize,
    pub notional: f64,
    pub selection: Selection,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            history_limit: 1000,
            notional: TRADE_BUDGET,
            selection: Selection::KeepBest,
        }
    }
}

/// Random-restart parameter search with one elite survivor per round.
///
/// Each round replays the stored history through every candidate, ranks the
/// population by realized profit and persists the full ranking for the live
/// process to read. Cheap, embarrassingly parallel across candidates, and
/// indifferent to how noisy the profit landscape is.
pub struct Optimizer<P, S> {
    pair: PairInfo,
    price_store: P,
    param_store: S,
    population: Vec<ParamProfit>,
    config: OptimizerConfig,
}

impl<P: PriceStore, S: ParamStore> Optimizer<P, S> {
    pub fn new(pair: PairInfo, price_store: P, param_store: S, config: OptimizerConfig) -> Self {
        Self {
            pair,
            price_store,
            param_store,
            population: Vec::new(),
            config,
        }
    }

    pub fn population(&self) -> &[ParamProfit] {
        &self.population
    }

    /// First round: adopt the persisted ranking if one exists, otherwise
    /// start fully random. Later rounds: keep the selected survivor and
    /// re-randomize everything else.
    async fn prepare_population(&mut self) {
        if self.population.is_empty() {
            let stored = self
                .param_store
                .find_ranked(&self.pair.currency_pair)
                .await
                .unwrap_or_default();

            // Persisted files can be hand-edited; drop anything malformed.
            let mut loaded: Vec<ParamProfit> = Vec::new();
            for record in stored {
                match record.param.validate() {
                    Ok(()) => loaded.push(record),
                    Err(e) => {
                        tracing::warn!(pair = %self.pair.currency_pair, error = %e,
                            "discarding persisted parameter set");
                    }
                }
            }

            // ThreadRng is not Send; keep it out of the awaited section.
            let mut rng = rand::thread_rng();
            self.population = if loaded.is_empty() {
                (0..self.config.population_size)
                    .map(|_| ParamProfit::random(&mut rng))
                    .collect()
            } else {
                loaded
            };
            return;
        }

        let mut rng = rand::thread_rng();
        match &self.config.selection {
            Selection::KeepBest => {
                for candidate in self.population.iter_mut().skip(1) {
                    *candidate = ParamProfit::random(&mut rng);
                }
            }
            Selection::Keep(pinned) => {
                let pinned = pinned.clone();
                let kept = self.population.iter().position(|c| c.param == pinned);
                let kept = kept.unwrap_or(0);
                for (i, candidate) in self.population.iter_mut().enumerate() {
                    if i != kept {
                        *candidate = ParamProfit::random(&mut rng);
                    }
                }
            }
        }
    }

    /// One optimization round: fetch history, score every candidate, rank,
    /// persist. Any store or fetch failure abandons the round; the caller's
    /// schedule decides when the next one starts.
    pub async fn run_once(&mut self) -> Result<()> {
        let records = self
            .price_store
            .fetch_since(
                &self.pair.currency_pair,
                DateTime::<Utc>::UNIX_EPOCH,
                self.config.history_limit,
            )
            .await?;
        let history = PriceHistory::from_batch(records)?;

        self.prepare_population().await;

        let mut latest = MovingAverageCursor::at_newest(&history)
            .expect("from_batch rejects empty history");
        let amount = calc_amount(
            latest.ask(),
            self.config.notional,
            self.pair.item_unit_min,
            self.pair.item_unit_step,
        );

        let mut backtester = Backtester::new(&history);
        let mut results: Vec<ParamProfit> = self
            .population
            .iter()
            .map(|candidate| backtester.run(candidate.param.clone(), amount))
            .collect();
        results.sort_by(|a, b| {
            b.profit
                .partial_cmp(&a.profit)
                .unwrap_or(Ordering::Equal)
        });

        for result in &results {
            tracing::info!(
                pair = %self.pair.currency_pair,
                profit = result.profit,
                param = ?result.param,
                "candidate scored"
            );
        }
        if let Some(best) = results.first() {
            tracing::info!(
                pair = %self.pair.currency_pair,
                profit = best.profit,
                param = ?best.param,
                "best candidate this round"
            );
        }

        self.param_store
            .replace_all(&self.pair.currency_pair, &results)
            .await?;
        self.population = results;
        Ok(())
    }

    /// Optimize forever on a fixed schedule. A failed round is logged and
    /// the next one waits for its tick; there is no immediate retry.
    pub async fn run(mut self, period: Duration) {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::error!(
                    pair = %self.pair.currency_pair,
                    error = %e,
                    "optimization round failed"
                );
            }
        }
    }
}
