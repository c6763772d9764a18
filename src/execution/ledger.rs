use crate::indicators::MovingAverageCursor;
use crate::models::Action;

/// Yen paid for a market buy: price rounds up against the buyer.
pub fn calc_payment(ask: f64, amount: f64) -> f64 {
    (ask * amount).ceil()
}

/// Yen received from a market sell: price rounds down against the seller.
pub fn calc_receive(bid: f64, amount: f64) -> f64 {
    (bid * amount).floor()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// An executed (or simulated) trade, reported back so callers can log and
/// notify.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub side: Side,
    pub price: f64,
    pub amount: f64,
}

/// Held quantity, cost basis and realized profit for one parameter set.
///
/// The decision engine re-emits its instantaneous signal every tick, so the
/// ledger executes only on transitions: a run of consecutive `Buy` decisions
/// trades once, on the tick the decision changed.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    held: f64,
    cost_basis: f64,
    realized_profit: f64,
    last_action: Action,
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionLedger {
    pub fn new() -> Self {
        Self {
            held: 0.0,
            cost_basis: 0.0,
            realized_profit: 0.0,
            last_action: Action::Hold,
        }
    }

    /// Apply this tick's decision at the prices under `avg`'s anchor.
    ///
    /// A sell that would exceed the held quantity is skipped entirely; there
    /// are no partial fills. `last_action` tracks the observed decision every
    /// tick regardless of whether anything executed.
    pub fn apply(
        &mut self,
        action: Action,
        avg: &mut MovingAverageCursor,
        amount: f64,
    ) -> Option<Fill> {
        let mut fill = None;

        if action == Action::Buy && self.last_action != Action::Buy {
            let ask = avg.ask();
            self.held += amount;
            self.cost_basis += calc_payment(ask, amount);
            fill = Some(Fill {
                side: Side::Buy,
                price: ask,
                amount,
            });
        } else if action == Action::Sell && self.last_action != Action::Sell {
            if self.held >= amount && self.held > 0.0 && amount > 0.0 {
                let bid = avg.bid();
                let avg_buy = self.cost_basis / self.held;
                self.realized_profit +=
                    calc_receive(bid, amount) - (amount * avg_buy).round();
                self.held -= amount;
                self.cost_basis -= amount * avg_buy;
                fill = Some(Fill {
                    side: Side::Sell,
                    price: bid,
                    amount,
                });
            } else {
                tracing::debug!(
                    held = self.held,
                    amount,
                    "sell signal skipped, insufficient held quantity"
                );
            }
        }

        self.last_action = action;
        fill
    }

    /// Whether a position is currently open. The live runner must not swap
    /// its active parameter set while this is true.
    pub fn is_holding(&self) -> bool {
        self.held > 0.0
    }

    pub fn held(&self) -> f64 {
        self.held
    }

    pub fn cost_basis(&self) -> f64 {
        self.cost_basis
    }

    pub fn realized_profit(&self) -> f64 {
        self.realized_profit
    }

    pub fn last_action(&self) -> Action {
        self.last_action
    }
}
