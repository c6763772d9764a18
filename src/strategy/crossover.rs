use crate::indicators::MovingAverageCursor;
use crate::models::{Action, Param};

/// Stateless decision engine: one parameter set applied to the moving
/// averages at a single instant.
///
/// The cursor argument is `&mut` only because it memoizes partial averages
/// internally; the decision itself holds no state and the same cursor always
/// yields the same action.
#[derive(Debug, Clone)]
pub struct CrossoverAgent {
    pub param: Param,
}

impl CrossoverAgent {
    pub fn new(param: Param) -> Self {
        Self { param }
    }

    /// Buy when the spread is tight enough and the short ask average sits
    /// far enough above the long one.
    pub fn try_buy(&self, avg: &mut MovingAverageCursor) -> Action {
        let avg_short = avg.ask_avg(self.param.ask_short);
        let avg_long = avg.ask_avg(self.param.ask_long);

        let spread_small = avg.ask() / avg.bid() <= self.param.max_spread;
        let ask_ratio_large = avg_short / avg_long >= self.param.ask_ratio;

        if spread_small && ask_ratio_large {
            Action::Buy
        } else {
            Action::Hold
        }
    }

    /// Sell on a bearish crossover of the bid averages.
    pub fn try_sell(&self, avg: &mut MovingAverageCursor) -> Action {
        let avg_short = avg.bid_avg(self.param.bid_short);
        let avg_long = avg.bid_avg(self.param.bid_long);

        if avg_short <= avg_long {
            Action::Sell
        } else {
            Action::Hold
        }
    }

    /// Evaluate both rules. The buy rule is checked first and a firing buy
    /// suppresses a simultaneous sell; this ordering changes outcomes on
    /// ties and is deliberate.
    pub fn update(&self, avg: &mut MovingAverageCursor) -> Action {
        match self.try_buy(avg) {
            Action::Hold => self.try_sell(avg),
            buy => buy,
        }
    }
}
