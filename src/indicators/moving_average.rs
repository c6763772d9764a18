use crate::history::PriceHistory;

/// Trailing moving averages of ask and bid, anchored at one point in a
/// [`PriceHistory`] and computed lazily toward older observations.
///
/// The partial average over the `i+1` most recent values is memoized at
/// index `i` and only ever extended, never recomputed, via
/// `avg[i] = (avg[i-1]*i + next) / (i+1)`. One cursor per decision instant
/// means many agents can replay the same history at a combined cost linear
/// in the history length instead of windows-times-history per agent.
#[derive(Debug, Clone)]
pub struct MovingAverageCursor<'a> {
    history: &'a PriceHistory,
    ask_avgs: Vec<f64>,
    bid_avgs: Vec<f64>,
    // Index of the next-older point not yet folded into the respective memo.
    ask_next: usize,
    bid_next: usize,
}

impl<'a> MovingAverageCursor<'a> {
    /// Anchor a cursor at `anchor` steps back from the newest observation.
    /// Returns `None` when the anchor is out of range.
    pub fn new(history: &'a PriceHistory, anchor: usize) -> Option<Self> {
        let seed = history.get(anchor)?;
        Some(Self {
            history,
            ask_avgs: vec![seed.ask],
            bid_avgs: vec![seed.bid],
            ask_next: anchor + 1,
            bid_next: anchor + 1,
        })
    }

    /// Cursor at the most recent observation.
    pub fn at_newest(history: &'a PriceHistory) -> Option<Self> {
        Self::new(history, 0)
    }

    /// Trailing mean of the `n` (n >= 1) most recent ask values from the
    /// anchor. When fewer than `n` observations exist the longest available
    /// average is returned instead; this never fails and never extrapolates.
    pub fn ask_avg(&mut self, n: usize) -> f64 {
        let mut i = self.ask_avgs.len();
        while i < n {
            let Some(older) = self.history.get(self.ask_next) else {
                return *self.ask_avgs.last().expect("memo seeded at construction");
            };
            let extended = (self.ask_avgs[i - 1] * i as f64 + older.ask) / (i as f64 + 1.0);
            self.ask_avgs.push(extended);
            self.ask_next += 1;
            i += 1;
        }
        self.ask_avgs[if n > 1 { n - 1 } else { 0 }]
    }

    /// Trailing mean of the `n` most recent bid values. Same clamping rule
    /// as [`ask_avg`](Self::ask_avg).
    pub fn bid_avg(&mut self, n: usize) -> f64 {
        let mut i = self.bid_avgs.len();
        while i < n {
            let Some(older) = self.history.get(self.bid_next) else {
                return *self.bid_avgs.last().expect("memo seeded at construction");
            };
            let extended = (self.bid_avgs[i - 1] * i as f64 + older.bid) / (i as f64 + 1.0);
            self.bid_avgs.push(extended);
            self.bid_next += 1;
            i += 1;
        }
        self.bid_avgs[if n > 1 { n - 1 } else { 0 }]
    }

    /// Ask at the anchor instant.
    pub fn ask(&mut self) -> f64 {
        self.ask_avg(1)
    }

    /// Bid at the anchor instant.
    pub fn bid(&mut self) -> f64 {
        self.bid_avg(1)
    }

    #[cfg(test)]
    pub(crate) fn memoized_ask_len(&self) -> usize {
        self.ask_avgs.len()
    }
}
