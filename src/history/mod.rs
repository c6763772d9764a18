use std::collections::VecDeque;

use crate::error::{BotError, Result};
use crate::models::PricePoint;

/// Ordered price observations, newest first.
///
/// Backed by a deque so that splicing freshly fetched points in front is O(1)
/// per point and dropping the oldest tail is O(dropped). Index 0 is always
/// the most recent observation; larger indices walk back in time.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    points: VecDeque<PricePoint>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from a newest-first batch of fetched records.
    ///
    /// An empty batch is `EmptyFetch`: callers must treat an empty fetch
    /// result as "no update", not as an empty history.
    pub fn from_batch(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(BotError::EmptyFetch);
        }
        Ok(Self {
            points: points.into(),
        })
    }

    /// Splice a chain of more recent points in front of this history.
    /// `newer` must itself be newest-first. If this history is empty the
    /// new chain simply becomes the whole history.
    pub fn prepend(&mut self, newer: PriceHistory) {
        let mut merged = newer.points;
        merged.append(&mut self.points);
        self.points = merged;
    }

    /// Drop every observation older than the `limit`-th from the front.
    pub fn truncate(&mut self, limit: usize) {
        self.points.truncate(limit);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The point `index` steps back in time from the newest observation.
    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn newest(&self) -> Option<&PricePoint> {
        self.points.front()
    }

    pub fn oldest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    /// Newest-to-oldest traversal.
    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
