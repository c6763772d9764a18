use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ParamProfit, PricePoint};
use crate::persistence::{ParamStore, PriceStore};

#[derive(Default)]
struct Inner {
    prices: HashMap<String, Vec<PricePoint>>,
    params: HashMap<String, Vec<ParamProfit>>,
}

/// In-memory store backend. Clones share the same data, which is what tests
/// and single-process setups want.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn insert(
        &mut self,
        pair: &str,
        ask: f64,
        bid: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let points = inner.prices.entry(pair.to_string()).or_default();
        points.push(PricePoint::new(ask, bid, timestamp));
        // Keep newest first so fetches are a prefix scan.
        points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(())
    }

    async fn fetch_since(
        &mut self,
        pair: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<PricePoint>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .prices
            .get(pair)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.timestamp > since)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl ParamStore for MemoryStore {
    async fn replace_all(&mut self, pair: &str, records: &[ParamProfit]) -> Result<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.params.insert(pair.to_string(), records.to_vec());
        Ok(())
    }

    async fn find_ranked(&mut self, pair: &str) -> Result<Vec<ParamProfit>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut records = inner.params.get(pair).cloned().unwrap_or_default();
        records.sort_by(|a, b| {
            b.profit
                .partial_cmp(&a.profit)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(records)
    }
}
