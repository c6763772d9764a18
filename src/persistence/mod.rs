// Pluggable storage backends for price history and parameter rankings
pub mod file_store;
pub mod memory;
pub mod redis_store;

pub use file_store::JsonParamStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ParamProfit, PricePoint};

/// Append-only store of bid/ask observations, paginated by recency.
#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn insert(
        &mut self,
        pair: &str,
        ask: f64,
        bid: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;

    /// Records strictly newer than `since`, newest first, at most `limit`.
    async fn fetch_since(
        &mut self,
        pair: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<PricePoint>>;
}

/// Store of the ranked parameter table written by the optimizer and read by
/// the live process.
#[async_trait]
pub trait ParamStore: Send + Sync {
    /// Replace the whole ranking. The replacement is atomic from a reader's
    /// point of view: a concurrent `find_ranked` observes either the old or
    /// the new complete set, never an empty or partial one.
    async fn replace_all(&mut self, pair: &str, records: &[ParamProfit]) -> Result<()>;

    /// The persisted ranking, best profit first.
    async fn find_ranked(&mut self, pair: &str) -> Result<Vec<ParamProfit>>;
}
