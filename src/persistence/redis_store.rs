use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};

use crate::error::Result;
use crate::models::{ParamProfit, PricePoint};
use crate::persistence::{ParamStore, PriceStore};

/// Stored form of one observation, without the pair (the key carries it).
#[derive(Debug, Serialize, Deserialize)]
struct StoredTick {
    ask: f64,
    bid: f64,
    timestamp: DateTime<Utc>,
}

/// Redis-backed price and parameter store.
///
/// Prices live in a sorted set per pair (`prices:{pair}`) scored by
/// millisecond timestamp, so recency pagination is a range query. The
/// parameter ranking is one JSON value per pair (`params:{pair}`); replacing
/// it is a single SET, which gives readers the old-or-new-never-neither
/// guarantee for free.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;

        let conn = timeout(Duration::from_secs(5), ConnectionManager::new(client))
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "redis connection timeout after 5 seconds",
                )
            })??;

        tracing::info!("Connected to Redis at {}", redis_url);

        Ok(Self { conn })
    }

    fn price_key(pair: &str) -> String {
        format!("prices:{}", pair)
    }

    fn param_key(pair: &str) -> String {
        format!("params:{}", pair)
    }
}

#[async_trait]
impl PriceStore for RedisStore {
    async fn insert(
        &mut self,
        pair: &str,
        ask: f64,
        bid: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let key = Self::price_key(pair);
        let tick = StoredTick {
            ask,
            bid,
            timestamp,
        };
        let member = serde_json::to_string(&tick)?;
        let score = timestamp.timestamp_millis() as f64;

        self.conn.zadd::<_, _, _, ()>(&key, member, score).await?;
        tracing::debug!(pair, ask, bid, "stored tick");
        Ok(())
    }

    async fn fetch_since(
        &mut self,
        pair: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<PricePoint>> {
        let key = Self::price_key(pair);
        // Exclusive lower bound: only records newer than `since`.
        let min = format!("({}", since.timestamp_millis());

        let raw: Vec<String> = self
            .conn
            .zrevrangebyscore_limit(&key, "+inf", min, 0, limit as isize)
            .await?;

        let mut points = Vec::with_capacity(raw.len());
        for member in raw {
            let tick: StoredTick = serde_json::from_str(&member)?;
            points.push(PricePoint::new(tick.ask, tick.bid, tick.timestamp));
        }
        Ok(points)
    }
}

#[async_trait]
impl ParamStore for RedisStore {
    async fn replace_all(&mut self, pair: &str, records: &[ParamProfit]) -> Result<()> {
        let key = Self::param_key(pair);
        let payload = serde_json::to_string(records)?;
        self.conn.set::<_, _, ()>(&key, payload).await?;
        tracing::debug!(pair, count = records.len(), "replaced parameter ranking");
        Ok(())
    }

    async fn find_ranked(&mut self, pair: &str) -> Result<Vec<ParamProfit>> {
        let key = Self::param_key(pair);
        let payload: Option<String> = self.conn.get(&key).await?;

        let Some(payload) = payload else {
            return Ok(Vec::new());
        };
        let mut records: Vec<ParamProfit> = serde_json::from_str(&payload)?;
        records.sort_by(|a, b| {
            b.profit
                .partial_cmp(&a.profit)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(records)
    }
}
