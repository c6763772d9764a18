// Exchange public API client
pub mod zaif;

pub use zaif::ZaifClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PairInfo, Ticker};

/// The price feed the core consumes: a current quote per pair and the list
/// of tradable pairs. Polling cadence is the caller's business.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn ticker(&self, pair: &str) -> Result<Ticker>;

    async fn currency_pairs(&self) -> Result<Vec<PairInfo>>;
}
