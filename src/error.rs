use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Insufficient history and insufficient held quantity are deliberately not
/// errors: the averaging cursor degrades to the longest available window and
/// the ledger skips the sell as a no-op.
#[derive(Error, Debug)]
pub enum BotError {
    /// A fetch returned no records. Callers treat this as "nothing new".
    #[error("fetch returned no records")]
    EmptyFetch,

    /// A parameter set with non-positive or inverted window sizes. Rejected
    /// at generation/parse time, never surfaced mid-backtest.
    #[error("malformed parameter set: {0}")]
    MalformedParam(String),

    /// Price feed I/O failure. Tick-scoped: logged, then the loop continues.
    #[error("price feed request failed")]
    Feed(#[from] reqwest::Error),

    /// Store I/O failure. Tick-scoped as well.
    #[error("store operation failed")]
    Store(#[from] redis::RedisError),

    #[error("store file operation failed")]
    StoreIo(#[from] std::io::Error),

    #[error("store record could not be (de)serialized")]
    StoreFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
