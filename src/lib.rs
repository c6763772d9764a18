// Core modules
pub mod api;
pub mod backtest;
pub mod error;
pub mod execution;
pub mod history;
pub mod indicators;
pub mod live;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod strategy;
pub mod util;

// Re-export commonly used types
pub use error::{BotError, Result};
pub use history::PriceHistory;
pub use indicators::MovingAverageCursor;
pub use models::*;
