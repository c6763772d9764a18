// Incremental trailing averages over a price history
pub mod moving_average;

pub use moving_average::MovingAverageCursor;
