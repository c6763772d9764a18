// Crossover decision rules
pub mod crossover;

pub use crossover::CrossoverAgent;
