// Edge-triggered position accounting
pub mod ledger;

pub use ledger::{calc_payment, calc_receive, Fill, PositionLedger, Side};
