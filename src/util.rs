use rust_decimal::prelude::{Decimal, FromPrimitive, ToPrimitive};

/// Notional spent per buy, in quote currency.
pub const TRADE_BUDGET: f64 = 10_000.0;

/// Largest amount purchasable within `budget` at price `ask`, constrained to
/// the exchange's `unit_min + k * unit_step` grid.
///
/// `unit_step * k + unit_min` computed in plain f64 picks up representation
/// error that the exchange then rejects, so the grid arithmetic runs through
/// `Decimal`.
pub fn calc_amount(ask: f64, budget: f64, unit_min: f64, unit_step: f64) -> f64 {
    if budget / ask - unit_min <= 0.0 {
        return 0.0;
    }
    let steps = ((budget / ask - unit_min) / unit_step).floor();

    let exact = Decimal::from_f64(unit_step)
        .zip(Decimal::from_f64(steps))
        .zip(Decimal::from_f64(unit_min))
        .map(|((step, k), min)| step * k + min)
        .and_then(|d| d.to_f64());

    exact.unwrap_or(unit_step * steps + unit_min)
}

/// Snap a value that drifted off the unit grid back onto it.
pub fn fixup_float(value: f64, unit_step: f64) -> f64 {
    if unit_step >= 1.0 {
        (value / unit_step).round() * unit_step
    } else {
        let decimals = (-unit_step.log10()).ceil() as i32;
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }
}
