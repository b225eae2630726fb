//! Pip arithmetic for FX instruments.
//!
//! JPY-quoted pairs trade with 2-decimal pips, everything else with
//! 4-decimal pips. All area-band maths goes through these helpers so that
//! the JPY/non-JPY distinction lives in exactly one place.

/// Size of one pip in the instrument's quote currency.
pub fn pip_size(pair: &str) -> f64 {
    if pair.contains("JPY") { 0.01 } else { 0.0001 }
}

/// Move a price up by `pips` pips.
pub fn add_pips(pair: &str, price: f64, pips: f64) -> f64 {
    price + pips * pip_size(pair)
}

/// Move a price down by `pips` pips.
pub fn subtract_pips(pair: &str, price: f64, pips: f64) -> f64 {
    price - pips * pip_size(pair)
}

/// Absolute distance between two prices, expressed in pips.
pub fn pips_between(pair: &str, a: f64, b: f64) -> f64 {
    (a - b).abs() / pip_size(pair)
}
