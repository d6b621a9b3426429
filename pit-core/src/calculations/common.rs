//! Shared helpers for the calculation modules.

use rust_decimal::Decimal;

/// Rounds to exactly two decimal places, half-up (away from zero).
///
/// Monetary rounding happens once, at the result-assembly boundary; the
/// regime math itself works on unrounded values.
///
/// ```
/// use rust_decimal_macros::dec;
/// use pit_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value to zero from below. Negative intermediate bases and tax
/// amounts never propagate.
pub fn clamp_non_negative(value: Decimal) -> Decimal {
    if value < Decimal::ZERO {
        Decimal::ZERO
    } else {
        value
    }
}
