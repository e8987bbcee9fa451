//! Monetary rounding helpers.
//!
//! Every stored cost in the ledger carries exactly two fractional digits,
//! rounded half-up. Quantities are integers; only costs are decimal.

use rust_decimal::{Decimal, RoundingStrategy};

/// Normalize a monetary amount to two fractional digits, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Valorized cost of `quantity` units at `unit_cost`, normalized to 2dp.
pub fn line_cost(quantity: i64, unit_cost: Decimal) -> Decimal {
    round_money(Decimal::from(quantity) * unit_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_at_two_places() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn line_cost_multiplies_then_rounds() {
        assert_eq!(line_cost(3, dec!(19.999)), dec!(60.00));
        assert_eq!(line_cost(0, dec!(5.25)), dec!(0.00));
    }
}
