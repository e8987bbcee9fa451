//! Weighted-average cost computation.

use rust_decimal::Decimal;

use kardex_core::round_money;

/// New average unit cost after receiving `incoming_qty` units at
/// `incoming_cost` into a bucket holding `current_qty` at `current_avg`:
///
/// `(Q·C + q·c) / (Q + q)`, rounded to 2dp half-up; zero when the combined
/// quantity is zero.
///
/// Pure and total. Exits and decrease adjustments never call this — they
/// consume at the bucket's existing average.
pub fn weighted_average(
    current_qty: i64,
    current_avg: Decimal,
    incoming_qty: i64,
    incoming_cost: Decimal,
) -> Decimal {
    let total_qty = current_qty + incoming_qty;
    if total_qty <= 0 {
        return Decimal::ZERO;
    }

    let current_value = Decimal::from(current_qty) * current_avg;
    let incoming_value = Decimal::from(incoming_qty) * incoming_cost;
    round_money((current_value + incoming_value) / Decimal::from(total_qty))
}
