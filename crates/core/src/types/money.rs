//! Cart money arithmetic.
//!
//! Totals are always computed from live product prices at the moment of
//! computation; no price is cached on cart lines. Tax is a flat 8% of the
//! subtotal, rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Flat sales tax rate applied to the cart subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Derived totals for a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartTotals {
    /// Sum over lines of unit price times quantity.
    pub subtotal: Decimal,
    /// 8% of the subtotal, rounded half-up to cents.
    pub tax: Decimal,
    /// Subtotal plus tax.
    pub total: Decimal,
    /// Total unit count across all lines.
    pub item_count: i64,
}

/// Price of a single line: unit price times quantity.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Compute cart totals from `(unit_price, quantity)` pairs.
#[must_use]
pub fn totals_from_lines<I>(lines: I) -> CartTotals
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let mut subtotal = Decimal::ZERO;
    let mut item_count = 0_i64;

    for (unit_price, quantity) in lines {
        subtotal += line_total(unit_price, quantity);
        item_count += i64::from(quantity);
    }

    let tax = (subtotal * TAX_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    CartTotals {
        subtotal,
        tax,
        total: subtotal + tax,
        item_count,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_tax_rate_is_eight_percent() {
        assert_eq!(TAX_RATE, dec!(0.08));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec!(10.00), 2), dec!(20.00));
        assert_eq!(line_total(dec!(5.50), 1), dec!(5.50));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = totals_from_lines(std::iter::empty());
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.item_count, 0);
    }

    #[test]
    fn test_reference_scenario() {
        // Product A: 10.00 x 2, Product B: 5.50 x 1
        let totals = totals_from_lines([(dec!(10.00), 2), (dec!(5.50), 1)]);
        assert_eq!(totals.subtotal, dec!(25.50));
        assert_eq!(totals.tax, dec!(2.04));
        assert_eq!(totals.total, dec!(27.54));
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // 1.99 * 0.08 = 0.1592 -> 0.16
        let totals = totals_from_lines([(dec!(1.99), 1)]);
        assert_eq!(totals.tax, dec!(0.16));
        assert_eq!(totals.total, dec!(2.15));
    }
}
