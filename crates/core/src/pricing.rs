//! Cart and order totals arithmetic.
//!
//! The cart read path and the order creation path both price baskets through
//! [`totals`], so rounding and the free-shipping threshold can never diverge
//! between what a customer sees in the cart and what an order records.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Tax rate applied to the subtotal, in percent.
pub const TAX_RATE_PERCENT: i64 = 10;

/// Subtotal at or above which shipping is free, in currency units.
pub const FREE_SHIPPING_THRESHOLD: i64 = 5000;

/// Flat shipping fee charged below the threshold, in currency units.
pub const FLAT_SHIPPING_FEE: i64 = 50;

/// A single priced line in a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    /// Unit price in currency units.
    pub unit_price: Decimal,
    /// Number of units.
    pub quantity: i32,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: i32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }
}

/// Priced basket summary.
///
/// All monetary fields are rounded to two decimal places, half away from
/// zero. Line amounts are only rounded at the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    #[serde(rename = "itemCount")]
    pub item_count: i64,
}

impl Totals {
    /// Totals of an empty basket.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
            item_count: 0,
        }
    }
}

/// Price a basket of line items.
///
/// - subtotal = Σ(unit price × quantity)
/// - tax = subtotal × 10%
/// - shipping = 0 if subtotal ≥ 5000, else a flat 50
/// - total = subtotal + tax + shipping
/// - item count = Σ(quantity)
#[must_use]
pub fn totals(lines: &[LineItem]) -> Totals {
    let subtotal: Decimal = lines
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();

    let tax = subtotal * Decimal::new(TAX_RATE_PERCENT, 2);
    let shipping = if subtotal >= Decimal::from(FREE_SHIPPING_THRESHOLD) {
        Decimal::ZERO
    } else {
        Decimal::from(FLAT_SHIPPING_FEE)
    };
    let total = subtotal + tax + shipping;

    Totals {
        subtotal: present(subtotal),
        tax: present(tax),
        shipping: present(shipping),
        total: present(total),
        item_count: lines.iter().map(|line| i64::from(line.quantity)).sum(),
    }
}

/// Round a monetary amount for presentation: 2 decimal places, half away
/// from zero (matching ordinary retail rounding, not banker's rounding).
fn present(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_basket() {
        let t = totals(&[]);
        assert_eq!(t, Totals::empty());
    }

    #[test]
    fn test_reference_basket() {
        // 2 x 1000 + 1 x 500 = 2500, below the free-shipping threshold.
        let t = totals(&[
            LineItem::new(dec("1000"), 2),
            LineItem::new(dec("500"), 1),
        ]);
        assert_eq!(t.subtotal, dec("2500"));
        assert_eq!(t.tax, dec("250.00"));
        assert_eq!(t.shipping, dec("50"));
        assert_eq!(t.total, dec("2800.00"));
        assert_eq!(t.item_count, 3);
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let t = totals(&[LineItem::new(dec("2500"), 2)]);
        assert_eq!(t.subtotal, dec("5000"));
        assert_eq!(t.shipping, Decimal::ZERO);
        assert_eq!(t.total, dec("5500.00"));
    }

    #[test]
    fn test_paid_shipping_just_below_threshold() {
        let t = totals(&[LineItem::new(dec("4999.99"), 1)]);
        assert_eq!(t.shipping, dec("50"));
        assert_eq!(t.total, dec("5549.99").round_dp(2));
    }

    #[test]
    fn test_line_amounts_round_only_at_aggregate() {
        // 3 x 33.335 = 100.005; the per-line amount is never rounded, the
        // aggregate rounds half away from zero.
        let t = totals(&[LineItem::new(dec("33.335"), 3)]);
        assert_eq!(t.subtotal, dec("100.01"));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // subtotal 10.05 -> tax 1.005 -> 1.01 (not banker's 1.00)
        let t = totals(&[LineItem::new(dec("10.05"), 1)]);
        assert_eq!(t.tax, dec("1.01"));
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let t = totals(&[
            LineItem::new(dec("1"), 4),
            LineItem::new(dec("2"), 6),
        ]);
        assert_eq!(t.item_count, 10);
    }
}
