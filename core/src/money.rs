//! Money arithmetic.
//!
//! All monetary values are [`Decimal`]s. Totals are derived from an
//! unrounded subtotal and rounded to two decimal places only at the
//! boundaries fixed here, so every backend reproduces the same cents.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Flat sales-tax rate applied to every order subtotal.
pub const TAX_RATE: Decimal = dec!(0.06);

/// Flat shipping charge per order, independent of weight or destination.
pub const FLAT_SHIPPING: Decimal = dec!(13);

/// Rounds a monetary amount to two decimal places, midpoints away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The priced summary of an order, computed once at checkout and frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total_price: Decimal,
}

impl OrderTotals {
    /// Derives tax, shipping, and total from an unrounded subtotal.
    ///
    /// The tax rounds on its own before it enters the total:
    /// `total = round2(subtotal + shipping + round2(subtotal * rate))`.
    /// The stored subtotal is rounded last so the raw sum feeds both
    /// formulas.
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax_amount = round_money(subtotal * TAX_RATE);
        let total_price = round_money(subtotal + FLAT_SHIPPING + tax_amount);
        Self {
            subtotal: round_money(subtotal),
            tax_amount,
            shipping_cost: FLAT_SHIPPING,
            total_price,
        }
    }
}
