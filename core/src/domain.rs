//! Domain rows.
//!
//! Persisted shapes the engine reads and writes. The `*Draft` types carry
//! the caller-supplied fields for a row about to be inserted; the store
//! assigns ids and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{CartLineId, InventoryId, OrderId, OrderItemId, ProductId, ShipmentId, UserId};
use crate::money::OrderTotals;
use crate::status::{OrderStatus, ShipmentStatus};
use crate::variant::VariantKey;

/// Catalog pricing for one product, as read at checkout time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub product_id: ProductId,
    pub price: Decimal,
    pub promotion_price: Option<Decimal>,
}

impl PricePoint {
    /// The unit price a checkout snapshots: the promotion price when one is
    /// set, the list price otherwise.
    pub fn effective(&self) -> Decimal {
        self.promotion_price.unwrap_or(self.price)
    }
}

/// One stock row for a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub stock: i64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// The variant key stored on this row.
    pub fn variant(&self) -> VariantKey {
        VariantKey::new(self.size.as_deref(), self.color.as_deref())
    }
}

/// A line in a customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: i64,
}

impl CartLine {
    pub fn variant(&self) -> VariantKey {
        VariantKey::new(self.size.as_deref(), self.color.as_deref())
    }
}

/// Fields for a cart line about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartLine {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: i64,
}

/// A placed order with its frozen totals.
///
/// Every decimal here was fixed at checkout and is never recomputed;
/// `total_price = subtotal + tax_amount + shipping_cost` after per-field
/// rounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub fullname: Option<String>,
    pub shipping_address: Option<String>,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total_price: Decimal,
}

impl Order {
    /// The totals block as computed at checkout.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            shipping_cost: self.shipping_cost,
            total_price: self.total_price,
        }
    }
}

/// Fields for an order about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub fullname: Option<String>,
    pub shipping_address: Option<String>,
    pub payment_method: String,
    pub totals: OrderTotals,
}

/// A frozen order line: quantity plus the unit price snapshotted at
/// checkout. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: Decimal,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl OrderItem {
    pub fn variant(&self) -> VariantKey {
        VariantKey::new(self.size.as_deref(), self.color.as_deref())
    }
}

/// Fields for an order item about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: Decimal,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A provisioned shipment for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub updated_at: DateTime<Utc>,
}

/// Generates a fresh tracking number.
///
/// `TRK-` plus an uppercase hex UUID keeps the value unique without a
/// counter shared across backends.
pub fn generate_tracking() -> String {
    format!("TRK-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_effective_price_prefers_promotion() {
        let point = PricePoint {
            product_id: ProductId::new(1),
            price: dec!(100),
            promotion_price: Some(dec!(80)),
        };
        assert_eq!(point.effective(), dec!(80));

        let plain = PricePoint {
            promotion_price: None,
            ..point
        };
        assert_eq!(plain.effective(), dec!(100));
    }

    #[test]
    fn test_tracking_numbers_are_prefixed_and_unique() {
        let first = generate_tracking();
        let second = generate_tracking();
        assert!(first.starts_with("TRK-"));
        assert_eq!(first.len(), 4 + 32);
        assert_ne!(first, second);
    }
}
