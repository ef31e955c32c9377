//! Checkout calculation.
//!
//! Reads the cart, snapshots an effective unit price per line, derives the
//! totals, and hands the compound write to [`StorefrontStore::place_order`].
//! Prices on the resulting order items are frozen; later catalog changes
//! never touch a placed order.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use waybill_core::{
    Order, OrderDraft, OrderItemDraft, OrderStatus, OrderTotals, ProductId, StorefrontStore,
    UserId,
};

use crate::error::{EngineError, EngineResult};

/// Caller-supplied checkout fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub fullname: Option<String>,
    pub shipping_address: Option<String>,
    /// Defaults to `card` when absent.
    pub payment_method: Option<String>,
}

/// Turns a cart into a priced order with a frozen line-item snapshot.
pub struct CheckoutCalculator<S> {
    store: Arc<S>,
}

impl<S> Clone for CheckoutCalculator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: StorefrontStore> CheckoutCalculator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Prices the user's cart and writes order + items + cart clear as one
    /// unit.
    ///
    /// The subtotal is the unrounded sum of `effective price * quantity`
    /// over all lines; rounding happens inside [`OrderTotals`]. A line whose
    /// product has vanished from the catalog snapshots a zero price rather
    /// than failing the whole checkout.
    pub async fn checkout(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> EngineResult<Order> {
        let lines = self.store.lines_for_user(user_id).await?;
        if lines.is_empty() {
            return Err(EngineError::EmptyCart);
        }

        let mut product_ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        let prices: HashMap<ProductId, Decimal> = self
            .store
            .price_points(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.product_id, p.effective()))
            .collect();

        let mut subtotal = Decimal::ZERO;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let unit = match prices.get(&line.product_id) {
                Some(price) => *price,
                None => {
                    warn!(
                        waybill.user.id = %user_id,
                        waybill.product.id = %line.product_id,
                        "Cart references unknown product, snapshotting price 0"
                    );
                    Decimal::ZERO
                }
            };
            subtotal += unit * Decimal::from(line.quantity);
            items.push(OrderItemDraft {
                product_id: line.product_id,
                quantity: line.quantity,
                price: unit,
                size: line.size.clone(),
                color: line.color.clone(),
            });
        }

        let draft = OrderDraft {
            user_id,
            status: OrderStatus::Processing,
            fullname: request.fullname,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method.unwrap_or_else(|| "card".to_string()),
            totals: OrderTotals::from_subtotal(subtotal),
        };

        let order = self.store.place_order(draft, &items).await?;
        info!(
            waybill.user.id = %user_id,
            waybill.order.id = %order.id,
            waybill.order.total = %order.total_price,
            waybill.order.lines = items.len(),
            "Order placed"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use waybill_core::{CartStore, OrderStore, VariantKey};
    use waybill_memory::MemoryStore;

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let calculator = CheckoutCalculator::new(store);
        let err = calculator
            .checkout(UserId::new(1), CheckoutRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyCart));
    }

    #[tokio::test]
    async fn test_promotion_price_is_snapshotted() {
        let store = Arc::new(MemoryStore::new());
        store.seed_product(ProductId::new(1), dec!(100), Some(dec!(80)));
        store
            .insert_line(waybill_core::NewCartLine {
                user_id: UserId::new(1),
                product_id: ProductId::new(1),
                size: None,
                color: None,
                quantity: 2,
            })
            .await
            .unwrap();

        let calculator = CheckoutCalculator::new(Arc::clone(&store));
        let order = calculator
            .checkout(UserId::new(1), CheckoutRequest::default())
            .await
            .unwrap();
        assert_eq!(order.subtotal, dec!(160.00));

        let items = store.items_for_order(order.id).await.unwrap();
        assert_eq!(items[0].price, dec!(80));

        // Catalog changes after checkout never reprice the order.
        store.seed_product(ProductId::new(1), dec!(500), None);
        let again = store.items_for_order(order.id).await.unwrap();
        assert_eq!(again[0].price, dec!(80));
    }

    #[tokio::test]
    async fn test_unknown_product_snapshots_zero() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_line(waybill_core::NewCartLine {
                user_id: UserId::new(1),
                product_id: ProductId::new(404),
                size: Some("M".to_string()),
                color: None,
                quantity: 3,
            })
            .await
            .unwrap();

        let calculator = CheckoutCalculator::new(Arc::clone(&store));
        let order = calculator
            .checkout(UserId::new(1), CheckoutRequest::default())
            .await
            .unwrap();
        // Subtotal 0, tax 0, shipping still applies.
        assert_eq!(order.subtotal, dec!(0));
        assert_eq!(order.tax_amount, dec!(0));
        assert_eq!(order.total_price, dec!(13.00));

        let items = store.items_for_order(order.id).await.unwrap();
        assert_eq!(items[0].price, dec!(0));
        assert_eq!(items[0].variant(), VariantKey::new(Some("M"), None));
    }

    #[tokio::test]
    async fn test_payment_method_defaults_to_card() {
        let store = Arc::new(MemoryStore::new());
        store.seed_product(ProductId::new(1), dec!(10), None);
        store
            .insert_line(waybill_core::NewCartLine {
                user_id: UserId::new(1),
                product_id: ProductId::new(1),
                size: None,
                color: None,
                quantity: 1,
            })
            .await
            .unwrap();

        let calculator = CheckoutCalculator::new(store);
        let order = calculator
            .checkout(UserId::new(1), CheckoutRequest::default())
            .await
            .unwrap();
        assert_eq!(order.payment_method, "card");
        assert_eq!(order.status, OrderStatus::Processing);
    }
}
