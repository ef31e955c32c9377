//! Stock guarding for cart mutations.

use std::sync::Arc;

use tracing::debug;
use waybill_core::{InventoryStore, ProductId, VariantKey};

use crate::error::{EngineError, EngineResult};
use crate::resolver::VariantResolver;

/// Clamps requested quantities against live stock before a cart line is
/// written.
///
/// The guard is read-only: it reserves nothing, so a clamp that passed can
/// still be beaten to the stock by another checkout. Every call re-reads
/// current stock for exactly that reason.
pub struct StockGuard<S> {
    resolver: VariantResolver<S>,
}

impl<S> Clone for StockGuard<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<S: InventoryStore> StockGuard<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: VariantResolver::new(store),
        }
    }

    /// Validates `requested` against the exact variant row.
    ///
    /// Requests below one count as one. A missing row or zero stock is
    /// [`EngineError::OutOfStock`]; anything above the available stock
    /// silently becomes the available stock, so adding 10 when 3 remain
    /// succeeds with 3.
    pub async fn reserve_quantity(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
        requested: i64,
    ) -> EngineResult<i64> {
        let requested = requested.max(1);

        let record = self
            .resolver
            .resolve_exact(product_id, variant)
            .await?
            .ok_or(EngineError::OutOfStock(product_id))?;
        if record.stock == 0 {
            return Err(EngineError::OutOfStock(product_id));
        }

        let clamped = requested.min(record.stock);
        if clamped < requested {
            debug!(
                waybill.product.id = %product_id,
                waybill.variant = %variant,
                waybill.qty.requested = requested,
                waybill.qty.clamped = clamped,
                "Clamped cart quantity to available stock"
            );
        }
        Ok(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_memory::MemoryStore;

    async fn guard_with_stock(stock: i64) -> StockGuard<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_variant(ProductId::new(1), &VariantKey::new(Some("M"), None), stock)
            .await
            .unwrap();
        StockGuard::new(store)
    }

    #[tokio::test]
    async fn test_requests_within_stock_pass_through() {
        let guard = guard_with_stock(5).await;
        let key = VariantKey::new(Some("M"), None);
        let quantity = guard
            .reserve_quantity(ProductId::new(1), &key, 3)
            .await
            .unwrap();
        assert_eq!(quantity, 3);
    }

    #[tokio::test]
    async fn test_requests_above_stock_clamp_silently() {
        let guard = guard_with_stock(3).await;
        let key = VariantKey::new(Some("M"), None);
        let quantity = guard
            .reserve_quantity(ProductId::new(1), &key, 10)
            .await
            .unwrap();
        assert_eq!(quantity, 3);
    }

    #[tokio::test]
    async fn test_below_one_coerces_to_one() {
        let guard = guard_with_stock(5).await;
        let key = VariantKey::new(Some("M"), None);
        assert_eq!(
            guard
                .reserve_quantity(ProductId::new(1), &key, 0)
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            guard
                .reserve_quantity(ProductId::new(1), &key, -4)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_zero_stock_is_out_of_stock() {
        let guard = guard_with_stock(0).await;
        let key = VariantKey::new(Some("M"), None);
        let err = guard
            .reserve_quantity(ProductId::new(1), &key, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfStock(_)));
    }

    #[tokio::test]
    async fn test_unknown_variant_is_out_of_stock_not_fallback() {
        // The guard uses exact matching only; a different variant with
        // plenty of stock must not satisfy it.
        let guard = guard_with_stock(50).await;
        let key = VariantKey::new(Some("XL"), None);
        let err = guard
            .reserve_quantity(ProductId::new(1), &key, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OutOfStock(_)));
    }
}
