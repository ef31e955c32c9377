//! Inventory variant resolution.
//!
//! Given a product and an optional size/color, find the single stock row to
//! act on. Exact mode is literal, null-for-null matching; fallback mode
//! ignores the variant and takes the highest-stock row of the product so a
//! loosely-recorded order item still reconciles against something.

use std::sync::Arc;

use tracing::warn;
use waybill_core::{InventoryRecord, InventoryStore, ProductId, VariantKey};

use crate::error::{EngineError, EngineResult};

/// How a resolution found its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The stored variant equals the requested key, null-for-null.
    Exact,
    /// No exact row existed; the highest-stock row of the product was taken
    /// instead. An approximation to audit, not a per-variant guarantee.
    Fallback,
}

/// A resolved inventory row together with how it was matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub record: InventoryRecord,
    pub mode: MatchMode,
}

/// Finds the inventory row for a product and variant key.
pub struct VariantResolver<S> {
    store: Arc<S>,
}

impl<S> Clone for VariantResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: InventoryStore> VariantResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Exact mode only: the row storing literally this variant key.
    pub async fn resolve_exact(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
    ) -> EngineResult<Option<InventoryRecord>> {
        Ok(self.store.find_variant(product_id, variant).await?)
    }

    /// Exact mode, then highest-stock fallback over every row of the
    /// product. Stock ties break toward the lowest row id so the pick is
    /// stable across runs.
    pub async fn resolve(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
    ) -> EngineResult<ResolvedVariant> {
        if let Some(record) = self.store.find_variant(product_id, variant).await? {
            return Ok(ResolvedVariant {
                record,
                mode: MatchMode::Exact,
            });
        }

        let candidates = self.store.variants_for_product(product_id).await?;
        let fallback = candidates
            .into_iter()
            .min_by(|a, b| b.stock.cmp(&a.stock).then(a.id.get().cmp(&b.id.get())));

        match fallback {
            Some(record) => {
                warn!(
                    waybill.product.id = %product_id,
                    waybill.variant = %variant,
                    waybill.inventory.id = %record.id,
                    waybill.stock = record.stock,
                    "No exact variant row, falling back to highest-stock row"
                );
                Ok(ResolvedVariant {
                    record,
                    mode: MatchMode::Fallback,
                })
            }
            None => Err(EngineError::InventoryNotFound(product_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waybill_memory::MemoryStore;

    #[tokio::test]
    async fn test_exact_match_wins_over_higher_stock() {
        let store = Arc::new(MemoryStore::new());
        let product = ProductId::new(1);
        let black = store
            .upsert_variant(product, &VariantKey::new(Some("M"), Some("Black")), 5)
            .await
            .unwrap();
        store
            .upsert_variant(product, &VariantKey::bare(), 9)
            .await
            .unwrap();

        let resolver = VariantResolver::new(store);
        let resolved = resolver
            .resolve(product, &VariantKey::new(Some("M"), Some("Black")))
            .await
            .unwrap();
        assert_eq!(resolved.record.id, black.id);
        assert_eq!(resolved.mode, MatchMode::Exact);
    }

    #[tokio::test]
    async fn test_fallback_takes_highest_stock_row() {
        let store = Arc::new(MemoryStore::new());
        let product = ProductId::new(1);
        store
            .upsert_variant(product, &VariantKey::new(Some("M"), Some("Black")), 5)
            .await
            .unwrap();
        let bare = store
            .upsert_variant(product, &VariantKey::bare(), 9)
            .await
            .unwrap();

        let resolver = VariantResolver::new(store);
        let resolved = resolver
            .resolve(product, &VariantKey::new(Some("M"), Some("Red")))
            .await
            .unwrap();
        assert_eq!(resolved.record.id, bare.id);
        assert_eq!(resolved.mode, MatchMode::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_stock_ties_break_to_lowest_id() {
        let store = Arc::new(MemoryStore::new());
        let product = ProductId::new(2);
        let first = store
            .upsert_variant(product, &VariantKey::new(None, Some("Red")), 4)
            .await
            .unwrap();
        store
            .upsert_variant(product, &VariantKey::new(None, Some("Blue")), 4)
            .await
            .unwrap();

        let resolver = VariantResolver::new(store);
        let resolved = resolver
            .resolve(product, &VariantKey::new(Some("XL"), None))
            .await
            .unwrap();
        assert_eq!(resolved.record.id, first.id);
        assert_eq!(resolved.mode, MatchMode::Fallback);
    }

    #[tokio::test]
    async fn test_no_rows_at_all_is_not_found() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let resolver = VariantResolver::new(store);
        let err = resolver
            .resolve(ProductId::new(42), &VariantKey::bare())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InventoryNotFound(p) if p == ProductId::new(42)));
    }
}
