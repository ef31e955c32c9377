//! Cart mutation service.
//!
//! Thin layer over [`CartStore`] that routes every quantity through the
//! stock guard, both on add and on update, so a line never records more
//! than the stock seen at write time.

use std::sync::Arc;

use tracing::info;
use waybill_core::{
    CartLine, CartLineId, CartStore, InventoryStore, NewCartLine, ProductId, UserId, VariantKey,
};

use crate::error::{EngineError, EngineResult};
use crate::guard::StockGuard;

/// Cart line operations for one store.
pub struct CartService<S> {
    store: Arc<S>,
    guard: StockGuard<S>,
}

impl<S> Clone for CartService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            guard: self.guard.clone(),
        }
    }
}

impl<S: CartStore + InventoryStore> CartService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            guard: StockGuard::new(Arc::clone(&store)),
            store,
        }
    }

    /// Adds a line, clamped to available stock.
    pub async fn add_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant: VariantKey,
        requested: i64,
    ) -> EngineResult<CartLine> {
        let quantity = self
            .guard
            .reserve_quantity(product_id, &variant, requested)
            .await?;
        let line = self
            .store
            .insert_line(NewCartLine {
                user_id,
                product_id,
                size: variant.size,
                color: variant.color,
                quantity,
            })
            .await?;
        info!(
            waybill.user.id = %user_id,
            waybill.cart.line = %line.id,
            waybill.qty = quantity,
            "Cart line added"
        );
        Ok(line)
    }

    /// Re-clamps against current stock and updates an existing line.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        requested: i64,
    ) -> EngineResult<CartLine> {
        let line = self
            .store
            .find_line(user_id, line_id)
            .await?
            .ok_or(EngineError::LineNotFound)?;

        let quantity = self
            .guard
            .reserve_quantity(line.product_id, &line.variant(), requested)
            .await?;

        self.store
            .update_line_quantity(user_id, line_id, quantity)
            .await?
            .ok_or(EngineError::LineNotFound)
    }

    /// Removes one line.
    pub async fn remove_line(&self, user_id: UserId, line_id: CartLineId) -> EngineResult<()> {
        if self.store.delete_line(user_id, line_id).await? {
            Ok(())
        } else {
            Err(EngineError::LineNotFound)
        }
    }

    /// The user's current lines, oldest first.
    pub async fn lines(&self, user_id: UserId) -> EngineResult<Vec<CartLine>> {
        Ok(self.store.lines_for_user(user_id).await?)
    }
}
