//! Trait implementations for [`SqliteStore`].
//!
//! The fulfillment-critical operations are single conditional statements:
//! the success CAS is one `UPDATE .. WHERE status <> 'success'`, shipment
//! provisioning leans on the unique `order_id` column, and the stock
//! decrement floors inside the `UPDATE` itself. Checkout's compound write is
//! the one place a multi-statement transaction is used.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracing::debug;
use waybill_core::{
    CartLine, CartLineId, CartStore, CatalogStore, InventoryId, InventoryRecord, InventoryStore,
    NewCartLine, Order, OrderDraft, OrderId, OrderItem, OrderItemDraft, OrderStatus, OrderStore,
    PricePoint, ProductId, Shipment, ShipmentId, ShipmentStatus, ShipmentStore, StoreError,
    StoreResult, StorefrontStore, UserId, VariantKey,
};

use crate::SqliteStore;
use crate::row::{self, map_sqlx_err};

// ============== Shared insert helpers ==============
//
// Generic over the executor so the same statement serves both the pool
// (trait methods) and an open transaction (the checkout override).

async fn insert_order_with<'a, E>(executor: E, draft: &OrderDraft) -> StoreResult<Order>
where
    E: sqlx::Executor<'a, Database = sqlx::Sqlite>,
{
    let row = sqlx::query(
        "INSERT INTO orders (user_id, created_at, status, fullname, shipping_address, \
         payment_method, subtotal, tax_amount, shipping_cost, total_price) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
         RETURNING id, user_id, created_at, status, fullname, shipping_address, \
         payment_method, subtotal, tax_amount, shipping_cost, total_price",
    )
    .bind(draft.user_id.get())
    .bind(Utc::now())
    .bind(draft.status.as_str())
    .bind(draft.fullname.as_deref())
    .bind(draft.shipping_address.as_deref())
    .bind(draft.payment_method.as_str())
    .bind(draft.totals.subtotal.to_string())
    .bind(draft.totals.tax_amount.to_string())
    .bind(draft.totals.shipping_cost.to_string())
    .bind(draft.totals.total_price.to_string())
    .fetch_one(executor)
    .await
    .map_err(map_sqlx_err)?;
    row::order(&row)
}

async fn insert_item_with<'a, E>(
    executor: E,
    order_id: OrderId,
    item: &OrderItemDraft,
) -> StoreResult<OrderItem>
where
    E: sqlx::Executor<'a, Database = sqlx::Sqlite>,
{
    let row = sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantity, price, size, color) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         RETURNING id, order_id, product_id, quantity, price, size, color",
    )
    .bind(order_id.get())
    .bind(item.product_id.get())
    .bind(item.quantity)
    .bind(item.price.to_string())
    .bind(item.size.as_deref())
    .bind(item.color.as_deref())
    .fetch_one(executor)
    .await
    .map_err(map_sqlx_err)?;
    row::order_item(&row)
}

// ============== Catalog ==============

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn price_points(&self, product_ids: &[ProductId]) -> StoreResult<Vec<PricePoint>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, price, promotion_price FROM products WHERE id IN ({placeholders}) \
             ORDER BY id"
        );
        let mut query = sqlx::query(&sql);
        for id in product_ids {
            query = query.bind(id.get());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_err)?;
        rows.iter().map(row::price_point).collect()
    }
}

// ============== Inventory ==============

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn find_variant(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
    ) -> StoreResult<Option<InventoryRecord>> {
        let row = sqlx::query(
            "SELECT id, product_id, size, color, stock, last_updated FROM inventory \
             WHERE product_id = ?1 \
               AND ((?2 IS NULL AND size IS NULL) OR size = ?2) \
               AND ((?3 IS NULL AND color IS NULL) OR color = ?3)",
        )
        .bind(product_id.get())
        .bind(variant.size.as_deref())
        .bind(variant.color.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::inventory).transpose()
    }

    async fn variants_for_product(
        &self,
        product_id: ProductId,
    ) -> StoreResult<Vec<InventoryRecord>> {
        let rows = sqlx::query(
            "SELECT id, product_id, size, color, stock, last_updated FROM inventory \
             WHERE product_id = ?1 ORDER BY id",
        )
        .bind(product_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.iter().map(row::inventory).collect()
    }

    async fn upsert_variant(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
        stock: i64,
    ) -> StoreResult<InventoryRecord> {
        let now = Utc::now();
        let updated = sqlx::query(
            "UPDATE inventory SET stock = ?1, last_updated = ?2 \
             WHERE product_id = ?3 \
               AND ((?4 IS NULL AND size IS NULL) OR size = ?4) \
               AND ((?5 IS NULL AND color IS NULL) OR color = ?5) \
             RETURNING id, product_id, size, color, stock, last_updated",
        )
        .bind(stock)
        .bind(now)
        .bind(product_id.get())
        .bind(variant.size.as_deref())
        .bind(variant.color.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        if let Some(row) = updated {
            return row::inventory(&row);
        }

        // A racing insert of the same variant trips idx_inventory_variant
        // and surfaces as UniqueViolation; the caller retries.
        let row = sqlx::query(
            "INSERT INTO inventory (product_id, size, color, stock, last_updated) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id, product_id, size, color, stock, last_updated",
        )
        .bind(product_id.get())
        .bind(variant.size.as_deref())
        .bind(variant.color.as_deref())
        .bind(stock)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row::inventory(&row)
    }

    async fn set_stock(
        &self,
        id: InventoryId,
        stock: i64,
    ) -> StoreResult<Option<InventoryRecord>> {
        let row = sqlx::query(
            "UPDATE inventory SET stock = ?1, last_updated = ?2 WHERE id = ?3 \
             RETURNING id, product_id, size, color, stock, last_updated",
        )
        .bind(stock)
        .bind(Utc::now())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::inventory).transpose()
    }

    async fn decrement_stock(&self, id: InventoryId, quantity: i64) -> StoreResult<Option<i64>> {
        let row = sqlx::query(
            "UPDATE inventory SET stock = MAX(0, stock - ?1), last_updated = ?2 \
             WHERE id = ?3 RETURNING stock",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.map(|r| r.try_get::<i64, _>("stock").map_err(map_sqlx_err))
            .transpose()
    }
}

// ============== Cart ==============

#[async_trait]
impl CartStore for SqliteStore {
    async fn lines_for_user(&self, user_id: UserId) -> StoreResult<Vec<CartLine>> {
        let rows = sqlx::query(
            "SELECT id, user_id, product_id, size, color, quantity FROM cart_lines \
             WHERE user_id = ?1 ORDER BY id",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.iter().map(row::cart_line).collect()
    }

    async fn find_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> StoreResult<Option<CartLine>> {
        let row = sqlx::query(
            "SELECT id, user_id, product_id, size, color, quantity FROM cart_lines \
             WHERE id = ?1 AND user_id = ?2",
        )
        .bind(line_id.get())
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::cart_line).transpose()
    }

    async fn insert_line(&self, line: NewCartLine) -> StoreResult<CartLine> {
        let row = sqlx::query(
            "INSERT INTO cart_lines (user_id, product_id, size, color, quantity) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING id, user_id, product_id, size, color, quantity",
        )
        .bind(line.user_id.get())
        .bind(line.product_id.get())
        .bind(line.size.as_deref())
        .bind(line.color.as_deref())
        .bind(line.quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row::cart_line(&row)
    }

    async fn update_line_quantity(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i64,
    ) -> StoreResult<Option<CartLine>> {
        let row = sqlx::query(
            "UPDATE cart_lines SET quantity = ?1 WHERE id = ?2 AND user_id = ?3 \
             RETURNING id, user_id, product_id, size, color, quantity",
        )
        .bind(quantity)
        .bind(line_id.get())
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::cart_line).transpose()
    }

    async fn delete_line(&self, user_id: UserId, line_id: CartLineId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?1 AND user_id = ?2")
            .bind(line_id.get())
            .bind(user_id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_for_user(&self, user_id: UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }
}

// ============== Orders ==============

#[async_trait]
impl OrderStore for SqliteStore {
    async fn insert_order(&self, draft: OrderDraft) -> StoreResult<Order> {
        insert_order_with(&self.pool, &draft).await
    }

    async fn insert_order_items(
        &self,
        order_id: OrderId,
        items: &[OrderItemDraft],
    ) -> StoreResult<Vec<OrderItem>> {
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            stored.push(insert_item_with(&self.pool, order_id, item).await?);
        }
        Ok(stored)
    }

    async fn delete_order(&self, order_id: OrderId) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(order_id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(order_id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, user_id, created_at, status, fullname, shipping_address, \
             payment_method, subtotal, tax_amount, shipping_cost, total_price \
             FROM orders WHERE id = ?1",
        )
        .bind(order_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::order).transpose()
    }

    async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, user_id, created_at, status, fullname, shipping_address, \
             payment_method, subtotal, tax_amount, shipping_cost, total_price \
             FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.iter().map(row::order).collect()
    }

    async fn items_for_order(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
        let rows = sqlx::query(
            "SELECT id, order_id, product_id, quantity, price, size, color \
             FROM order_items WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        rows.iter().map(row::order_item).collect()
    }

    async fn claim_success(&self, order_id: OrderId) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'success' WHERE id = ?1 AND status <> 'success'",
        )
        .bind(order_id.get())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        let claimed = result.rows_affected() == 1;
        debug!(waybill.order.id = %order_id, waybill.claimed = claimed, "Success CAS executed");
        Ok(claimed)
    }

    async fn set_status(&self, order_id: OrderId, status: &OrderStatus) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(order_id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected())
    }
}

// ============== Shipments ==============

#[async_trait]
impl ShipmentStore for SqliteStore {
    async fn find_by_order(&self, order_id: OrderId) -> StoreResult<Option<Shipment>> {
        let row = sqlx::query(
            "SELECT id, order_id, tracking_number, status, updated_at FROM shipments \
             WHERE order_id = ?1",
        )
        .bind(order_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::shipment).transpose()
    }

    async fn insert_for_order(
        &self,
        order_id: OrderId,
        tracking_number: &str,
    ) -> StoreResult<Option<Shipment>> {
        // DO NOTHING on the order_id conflict makes racing provisioning
        // runs collapse to one winner; RETURNING is empty for the losers.
        let row = sqlx::query(
            "INSERT INTO shipments (order_id, tracking_number, status, updated_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(order_id) DO NOTHING \
             RETURNING id, order_id, tracking_number, status, updated_at",
        )
        .bind(order_id.get())
        .bind(tracking_number)
        .bind(ShipmentStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::shipment).transpose()
    }

    async fn update_status(
        &self,
        id: ShipmentId,
        status: &ShipmentStatus,
    ) -> StoreResult<Option<Shipment>> {
        let row = sqlx::query(
            "UPDATE shipments SET status = ?1, updated_at = ?2 WHERE id = ?3 \
             RETURNING id, order_id, tracking_number, status, updated_at",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        row.as_ref().map(row::shipment).transpose()
    }
}

// ============== Storefront ==============

#[async_trait]
impl StorefrontStore for SqliteStore {
    async fn place_order(&self, draft: OrderDraft, items: &[OrderItemDraft]) -> StoreResult<Order> {
        let user_id = draft.user_id;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        let order = insert_order_with(&mut *tx, &draft).await?;
        for item in items {
            insert_item_with(&mut *tx, order.id, item).await?;
        }
        sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id.get())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        Ok(order)
    }
}
