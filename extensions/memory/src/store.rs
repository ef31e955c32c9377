//! Trait implementations for [`MemoryStore`].

use async_trait::async_trait;
use chrono::Utc;
use waybill_core::{
    CartLine, CartLineId, CartStore, CatalogStore, InventoryId, InventoryRecord, InventoryStore,
    NewCartLine, Order, OrderDraft, OrderId, OrderItem, OrderItemDraft, OrderItemId, OrderStatus,
    OrderStore, PricePoint, ProductId, Shipment, ShipmentId, ShipmentStatus, ShipmentStore,
    StoreResult, StorefrontStore, UserId, VariantKey,
};

use crate::MemoryStore;

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn price_points(&self, product_ids: &[ProductId]) -> StoreResult<Vec<PricePoint>> {
        let inner = self.inner.read();
        Ok(product_ids
            .iter()
            .filter_map(|id| inner.products.get(&id.get()).copied())
            .collect())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn find_variant(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
    ) -> StoreResult<Option<InventoryRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .inventory
            .values()
            .find(|r| {
                r.product_id == product_id && variant.matches(r.size.as_deref(), r.color.as_deref())
            })
            .cloned())
    }

    async fn variants_for_product(
        &self,
        product_id: ProductId,
    ) -> StoreResult<Vec<InventoryRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .inventory
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn upsert_variant(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
        stock: i64,
    ) -> StoreResult<InventoryRecord> {
        let mut inner = self.inner.write();

        if let Some(record) = inner.inventory.values_mut().find(|r| {
            r.product_id == product_id && variant.matches(r.size.as_deref(), r.color.as_deref())
        }) {
            record.stock = stock;
            record.last_updated = Utc::now();
            return Ok(record.clone());
        }

        let id = inner.next_id();
        let record = InventoryRecord {
            id: InventoryId::new(id),
            product_id,
            size: variant.size.clone(),
            color: variant.color.clone(),
            stock,
            last_updated: Utc::now(),
        };
        inner.inventory.insert(id, record.clone());
        Ok(record)
    }

    async fn set_stock(
        &self,
        id: InventoryId,
        stock: i64,
    ) -> StoreResult<Option<InventoryRecord>> {
        let mut inner = self.inner.write();
        Ok(inner.inventory.get_mut(&id.get()).map(|record| {
            record.stock = stock;
            record.last_updated = Utc::now();
            record.clone()
        }))
    }

    async fn decrement_stock(&self, id: InventoryId, quantity: i64) -> StoreResult<Option<i64>> {
        let mut inner = self.inner.write();
        Ok(inner.inventory.get_mut(&id.get()).map(|record| {
            record.stock = (record.stock - quantity).max(0);
            record.last_updated = Utc::now();
            record.stock
        }))
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn lines_for_user(&self, user_id: UserId) -> StoreResult<Vec<CartLine>> {
        let inner = self.inner.read();
        Ok(inner
            .cart_lines
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> StoreResult<Option<CartLine>> {
        let inner = self.inner.read();
        Ok(inner
            .cart_lines
            .get(&line_id.get())
            .filter(|l| l.user_id == user_id)
            .cloned())
    }

    async fn insert_line(&self, line: NewCartLine) -> StoreResult<CartLine> {
        let mut inner = self.inner.write();
        let id = inner.next_id();
        let stored = CartLine {
            id: CartLineId::new(id),
            user_id: line.user_id,
            product_id: line.product_id,
            size: line.size,
            color: line.color,
            quantity: line.quantity,
        };
        inner.cart_lines.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_line_quantity(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i64,
    ) -> StoreResult<Option<CartLine>> {
        let mut inner = self.inner.write();
        Ok(inner
            .cart_lines
            .get_mut(&line_id.get())
            .filter(|l| l.user_id == user_id)
            .map(|l| {
                l.quantity = quantity;
                l.clone()
            }))
    }

    async fn delete_line(&self, user_id: UserId, line_id: CartLineId) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        let owned = inner
            .cart_lines
            .get(&line_id.get())
            .is_some_and(|l| l.user_id == user_id);
        if owned {
            inner.cart_lines.remove(&line_id.get());
        }
        Ok(owned)
    }

    async fn clear_for_user(&self, user_id: UserId) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        let before = inner.cart_lines.len();
        inner.cart_lines.retain(|_, l| l.user_id != user_id);
        Ok((before - inner.cart_lines.len()) as u64)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, draft: OrderDraft) -> StoreResult<Order> {
        let mut inner = self.inner.write();
        let id = inner.next_id();
        let order = Order {
            id: OrderId::new(id),
            user_id: draft.user_id,
            created_at: Utc::now(),
            status: draft.status,
            fullname: draft.fullname,
            shipping_address: draft.shipping_address,
            payment_method: draft.payment_method,
            subtotal: draft.totals.subtotal,
            tax_amount: draft.totals.tax_amount,
            shipping_cost: draft.totals.shipping_cost,
            total_price: draft.totals.total_price,
        };
        inner.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn insert_order_items(
        &self,
        order_id: OrderId,
        items: &[OrderItemDraft],
    ) -> StoreResult<Vec<OrderItem>> {
        let mut inner = self.inner.write();
        let mut stored = Vec::with_capacity(items.len());
        for draft in items {
            let id = inner.next_id();
            let item = OrderItem {
                id: OrderItemId::new(id),
                order_id,
                product_id: draft.product_id,
                quantity: draft.quantity,
                price: draft.price,
                size: draft.size.clone(),
                color: draft.color.clone(),
            };
            inner.order_items.insert(id, item.clone());
            stored.push(item);
        }
        Ok(stored)
    }

    async fn delete_order(&self, order_id: OrderId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner.order_items.retain(|_, i| i.order_id != order_id);
        inner.orders.remove(&order_id.get());
        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>> {
        let inner = self.inner.read();
        Ok(inner.orders.get(&order_id.get()).cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let inner = self.inner.read();
        // Ids are handed out monotonically, so reverse id order is newest
        // first.
        Ok(inner
            .orders
            .values()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn items_for_order(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>> {
        let inner = self.inner.read();
        Ok(inner
            .order_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn claim_success(&self, order_id: OrderId) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        match inner.orders.get_mut(&order_id.get()) {
            Some(order) if !order.status.is_success() => {
                order.status = OrderStatus::Success;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_status(&self, order_id: OrderId, status: &OrderStatus) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        match inner.orders.get_mut(&order_id.get()) {
            Some(order) => {
                order.status = status.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl ShipmentStore for MemoryStore {
    async fn find_by_order(&self, order_id: OrderId) -> StoreResult<Option<Shipment>> {
        let inner = self.inner.read();
        Ok(inner
            .shipments
            .values()
            .find(|s| s.order_id == order_id)
            .cloned())
    }

    async fn insert_for_order(
        &self,
        order_id: OrderId,
        tracking_number: &str,
    ) -> StoreResult<Option<Shipment>> {
        let mut inner = self.inner.write();
        // The whole check-and-insert holds the write lock, the in-memory
        // equivalent of a unique index on order_id.
        if inner.shipments.values().any(|s| s.order_id == order_id) {
            return Ok(None);
        }
        let id = inner.next_id();
        let shipment = Shipment {
            id: ShipmentId::new(id),
            order_id,
            tracking_number: tracking_number.to_string(),
            status: ShipmentStatus::Pending,
            updated_at: Utc::now(),
        };
        inner.shipments.insert(id, shipment.clone());
        Ok(Some(shipment))
    }

    async fn update_status(
        &self,
        id: ShipmentId,
        status: &ShipmentStatus,
    ) -> StoreResult<Option<Shipment>> {
        let mut inner = self.inner.write();
        Ok(inner.shipments.get_mut(&id.get()).map(|s| {
            s.status = status.clone();
            s.updated_at = Utc::now();
            s.clone()
        }))
    }
}

#[async_trait]
impl StorefrontStore for MemoryStore {}
