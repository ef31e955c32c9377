//! Persistence contracts.
//!
//! Each trait names exactly the rows one engine component may touch: the
//! stock guard only reads inventory, the checkout calculator never updates
//! stock, the transition controller is the only writer allowed to subtract
//! it. A backend implements the lot and hands the engine a
//! [`StorefrontStore`].
//!
//! The conditional operations carry the correctness weight:
//!
//! - [`OrderStore::claim_success`] is a single-row compare-and-swap and the
//!   sole guard against double fulfillment.
//! - [`ShipmentStore::insert_for_order`] must lose quietly when the order
//!   already has a shipment, even under racing inserts.
//! - [`InventoryStore::decrement_stock`] floors at zero inside the store,
//!   not in the caller.

use async_trait::async_trait;

use crate::domain::{
    CartLine, InventoryRecord, NewCartLine, Order, OrderDraft, OrderItem, OrderItemDraft,
    PricePoint, Shipment,
};
use crate::error::StoreResult;
use crate::ids::{CartLineId, InventoryId, OrderId, ProductId, ShipmentId, UserId};
use crate::status::{OrderStatus, ShipmentStatus};
use crate::variant::VariantKey;

/// Read access to catalog pricing.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Current price points for the given products. Unknown ids are simply
    /// absent from the result.
    async fn price_points(&self, product_ids: &[ProductId]) -> StoreResult<Vec<PricePoint>>;
}

/// Read/write access to inventory rows.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// The row storing exactly this variant, `None` when no such row exists.
    /// A key without size only matches rows whose size is null, likewise for
    /// color.
    async fn find_variant(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
    ) -> StoreResult<Option<InventoryRecord>>;

    /// Every stock row for one product, in id order.
    async fn variants_for_product(
        &self,
        product_id: ProductId,
    ) -> StoreResult<Vec<InventoryRecord>>;

    /// Inserts the row for (product, variant), or overwrites its stock when
    /// the variant is already recorded. Stamps `last_updated` either way.
    async fn upsert_variant(
        &self,
        product_id: ProductId,
        variant: &VariantKey,
        stock: i64,
    ) -> StoreResult<InventoryRecord>;

    /// Overwrites one row's stock level and stamps `last_updated`. `None`
    /// when the row does not exist.
    async fn set_stock(&self, id: InventoryId, stock: i64)
    -> StoreResult<Option<InventoryRecord>>;

    /// Atomically subtracts `quantity` from one row, flooring at zero, and
    /// stamps `last_updated`. Returns the remaining stock, `None` when the
    /// row has vanished.
    async fn decrement_stock(&self, id: InventoryId, quantity: i64) -> StoreResult<Option<i64>>;
}

/// Read/write access to a customer's cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// All lines in the user's cart, oldest first.
    async fn lines_for_user(&self, user_id: UserId) -> StoreResult<Vec<CartLine>>;

    /// One line by id, scoped to the owning user.
    async fn find_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> StoreResult<Option<CartLine>>;

    /// Inserts a new line and returns it with its assigned id.
    async fn insert_line(&self, line: NewCartLine) -> StoreResult<CartLine>;

    /// Sets the quantity of an existing line. `None` when the line does not
    /// exist for that user.
    async fn update_line_quantity(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i64,
    ) -> StoreResult<Option<CartLine>>;

    /// Deletes one line. Returns whether a row was removed.
    async fn delete_line(&self, user_id: UserId, line_id: CartLineId) -> StoreResult<bool>;

    /// Empties the user's cart. Returns the number of removed lines.
    async fn clear_for_user(&self, user_id: UserId) -> StoreResult<u64>;
}

/// Read/write access to orders and their frozen items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts the order row and returns it with id and creation time
    /// assigned.
    async fn insert_order(&self, draft: OrderDraft) -> StoreResult<Order>;

    /// Inserts the item rows for an order, in the given sequence.
    async fn insert_order_items(
        &self,
        order_id: OrderId,
        items: &[OrderItemDraft],
    ) -> StoreResult<Vec<OrderItem>>;

    /// Removes an order and its items. Compensation for a compound checkout
    /// write that failed partway, also used by admin deletion.
    async fn delete_order(&self, order_id: OrderId) -> StoreResult<()>;

    async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>>;

    /// All orders for one customer, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>>;

    /// All frozen items of one order, in insertion order.
    async fn items_for_order(&self, order_id: OrderId) -> StoreResult<Vec<OrderItem>>;

    /// The compare-and-swap at the heart of fulfillment: set the status to
    /// `success` only if it is not already `success`, as one atomic
    /// conditional write. Returns whether this call changed the row; `false`
    /// covers both "already success" and "no such order".
    async fn claim_success(&self, order_id: OrderId) -> StoreResult<bool>;

    /// Unconditional status write for pass-through states. Returns the
    /// number of rows changed (zero when the order does not exist).
    async fn set_status(&self, order_id: OrderId, status: &OrderStatus) -> StoreResult<u64>;
}

/// Read/write access to shipments.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn find_by_order(&self, order_id: OrderId) -> StoreResult<Option<Shipment>>;

    /// Inserts a pending shipment for the order unless one already exists.
    /// The "unless" must hold under races: implementations back it with a
    /// uniqueness guarantee on `order_id`, not a separate read. `None` when
    /// the order already had a shipment.
    async fn insert_for_order(
        &self,
        order_id: OrderId,
        tracking_number: &str,
    ) -> StoreResult<Option<Shipment>>;

    /// Updates delivery progress and stamps `updated_at`. `None` when the
    /// shipment does not exist.
    async fn update_status(
        &self,
        id: ShipmentId,
        status: &ShipmentStatus,
    ) -> StoreResult<Option<Shipment>>;
}

/// The full persistence surface the engine needs, plus the compound
/// checkout write.
#[async_trait]
pub trait StorefrontStore:
    CatalogStore + InventoryStore + CartStore + OrderStore + ShipmentStore
{
    /// Writes order + items and clears the cart as one unit.
    ///
    /// The default body runs the three steps in sequence and compensates by
    /// deleting the partial order when a later step fails, leaving the cart
    /// untouched. Backends with real transactions override it; the default
    /// keeps a minimal backend correct, just not atomic against concurrent
    /// readers mid-checkout.
    async fn place_order(&self, draft: OrderDraft, items: &[OrderItemDraft]) -> StoreResult<Order> {
        let user_id = draft.user_id;
        let order = self.insert_order(draft).await?;

        if let Err(err) = self.insert_order_items(order.id, items).await {
            tracing::warn!(
                waybill.order.id = %order.id,
                error = %err,
                "Item insert failed, deleting partial order"
            );
            if let Err(cleanup) = self.delete_order(order.id).await {
                tracing::error!(
                    waybill.order.id = %order.id,
                    error = %cleanup,
                    "Compensating order delete failed"
                );
            }
            return Err(err);
        }

        if let Err(err) = self.clear_for_user(user_id).await {
            tracing::warn!(
                waybill.order.id = %order.id,
                error = %err,
                "Cart clear failed, deleting partial order"
            );
            if let Err(cleanup) = self.delete_order(order.id).await {
                tracing::error!(
                    waybill.order.id = %order.id,
                    error = %cleanup,
                    "Compensating order delete failed"
                );
            }
            return Err(err);
        }

        Ok(order)
    }
}
