//! Fulfillment transition control.
//!
//! A status update is either a plain pass-through write or, for the success
//! status, a guarded one-shot: first caller to win the status claim runs the
//! side effects (shipment provisioning, stock decrements), everyone else gets
//! a no-op report. Side effects that fail after the claim are recorded in the
//! report rather than rolled back; the order stays successful.

use std::sync::Arc;

use tracing::{error, info, warn, Instrument};
use waybill_core::{
    generate_tracking, InventoryId, InventoryStore, OrderId, OrderItem, OrderItemId, OrderStatus,
    OrderStore, ProductId, Shipment, ShipmentStore,
};

use crate::error::{EngineError, EngineResult};
use crate::resolver::{MatchMode, VariantResolver};

/// What a single transition call did.
#[derive(Debug, Clone)]
pub struct TransitionReport {
    pub order_id: OrderId,
    pub requested: OrderStatus,
    pub outcome: TransitionOutcome,
}

impl TransitionReport {
    /// True when this call won the claim and ran the side effects.
    pub fn fulfilled(&self) -> bool {
        matches!(self.outcome, TransitionOutcome::Fulfilled(_))
    }
}

#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// This call claimed the success status and ran fulfillment.
    Fulfilled(FulfillmentEffects),
    /// The order was already successful; nothing was done.
    Duplicate,
    /// Non-success status written straight through.
    StatusSet { updated: bool },
    /// Success requested for an order that does not exist.
    UnknownOrder,
}

/// Per-side-effect record of a fulfillment run.
#[derive(Debug, Clone)]
pub struct FulfillmentEffects {
    pub shipment: ShipmentOutcome,
    pub items: Vec<ItemDecrement>,
    /// Set when the order items could not even be listed.
    pub incomplete: Option<String>,
}

impl FulfillmentEffects {
    /// True when no side effect failed outright. Unmatched decrements count
    /// as handled; they are a data problem, not an execution failure.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_none()
            && !matches!(self.shipment, ShipmentOutcome::Failed(_))
            && self
                .items
                .iter()
                .all(|i| !matches!(i.outcome, DecrementOutcome::Failed(_)))
    }
}

#[derive(Debug, Clone)]
pub enum ShipmentOutcome {
    Provisioned(Shipment),
    AlreadyPresent,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ItemDecrement {
    pub item_id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub outcome: DecrementOutcome,
}

#[derive(Debug, Clone)]
pub enum DecrementOutcome {
    Applied {
        inventory_id: InventoryId,
        mode: MatchMode,
        remaining: i64,
    },
    /// No inventory row resolved for the item's variant.
    Unmatched,
    Failed(String),
}

/// Guards the success transition and runs its side effects exactly once.
pub struct TransitionController<S> {
    store: Arc<S>,
    resolver: VariantResolver<S>,
}

impl<S> Clone for TransitionController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            resolver: self.resolver.clone(),
        }
    }
}

impl<S> TransitionController<S>
where
    S: OrderStore + ShipmentStore + InventoryStore,
{
    pub fn new(store: Arc<S>) -> Self {
        let resolver = VariantResolver::new(Arc::clone(&store));
        Self { store, resolver }
    }

    /// Applies a status transition to an order.
    ///
    /// Non-success statuses are written unconditionally. The success status
    /// goes through a compare-and-set claim; only the winning caller runs
    /// fulfillment, so concurrent or repeated success requests decrement
    /// stock and provision the shipment exactly once.
    pub async fn transition(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> EngineResult<TransitionReport> {
        let span = tracing::info_span!(
            "Transition",
            waybill.order.id = %order_id,
            waybill.status = %status,
        );
        async move {
            let outcome = if status.is_success() {
                if self.store.claim_success(order_id).await? {
                    let effects = self.apply_fulfillment(order_id).await;
                    TransitionOutcome::Fulfilled(effects)
                } else if self.store.find_order(order_id).await?.is_some() {
                    info!(waybill.order.id = %order_id, "Order already successful, skipping fulfillment");
                    TransitionOutcome::Duplicate
                } else {
                    warn!(waybill.order.id = %order_id, "Success requested for unknown order");
                    TransitionOutcome::UnknownOrder
                }
            } else {
                let rows = self.store.set_status(order_id, &status).await?;
                if rows == 0 {
                    warn!(waybill.order.id = %order_id, "Status update matched no order");
                }
                TransitionOutcome::StatusSet { updated: rows > 0 }
            };
            Ok(TransitionReport {
                order_id,
                requested: status,
                outcome,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs the success side effects. Failures are captured in the returned
    /// effects; by this point the status claim is spent and nothing is
    /// rolled back.
    async fn apply_fulfillment(&self, order_id: OrderId) -> FulfillmentEffects {
        let shipment = self.provision_shipment(order_id).await;

        let (items, incomplete) = match self.store.items_for_order(order_id).await {
            Ok(items) => (items, None),
            Err(e) => {
                error!(
                    waybill.order.id = %order_id,
                    error = %e,
                    "Could not list order items for decrement"
                );
                (Vec::new(), Some(e.to_string()))
            }
        };

        let mut decrements = Vec::with_capacity(items.len());
        for item in &items {
            decrements.push(ItemDecrement {
                item_id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                outcome: self.decrement_item(item).await,
            });
        }

        FulfillmentEffects {
            shipment,
            items: decrements,
            incomplete,
        }
    }

    async fn provision_shipment(&self, order_id: OrderId) -> ShipmentOutcome {
        match self.store.find_by_order(order_id).await {
            Ok(Some(existing)) => {
                info!(
                    waybill.order.id = %order_id,
                    waybill.tracking = %existing.tracking_number,
                    "Shipment already provisioned"
                );
                return ShipmentOutcome::AlreadyPresent;
            }
            Ok(None) => {}
            Err(e) => {
                error!(waybill.order.id = %order_id, error = %e, "Shipment lookup failed");
                return ShipmentOutcome::Failed(e.to_string());
            }
        }

        let tracking = generate_tracking();
        match self.store.insert_for_order(order_id, &tracking).await {
            Ok(Some(shipment)) => {
                info!(
                    waybill.order.id = %order_id,
                    waybill.tracking = %shipment.tracking_number,
                    "Shipment provisioned"
                );
                ShipmentOutcome::Provisioned(shipment)
            }
            // Another caller inserted between our check and insert; the
            // unique constraint on order_id absorbed the race.
            Ok(None) => ShipmentOutcome::AlreadyPresent,
            Err(e) => {
                error!(waybill.order.id = %order_id, error = %e, "Shipment insert failed");
                ShipmentOutcome::Failed(e.to_string())
            }
        }
    }

    async fn decrement_item(&self, item: &OrderItem) -> DecrementOutcome {
        let resolved = match self.resolver.resolve(item.product_id, &item.variant()).await {
            Ok(resolved) => resolved,
            Err(EngineError::InventoryNotFound(_)) => {
                warn!(
                    waybill.product.id = %item.product_id,
                    waybill.variant = %item.variant(),
                    "No inventory row for order item, skipping decrement"
                );
                return DecrementOutcome::Unmatched;
            }
            Err(e) => {
                error!(
                    waybill.product.id = %item.product_id,
                    error = %e,
                    "Variant resolution failed"
                );
                return DecrementOutcome::Failed(e.to_string());
            }
        };

        match self
            .store
            .decrement_stock(resolved.record.id, item.quantity)
            .await
        {
            Ok(Some(remaining)) => {
                info!(
                    waybill.product.id = %item.product_id,
                    waybill.inventory.id = %resolved.record.id,
                    waybill.qty = item.quantity,
                    waybill.stock.remaining = remaining,
                    "Stock decremented"
                );
                DecrementOutcome::Applied {
                    inventory_id: resolved.record.id,
                    mode: resolved.mode,
                    remaining,
                }
            }
            Ok(None) => {
                warn!(
                    waybill.inventory.id = %resolved.record.id,
                    "Inventory row vanished before decrement"
                );
                DecrementOutcome::Failed("inventory row vanished before decrement".to_string())
            }
            Err(e) => {
                error!(
                    waybill.inventory.id = %resolved.record.id,
                    error = %e,
                    "Stock decrement failed"
                );
                DecrementOutcome::Failed(e.to_string())
            }
        }
    }
}
