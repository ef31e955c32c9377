//! Storefront facade.
//!
//! Wires the cart service, checkout calculator, and transition controller
//! over a single shared store and exposes the whole flow behind one type.

use std::sync::Arc;

use waybill_core::{
    CartLine, CartLineId, Order, OrderId, OrderItem, OrderStatus, ProductId, Shipment,
    StorefrontStore, UserId, VariantKey,
};

use crate::cart::CartService;
use crate::checkout::{CheckoutCalculator, CheckoutRequest};
use crate::error::{EngineError, EngineResult};
use crate::fulfillment::{TransitionController, TransitionReport};

/// An order with its line items and shipment, if one exists yet.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub shipment: Option<Shipment>,
}

/// Entry point tying the services together over one store.
pub struct Storefront<S> {
    store: Arc<S>,
    cart: CartService<S>,
    checkout: CheckoutCalculator<S>,
    transitions: TransitionController<S>,
}

impl<S> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cart: self.cart.clone(),
            checkout: self.checkout.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

impl<S: StorefrontStore> Storefront<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            cart: CartService::new(Arc::clone(&store)),
            checkout: CheckoutCalculator::new(Arc::clone(&store)),
            transitions: TransitionController::new(Arc::clone(&store)),
            store,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The cart service, for callers that want cart operations directly.
    pub fn cart(&self) -> &CartService<S> {
        &self.cart
    }

    /// The transition controller.
    pub fn transitions(&self) -> &TransitionController<S> {
        &self.transitions
    }

    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant: VariantKey,
        quantity: i64,
    ) -> EngineResult<CartLine> {
        self.cart.add_line(user_id, product_id, variant, quantity).await
    }

    pub async fn update_cart_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i64,
    ) -> EngineResult<CartLine> {
        self.cart.update_quantity(user_id, line_id, quantity).await
    }

    pub async fn remove_from_cart(&self, user_id: UserId, line_id: CartLineId) -> EngineResult<()> {
        self.cart.remove_line(user_id, line_id).await
    }

    pub async fn cart_lines(&self, user_id: UserId) -> EngineResult<Vec<CartLine>> {
        self.cart.lines(user_id).await
    }

    /// Prices the cart and places the order.
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> EngineResult<Order> {
        self.checkout.checkout(user_id, request).await
    }

    /// Applies a status transition, running fulfillment on the first
    /// success.
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> EngineResult<TransitionReport> {
        self.transitions.transition(order_id, status).await
    }

    /// An order with its items and shipment.
    pub async fn order_detail(&self, order_id: OrderId) -> EngineResult<OrderDetail> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(EngineError::OrderNotFound)?;
        let items = self.store.items_for_order(order_id).await?;
        let shipment = self.store.find_by_order(order_id).await?;
        Ok(OrderDetail {
            order,
            items,
            shipment,
        })
    }

    /// The user's orders, newest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> EngineResult<Vec<Order>> {
        Ok(self.store.orders_for_user(user_id).await?)
    }
}
