//! Waybill engine.
//!
//! Cart management, checkout pricing, variant resolution, and fulfillment
//! transitions over any [`waybill_core::StorefrontStore`] backend. Four
//! components cover the flow:
//!
//! - [`StockGuard`] clamps requested quantities against live stock.
//! - [`CheckoutCalculator`] prices the cart and places the order.
//! - [`VariantResolver`] maps an ordered variant to an inventory row.
//! - [`TransitionController`] guards the success transition and runs its
//!   side effects exactly once.
//!
//! [`Storefront`] wires all of them over one shared store.

pub mod cart;
pub mod checkout;
pub mod error;
pub mod fulfillment;
pub mod guard;
pub mod resolver;
pub mod storefront;

// Re-exports for convenience
pub use cart::CartService;
pub use checkout::{CheckoutCalculator, CheckoutRequest};
pub use error::{EngineError, EngineResult};
pub use fulfillment::{
    DecrementOutcome, FulfillmentEffects, ItemDecrement, ShipmentOutcome, TransitionController,
    TransitionOutcome, TransitionReport,
};
pub use guard::StockGuard;
pub use resolver::{MatchMode, ResolvedVariant, VariantResolver};
pub use storefront::{OrderDetail, Storefront};

// Prelude module
pub mod prelude {
    pub use crate::cart::CartService;
    pub use crate::checkout::{CheckoutCalculator, CheckoutRequest};
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::fulfillment::{
        DecrementOutcome, FulfillmentEffects, ItemDecrement, ShipmentOutcome,
        TransitionController, TransitionOutcome, TransitionReport,
    };
    pub use crate::guard::StockGuard;
    pub use crate::resolver::{MatchMode, ResolvedVariant, VariantResolver};
    pub use crate::storefront::{OrderDetail, Storefront};
    pub use waybill_core::prelude::*;
}
