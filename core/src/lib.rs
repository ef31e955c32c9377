//! # Waybill Core
//!
//! Storage-agnostic domain core for the Waybill checkout and fulfillment
//! reconciliation engine.
//!
//! This crate defines the rows the engine operates on (pricing, inventory
//! variants, cart lines, orders, shipments), the money arithmetic that must
//! stay reproducible across backends, and the [`store`] traits a persistence
//! backend implements. It contains no engine logic and no storage driver;
//! those live in `waybill-engine` and the backend crates.

pub mod domain;
pub mod error;
pub mod ids;
pub mod money;
pub mod status;
pub mod store;
pub mod variant;

pub use domain::{
    CartLine, InventoryRecord, NewCartLine, Order, OrderDraft, OrderItem, OrderItemDraft,
    PricePoint, Shipment, generate_tracking,
};
pub use error::{StoreError, StoreResult};
pub use ids::{CartLineId, InventoryId, OrderId, OrderItemId, ProductId, ShipmentId, UserId};
pub use money::{FLAT_SHIPPING, OrderTotals, TAX_RATE, round_money};
pub use status::{OrderStatus, ShipmentStatus};
pub use store::{
    CartStore, CatalogStore, InventoryStore, OrderStore, ShipmentStore, StorefrontStore,
};
pub use variant::VariantKey;

// Prelude module
pub mod prelude {
    pub use crate::domain::{
        CartLine, InventoryRecord, NewCartLine, Order, OrderDraft, OrderItem, OrderItemDraft,
        PricePoint, Shipment,
    };
    pub use crate::error::{StoreError, StoreResult};
    pub use crate::ids::{
        CartLineId, InventoryId, OrderId, OrderItemId, ProductId, ShipmentId, UserId,
    };
    pub use crate::money::OrderTotals;
    pub use crate::status::{OrderStatus, ShipmentStatus};
    pub use crate::store::{
        CartStore, CatalogStore, InventoryStore, OrderStore, ShipmentStore, StorefrontStore,
    };
    pub use crate::variant::VariantKey;
}
