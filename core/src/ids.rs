//! Typed row identifiers.
//!
//! Every table gets its own id newtype so a `UserId` cannot slip into a slot
//! expecting an `OrderId`. Underneath they are plain `i64` rowids and they
//! serialize as bare integers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

id_type! {
    /// An authenticated storefront customer.
    UserId
}

id_type! {
    /// A catalog product.
    ProductId
}

id_type! {
    /// One line in a customer's cart.
    CartLineId
}

id_type! {
    /// One stock row for a product variant.
    InventoryId
}

id_type! {
    /// A placed order.
    OrderId
}

id_type! {
    /// One frozen line item on an order.
    OrderItemId
}

id_type! {
    /// A provisioned shipment.
    ShipmentId
}
