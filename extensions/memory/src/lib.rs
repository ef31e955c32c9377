// # Waybill In-Memory Store
//
// A single-process `StorefrontStore` over `BTreeMap` tables behind one
// `parking_lot::RwLock`. Every conditional operation runs under the write
// lock, so each is atomic exactly like its SQL counterpart. Used by tests
// and demos, and as the reference semantics for the other backends.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use waybill_core::{
    CartLine, InventoryRecord, Order, OrderItem, PricePoint, ProductId, Shipment,
};

mod store;

/// Table state behind the lock. Keys are row ids; `seq` hands out the next
/// id across all tables.
#[derive(Default)]
struct Inner {
    seq: i64,
    products: BTreeMap<i64, PricePoint>,
    inventory: BTreeMap<i64, InventoryRecord>,
    cart_lines: BTreeMap<i64, CartLine>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    shipments: BTreeMap<i64, Shipment>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }
}

/// In-memory storefront store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces a catalog price point.
    ///
    /// Catalog rows are owned by external tooling in production; tests and
    /// demos set them up through this.
    pub fn seed_product(
        &self,
        product_id: ProductId,
        price: Decimal,
        promotion_price: Option<Decimal>,
    ) {
        let mut inner = self.inner.write();
        inner.products.insert(
            product_id.get(),
            PricePoint {
                product_id,
                price,
                promotion_price,
            },
        );
    }
}
