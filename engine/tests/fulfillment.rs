//! End-to-end fulfillment scenarios, run against both store backends.

use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::Barrier;
use waybill_core::{
    Order, OrderDraft, OrderItemDraft, OrderStatus, OrderTotals, ProductId, ShipmentStatus,
    StorefrontStore, UserId, VariantKey,
};
use waybill_engine::{
    DecrementOutcome, MatchMode, ShipmentOutcome, TransitionController, TransitionOutcome,
};
use waybill_memory::MemoryStore;
use waybill_sqlite::SqliteStore;

fn item(product: i64, quantity: i64, size: Option<&str>, color: Option<&str>) -> OrderItemDraft {
    OrderItemDraft {
        product_id: ProductId::new(product),
        quantity,
        price: dec!(10),
        size: size.map(str::to_string),
        color: color.map(str::to_string),
    }
}

async fn seed_order<S: StorefrontStore>(store: &S, items: &[OrderItemDraft]) -> Order {
    let order = store
        .insert_order(OrderDraft {
            user_id: UserId::new(1),
            status: OrderStatus::Processing,
            fullname: None,
            shipping_address: None,
            payment_method: "card".to_string(),
            totals: OrderTotals::from_subtotal(dec!(30)),
        })
        .await
        .unwrap();
    store.insert_order_items(order.id, items).await.unwrap();
    order
}

async fn stock_of<S: StorefrontStore>(store: &S, product: i64, key: &VariantKey) -> i64 {
    store
        .find_variant(ProductId::new(product), key)
        .await
        .unwrap()
        .unwrap()
        .stock
}

/// Success transition provisions one pending shipment, decrements each item,
/// and turns every later success request into a no-op.
async fn success_fulfills_once<S: StorefrontStore + 'static>(store: Arc<S>) {
    store
        .upsert_variant(ProductId::new(1), &VariantKey::bare(), 5)
        .await
        .unwrap();
    store
        .upsert_variant(ProductId::new(2), &VariantKey::bare(), 4)
        .await
        .unwrap();
    let order = seed_order(&*store, &[item(1, 2, None, None), item(2, 1, None, None)]).await;

    let controller = TransitionController::new(Arc::clone(&store));
    let first = controller
        .transition(order.id, OrderStatus::Success)
        .await
        .unwrap();
    let TransitionOutcome::Fulfilled(effects) = &first.outcome else {
        panic!("expected fulfillment, got {:?}", first.outcome);
    };
    assert!(effects.is_complete());

    let ShipmentOutcome::Provisioned(shipment) = &effects.shipment else {
        panic!("expected a fresh shipment, got {:?}", effects.shipment);
    };
    assert_eq!(shipment.status, ShipmentStatus::Pending);
    assert!(shipment.tracking_number.starts_with("TRK-"));

    assert_eq!(stock_of(&*store, 1, &VariantKey::bare()).await, 3);
    assert_eq!(stock_of(&*store, 2, &VariantKey::bare()).await, 3);

    let second = controller
        .transition(order.id, OrderStatus::Success)
        .await
        .unwrap();
    assert!(matches!(second.outcome, TransitionOutcome::Duplicate));
    assert_eq!(stock_of(&*store, 1, &VariantKey::bare()).await, 3);
    assert_eq!(stock_of(&*store, 2, &VariantKey::bare()).await, 3);

    let stored = store.find_by_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.tracking_number, shipment.tracking_number);
}

/// An exact variant row wins over a bigger fallback row; an unknown variant
/// falls back to the highest-stock row for the product.
async fn resolver_precedence<S: StorefrontStore + 'static>(store: Arc<S>) {
    let exact = store
        .upsert_variant(
            ProductId::new(1),
            &VariantKey::new(Some("M"), Some("Black")),
            5,
        )
        .await
        .unwrap();
    let bare = store
        .upsert_variant(ProductId::new(1), &VariantKey::bare(), 9)
        .await
        .unwrap();

    let order = seed_order(
        &*store,
        &[
            item(1, 1, Some("M"), Some("Black")),
            item(1, 1, Some("S"), Some("Red")),
        ],
    )
    .await;

    let controller = TransitionController::new(Arc::clone(&store));
    let report = controller
        .transition(order.id, OrderStatus::Success)
        .await
        .unwrap();
    let TransitionOutcome::Fulfilled(effects) = &report.outcome else {
        panic!("expected fulfillment, got {:?}", report.outcome);
    };

    match &effects.items[0].outcome {
        DecrementOutcome::Applied {
            inventory_id, mode, ..
        } => {
            assert_eq!(*inventory_id, exact.id);
            assert_eq!(*mode, MatchMode::Exact);
        }
        other => panic!("expected exact decrement, got {other:?}"),
    }
    match &effects.items[1].outcome {
        DecrementOutcome::Applied {
            inventory_id, mode, ..
        } => {
            assert_eq!(*inventory_id, bare.id);
            assert_eq!(*mode, MatchMode::Fallback);
        }
        other => panic!("expected fallback decrement, got {other:?}"),
    }

    assert_eq!(
        stock_of(&*store, 1, &VariantKey::new(Some("M"), Some("Black"))).await,
        4
    );
    assert_eq!(stock_of(&*store, 1, &VariantKey::bare()).await, 8);
}

/// Over-decrement floors the row at zero instead of going negative.
async fn decrement_floors_at_zero<S: StorefrontStore + 'static>(store: Arc<S>) {
    store
        .upsert_variant(ProductId::new(1), &VariantKey::bare(), 1)
        .await
        .unwrap();
    let order = seed_order(&*store, &[item(1, 3, None, None)]).await;

    let controller = TransitionController::new(Arc::clone(&store));
    let report = controller
        .transition(order.id, OrderStatus::Success)
        .await
        .unwrap();
    let TransitionOutcome::Fulfilled(effects) = &report.outcome else {
        panic!("expected fulfillment, got {:?}", report.outcome);
    };
    match &effects.items[0].outcome {
        DecrementOutcome::Applied { remaining, .. } => assert_eq!(*remaining, 0),
        other => panic!("expected applied decrement, got {other:?}"),
    }
    assert_eq!(stock_of(&*store, 1, &VariantKey::bare()).await, 0);
}

/// N concurrent success requests for one order: exactly one runs the side
/// effects, the rest observe a duplicate.
async fn concurrent_success_fulfills_once<S: StorefrontStore + 'static>(store: Arc<S>) {
    store
        .upsert_variant(ProductId::new(1), &VariantKey::bare(), 10)
        .await
        .unwrap();
    let order = seed_order(&*store, &[item(1, 2, None, None)]).await;

    let controller = TransitionController::new(Arc::clone(&store));
    let barrier = Arc::new(Barrier::new(8));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let controller = controller.clone();
        let barrier = Arc::clone(&barrier);
        let order_id = order.id;
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            controller
                .transition(order_id, OrderStatus::Success)
                .await
                .unwrap()
        }));
    }

    let mut fulfilled = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap().outcome {
            TransitionOutcome::Fulfilled(effects) => {
                assert!(effects.is_complete());
                fulfilled += 1;
            }
            TransitionOutcome::Duplicate => duplicates += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(fulfilled, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(stock_of(&*store, 1, &VariantKey::bare()).await, 8);
    assert!(store.find_by_order(order.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_success_fulfills_once_memory() {
    success_fulfills_once(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_success_fulfills_once_sqlite() {
    success_fulfills_once(Arc::new(SqliteStore::in_memory().await.unwrap())).await;
}

#[tokio::test]
async fn test_resolver_precedence_memory() {
    resolver_precedence(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_resolver_precedence_sqlite() {
    resolver_precedence(Arc::new(SqliteStore::in_memory().await.unwrap())).await;
}

#[tokio::test]
async fn test_decrement_floors_at_zero_memory() {
    decrement_floors_at_zero(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_decrement_floors_at_zero_sqlite() {
    decrement_floors_at_zero(Arc::new(SqliteStore::in_memory().await.unwrap())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_success_fulfills_once_memory() {
    concurrent_success_fulfills_once(Arc::new(MemoryStore::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_success_fulfills_once_sqlite() {
    concurrent_success_fulfills_once(Arc::new(SqliteStore::in_memory().await.unwrap())).await;
}
