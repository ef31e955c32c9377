//! Store-level behavior against a real SQLite database.

use rust_decimal_macros::dec;
use waybill_core::{
    CartStore, CatalogStore, InventoryId, InventoryStore, NewCartLine, OrderDraft, OrderId,
    OrderItemDraft, OrderStatus, OrderStore, OrderTotals, ProductId, ShipmentStatus,
    ShipmentStore, StorefrontStore, UserId, VariantKey,
};
use waybill_sqlite::SqliteStore;

async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.unwrap()
}

fn draft(user: i64) -> OrderDraft {
    OrderDraft {
        user_id: UserId::new(user),
        status: OrderStatus::Processing,
        fullname: Some("Jo Chen".to_string()),
        shipping_address: Some("12 Pier Rd".to_string()),
        payment_method: "card".to_string(),
        totals: OrderTotals::from_subtotal(dec!(100)),
    }
}

#[tokio::test]
async fn test_price_points_round_trip() {
    let store = store().await;
    store
        .seed_product(ProductId::new(1), dec!(49.99), Some(dec!(39.99)))
        .await
        .unwrap();
    store
        .seed_product(ProductId::new(2), dec!(15), None)
        .await
        .unwrap();

    let points = store
        .price_points(&[ProductId::new(1), ProductId::new(2), ProductId::new(404)])
        .await
        .unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].promotion_price, Some(dec!(39.99)));
    assert_eq!(points[0].effective(), dec!(39.99));
    assert_eq!(points[1].promotion_price, None);
    assert_eq!(points[1].effective(), dec!(15));
}

#[tokio::test]
async fn test_claim_success_flips_exactly_once() {
    let store = store().await;
    let order = store.insert_order(draft(1)).await.unwrap();

    assert!(store.claim_success(order.id).await.unwrap());
    assert!(!store.claim_success(order.id).await.unwrap());
    assert!(!store.claim_success(OrderId::new(999)).await.unwrap());

    let stored = store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Success);
}

#[tokio::test]
async fn test_decrement_floors_at_zero() {
    let store = store().await;
    let record = store
        .upsert_variant(ProductId::new(1), &VariantKey::bare(), 3)
        .await
        .unwrap();

    assert_eq!(store.decrement_stock(record.id, 2).await.unwrap(), Some(1));
    assert_eq!(store.decrement_stock(record.id, 5).await.unwrap(), Some(0));
    assert_eq!(
        store.decrement_stock(InventoryId::new(999), 1).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_find_variant_matches_null_for_null() {
    let store = store().await;
    let product = ProductId::new(7);
    store
        .upsert_variant(product, &VariantKey::bare(), 9)
        .await
        .unwrap();
    let black = store
        .upsert_variant(product, &VariantKey::new(Some("M"), Some("Black")), 5)
        .await
        .unwrap();

    let exact = store
        .find_variant(product, &VariantKey::new(Some("M"), Some("Black")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exact.id, black.id);

    let bare = store
        .find_variant(product, &VariantKey::bare())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bare.stock, 9);

    let missing = store
        .find_variant(product, &VariantKey::new(Some("M"), Some("Red")))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_variant_unique_index_folds_nulls() {
    let store = store().await;
    let insert = "INSERT INTO inventory (product_id, size, color, stock, last_updated) \
                  VALUES (1, NULL, NULL, 5, '2024-01-01T00:00:00Z')";

    sqlx::query(insert).execute(store.pool()).await.unwrap();
    let err = sqlx::query(insert).execute(store.pool()).await.unwrap_err();
    match err {
        sqlx::Error::Database(db) => assert!(db.is_unique_violation()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_upsert_updates_existing_variant_row() {
    let store = store().await;
    let product = ProductId::new(3);
    let key = VariantKey::new(None, Some("Blue"));

    let first = store.upsert_variant(product, &key, 4).await.unwrap();
    let second = store.upsert_variant(product, &key, 11).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.stock, 11);
    assert_eq!(store.variants_for_product(product).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_shipment_insert_is_unique_per_order() {
    let store = store().await;
    let order = store.insert_order(draft(1)).await.unwrap();

    let first = store.insert_for_order(order.id, "TRK-A").await.unwrap();
    assert!(first.is_some());
    let second = store.insert_for_order(order.id, "TRK-B").await.unwrap();
    assert!(second.is_none());

    let stored = store.find_by_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.tracking_number, "TRK-A");
    assert_eq!(stored.status, ShipmentStatus::Pending);
}

#[tokio::test]
async fn test_place_order_writes_everything_and_clears_cart() {
    let store = store().await;
    let user = UserId::new(3);
    store
        .insert_line(NewCartLine {
            user_id: user,
            product_id: ProductId::new(1),
            size: Some("M".to_string()),
            color: Some("Black".to_string()),
            quantity: 2,
        })
        .await
        .unwrap();

    let items = vec![
        OrderItemDraft {
            product_id: ProductId::new(1),
            quantity: 2,
            price: dec!(50),
            size: Some("M".to_string()),
            color: Some("Black".to_string()),
        },
        OrderItemDraft {
            product_id: ProductId::new(2),
            quantity: 1,
            price: dec!(19.99),
            size: None,
            color: None,
        },
    ];
    let order = store.place_order(draft(3), &items).await.unwrap();

    let stored_items = store.items_for_order(order.id).await.unwrap();
    assert_eq!(stored_items.len(), 2);
    assert_eq!(stored_items[0].price, dec!(50));
    assert_eq!(stored_items[1].price, dec!(19.99));
    assert!(store.lines_for_user(user).await.unwrap().is_empty());

    // Money survives the text round trip unchanged.
    let stored = store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.subtotal, order.subtotal);
    assert_eq!(stored.total_price, order.total_price);
}

#[tokio::test]
async fn test_orders_for_user_newest_first() {
    let store = store().await;
    let first = store.insert_order(draft(9)).await.unwrap();
    let second = store.insert_order(draft(9)).await.unwrap();
    store.insert_order(draft(8)).await.unwrap();

    let orders = store.orders_for_user(UserId::new(9)).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, second.id);
    assert_eq!(orders[1].id, first.id);
}
