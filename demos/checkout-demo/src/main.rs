// Checkout Demo for Waybill
//
// Walks the full storefront flow: seed a catalog, fill a cart (with stock
// clamping), place an order, then drive the success transition twice to
// show that fulfillment runs exactly once.
//
// Runs in memory by default; pass `--sqlite <path>` to use a database file.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal_macros::dec;
use waybill_core::prelude::*;
use waybill_engine::prelude::*;
use waybill_memory::MemoryStore;
use waybill_sqlite::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let sqlite_path = args
        .windows(2)
        .find(|w| w[0] == "--sqlite")
        .map(|w| w[1].clone());

    match sqlite_path {
        Some(path) => {
            println!("🔌 Opening SQLite database at {path}...");
            let store = Arc::new(SqliteStore::connect(&path).await?);
            store.seed_product(ProductId::new(1), dec!(24.50), None).await?;
            store
                .seed_product(ProductId::new(2), dec!(89.90), Some(dec!(74.90)))
                .await?;
            store.seed_product(ProductId::new(3), dec!(18.00), None).await?;
            run(store).await
        }
        None => {
            println!("🔌 Using the in-memory store (pass --sqlite <path> for a file)...");
            let store = Arc::new(MemoryStore::new());
            store.seed_product(ProductId::new(1), dec!(24.50), None);
            store.seed_product(ProductId::new(2), dec!(89.90), Some(dec!(74.90)));
            store.seed_product(ProductId::new(3), dec!(18.00), None);
            run(store).await
        }
    }
}

async fn run<S: StorefrontStore + 'static>(store: Arc<S>) -> Result<()> {
    // Inventory: the tee has sized rows, the jacket and cap a single row.
    store
        .upsert_variant(ProductId::new(1), &VariantKey::new(Some("M"), Some("Black")), 8)
        .await?;
    store
        .upsert_variant(ProductId::new(1), &VariantKey::new(Some("L"), Some("Black")), 3)
        .await?;
    store
        .upsert_variant(ProductId::new(2), &VariantKey::bare(), 5)
        .await?;
    store
        .upsert_variant(ProductId::new(3), &VariantKey::bare(), 2)
        .await?;
    println!("✅ Catalog and inventory seeded\n");

    let shop = Storefront::new(Arc::clone(&store));
    let user = UserId::new(1);

    // Step 1: Fill the cart. The cap request exceeds stock and gets clamped.
    println!("🛒 Adding to cart...");
    shop.add_to_cart(
        user,
        ProductId::new(1),
        VariantKey::new(Some("M"), Some("Black")),
        2,
    )
    .await?;
    shop.add_to_cart(user, ProductId::new(2), VariantKey::bare(), 1)
        .await?;
    let capped = shop
        .add_to_cart(user, ProductId::new(3), VariantKey::bare(), 4)
        .await?;
    println!("   Asked for 4 caps, got {} (stock limit)", capped.quantity);

    for line in shop.cart_lines(user).await? {
        println!(
            "   line {}: product {} [{}] x{}",
            line.id,
            line.product_id,
            line.variant(),
            line.quantity
        );
    }

    // Step 2: Checkout. Unit prices are snapshotted, promotion included.
    println!("\n💳 Placing order...");
    let order = shop
        .place_order(
            user,
            CheckoutRequest {
                fullname: Some("Avery Lim".to_string()),
                shipping_address: Some("4 Quay Lane".to_string()),
                payment_method: None,
            },
        )
        .await?;
    println!("✅ Order {} placed ({})", order.id, order.payment_method);
    println!("   subtotal  {:>8}", order.subtotal);
    println!("   tax (6%)  {:>8}", order.tax_amount);
    println!("   shipping  {:>8}", order.shipping_cost);
    println!("   total     {:>8}", order.total_price);

    // Step 3: Mark the order successful. This provisions the shipment and
    // decrements stock.
    println!("\n🚚 Marking order successful...");
    let report = shop
        .update_order_status(order.id, OrderStatus::Success)
        .await?;
    print_report(&report);

    // Step 4: Send success again. The claim is already spent, so the
    // second call is a no-op.
    println!("\n🔁 Sending success again...");
    let report = shop
        .update_order_status(order.id, OrderStatus::Success)
        .await?;
    print_report(&report);

    // Step 5: A non-success status passes straight through.
    println!("\n📦 Marking order shipped...");
    let report = shop
        .update_order_status(order.id, OrderStatus::Shipped)
        .await?;
    print_report(&report);

    println!("\n📊 Remaining stock:");
    for product in [ProductId::new(1), ProductId::new(2), ProductId::new(3)] {
        for row in store.variants_for_product(product).await? {
            println!("   product {} [{}]: {}", product, row.variant(), row.stock);
        }
    }

    let detail = shop.order_detail(order.id).await?;
    let tracking = detail
        .shipment
        .map(|s| s.tracking_number)
        .unwrap_or_else(|| "<none>".to_string());
    println!(
        "\n🧾 Order {} is {} with {} item(s), shipment {}",
        detail.order.id,
        detail.order.status,
        detail.items.len(),
        tracking
    );

    Ok(())
}

fn print_report(report: &TransitionReport) {
    match &report.outcome {
        TransitionOutcome::Fulfilled(effects) => {
            match &effects.shipment {
                ShipmentOutcome::Provisioned(s) => {
                    println!("✅ Shipment {} ({})", s.tracking_number, s.status)
                }
                ShipmentOutcome::AlreadyPresent => println!("   Shipment already existed"),
                ShipmentOutcome::Failed(e) => println!("❌ Shipment failed: {e}"),
            }
            for item in &effects.items {
                match &item.outcome {
                    DecrementOutcome::Applied {
                        mode, remaining, ..
                    } => println!(
                        "   -{} product {} ({:?} match), {} left",
                        item.quantity, item.product_id, mode, remaining
                    ),
                    DecrementOutcome::Unmatched => println!(
                        "   product {}: no inventory row, skipped",
                        item.product_id
                    ),
                    DecrementOutcome::Failed(e) => {
                        println!("❌ product {}: decrement failed: {e}", item.product_id)
                    }
                }
            }
        }
        TransitionOutcome::Duplicate => println!("   Already successful, nothing to do"),
        TransitionOutcome::StatusSet { updated: true } => {
            println!("✅ Status set to {}", report.requested)
        }
        TransitionOutcome::StatusSet { updated: false } => {
            println!("❌ No order matched")
        }
        TransitionOutcome::UnknownOrder => println!("❌ Unknown order"),
    }
}
