//! Row decoding and driver error mapping.

use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use waybill_core::{
    CartLine, CartLineId, InventoryId, InventoryRecord, Order, OrderId, OrderItem, OrderItemId,
    OrderStatus, PricePoint, ProductId, Shipment, ShipmentId, ShipmentStatus, StoreError,
    StoreResult, UserId,
};

pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation(db.message().to_string())
        }
        sqlx::Error::RowNotFound => StoreError::RowNotFound(err.to_string()),
        _ => StoreError::QueryFailed(err.to_string()),
    }
}

fn decimal(row: &SqliteRow, column: &str) -> StoreResult<Decimal> {
    let raw: String = row.try_get(column).map_err(map_sqlx_err)?;
    raw.parse::<Decimal>()
        .map_err(|e| StoreError::MalformedRow(format!("{column}: {e}")))
}

fn decimal_opt(row: &SqliteRow, column: &str) -> StoreResult<Option<Decimal>> {
    let raw: Option<String> = row.try_get(column).map_err(map_sqlx_err)?;
    raw.map(|v| {
        v.parse::<Decimal>()
            .map_err(|e| StoreError::MalformedRow(format!("{column}: {e}")))
    })
    .transpose()
}

pub(crate) fn price_point(row: &SqliteRow) -> StoreResult<PricePoint> {
    Ok(PricePoint {
        product_id: ProductId::new(row.try_get("id").map_err(map_sqlx_err)?),
        price: decimal(row, "price")?,
        promotion_price: decimal_opt(row, "promotion_price")?,
    })
}

pub(crate) fn inventory(row: &SqliteRow) -> StoreResult<InventoryRecord> {
    Ok(InventoryRecord {
        id: InventoryId::new(row.try_get("id").map_err(map_sqlx_err)?),
        product_id: ProductId::new(row.try_get("product_id").map_err(map_sqlx_err)?),
        size: row.try_get("size").map_err(map_sqlx_err)?,
        color: row.try_get("color").map_err(map_sqlx_err)?,
        stock: row.try_get("stock").map_err(map_sqlx_err)?,
        last_updated: row.try_get("last_updated").map_err(map_sqlx_err)?,
    })
}

pub(crate) fn cart_line(row: &SqliteRow) -> StoreResult<CartLine> {
    Ok(CartLine {
        id: CartLineId::new(row.try_get("id").map_err(map_sqlx_err)?),
        user_id: UserId::new(row.try_get("user_id").map_err(map_sqlx_err)?),
        product_id: ProductId::new(row.try_get("product_id").map_err(map_sqlx_err)?),
        size: row.try_get("size").map_err(map_sqlx_err)?,
        color: row.try_get("color").map_err(map_sqlx_err)?,
        quantity: row.try_get("quantity").map_err(map_sqlx_err)?,
    })
}

pub(crate) fn order(row: &SqliteRow) -> StoreResult<Order> {
    let status: String = row.try_get("status").map_err(map_sqlx_err)?;
    Ok(Order {
        id: OrderId::new(row.try_get("id").map_err(map_sqlx_err)?),
        user_id: UserId::new(row.try_get("user_id").map_err(map_sqlx_err)?),
        created_at: row.try_get("created_at").map_err(map_sqlx_err)?,
        status: OrderStatus::from(status),
        fullname: row.try_get("fullname").map_err(map_sqlx_err)?,
        shipping_address: row.try_get("shipping_address").map_err(map_sqlx_err)?,
        payment_method: row.try_get("payment_method").map_err(map_sqlx_err)?,
        subtotal: decimal(row, "subtotal")?,
        tax_amount: decimal(row, "tax_amount")?,
        shipping_cost: decimal(row, "shipping_cost")?,
        total_price: decimal(row, "total_price")?,
    })
}

pub(crate) fn order_item(row: &SqliteRow) -> StoreResult<OrderItem> {
    Ok(OrderItem {
        id: OrderItemId::new(row.try_get("id").map_err(map_sqlx_err)?),
        order_id: OrderId::new(row.try_get("order_id").map_err(map_sqlx_err)?),
        product_id: ProductId::new(row.try_get("product_id").map_err(map_sqlx_err)?),
        quantity: row.try_get("quantity").map_err(map_sqlx_err)?,
        price: decimal(row, "price")?,
        size: row.try_get("size").map_err(map_sqlx_err)?,
        color: row.try_get("color").map_err(map_sqlx_err)?,
    })
}

pub(crate) fn shipment(row: &SqliteRow) -> StoreResult<Shipment> {
    let status: String = row.try_get("status").map_err(map_sqlx_err)?;
    Ok(Shipment {
        id: ShipmentId::new(row.try_get("id").map_err(map_sqlx_err)?),
        order_id: OrderId::new(row.try_get("order_id").map_err(map_sqlx_err)?),
        tracking_number: row.try_get("tracking_number").map_err(map_sqlx_err)?,
        status: ShipmentStatus::from(status),
        updated_at: row.try_get("updated_at").map_err(map_sqlx_err)?,
    })
}
