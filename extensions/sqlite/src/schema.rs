//! Schema bootstrap.

/// Tables and indexes the store prepares on connect.
///
/// Money columns hold decimal strings; the arithmetic happens engine-side
/// and the stored text round-trips exactly. The expression unique index is
/// the variant identity: SQL UNIQUE treats two NULLs as distinct, so
/// `COALESCE` folds null size/color to `''` for uniqueness while the columns
/// keep storing real NULLs.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id              INTEGER PRIMARY KEY,
    price           TEXT NOT NULL,
    promotion_price TEXT
);

CREATE TABLE IF NOT EXISTS inventory (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id   INTEGER NOT NULL,
    size         TEXT,
    color        TEXT,
    stock        INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_inventory_variant
    ON inventory (product_id, COALESCE(color, ''), COALESCE(size, ''));

CREATE TABLE IF NOT EXISTS cart_lines (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    product_id INTEGER NOT NULL,
    size       TEXT,
    color      TEXT,
    quantity   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cart_lines_user ON cart_lines (user_id);

CREATE TABLE IF NOT EXISTS orders (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL,
    created_at       TEXT NOT NULL,
    status           TEXT NOT NULL,
    fullname         TEXT,
    shipping_address TEXT,
    payment_method   TEXT NOT NULL,
    subtotal         TEXT NOT NULL,
    tax_amount       TEXT NOT NULL,
    shipping_cost    TEXT NOT NULL,
    total_price      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders (user_id);

CREATE TABLE IF NOT EXISTS order_items (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id   INTEGER NOT NULL REFERENCES orders (id),
    product_id INTEGER NOT NULL,
    quantity   INTEGER NOT NULL,
    price      TEXT NOT NULL,
    size       TEXT,
    color      TEXT
);

CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_id);

CREATE TABLE IF NOT EXISTS shipments (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id        INTEGER NOT NULL UNIQUE REFERENCES orders (id),
    tracking_number TEXT NOT NULL UNIQUE,
    status          TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
"#;
