// # Waybill SQLite Store
//
// `StorefrontStore` over sqlx + SQLite. Every conditional operation is a
// single SQL statement (conditional UPDATE, INSERT .. ON CONFLICT), so the
// engine's exactly-once invariants hold without advisory locks; the compound
// checkout write runs in a real transaction.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;
use waybill_core::{ProductId, StoreError, StoreResult};

mod row;
mod schema;
mod store;

pub use schema::SCHEMA;

/// SQLite-backed storefront store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: sqlx::SqlitePool,
}

impl SqliteStore {
    /// Opens a database file, creating it if missing, and prepares the
    /// schema.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Configuration(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        Self::bootstrap(pool).await
    }

    /// Fresh private in-memory database, mainly for tests and demos.
    ///
    /// The pool is pinned to one connection: every pooled connection would
    /// otherwise open its own empty `:memory:` database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        Self::bootstrap(pool).await
    }

    async fn bootstrap(pool: sqlx::SqlitePool) -> StoreResult<Self> {
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(row::map_sqlx_err)?;
        debug!("Schema prepared");
        Ok(Self { pool })
    }

    /// The underlying `sqlx::SqlitePool`.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    /// Seeds or replaces a catalog price point.
    ///
    /// Catalog rows are owned by external tooling in production; tests and
    /// demos set them up through this.
    pub async fn seed_product(
        &self,
        product_id: ProductId,
        price: Decimal,
        promotion_price: Option<Decimal>,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO products (id, price, promotion_price) VALUES (?1, ?2, ?3) \
             ON CONFLICT(id) DO UPDATE SET price = excluded.price, \
             promotion_price = excluded.promotion_price",
        )
        .bind(product_id.get())
        .bind(price.to_string())
        .bind(promotion_price.map(|p| p.to_string()))
        .execute(&self.pool)
        .await
        .map_err(row::map_sqlx_err)?;
        Ok(())
    }
}
