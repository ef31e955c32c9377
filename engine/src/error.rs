//! Engine-level errors.

use thiserror::Error;
use waybill_core::{ProductId, StoreError};

/// Failure surfaced by an engine operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The requested variant has no stock row, or its stock is zero.
    #[error("Out of stock: product {0}")]
    OutOfStock(ProductId),

    /// Checkout was requested for a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// No inventory row exists for the product in either resolution mode.
    #[error("No inventory for product {0}")]
    InventoryNotFound(ProductId),

    /// A cart line was addressed that does not exist for the user.
    #[error("Cart line not found")]
    LineNotFound,

    /// An order was addressed that does not exist.
    #[error("Order not found")]
    OrderNotFound,

    /// Reserved for stricter transition tables. The current state machine
    /// accepts any status as a pass-through, so nothing raises this yet.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The persistence backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
