//! Store-level errors.

use thiserror::Error;

/// Failure surfaced by a persistence backend.
///
/// Backends map their native driver errors into these variants so the engine
/// can react uniformly; payload strings keep the backend detail for logs.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Malformed row: {0}")]
    MalformedRow(String),

    #[error("Store configuration error: {0}")]
    Configuration(String),
}

/// Convenience alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
