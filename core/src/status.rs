//! Order and shipment status vocabularies.
//!
//! Both vocabularies are open: unknown strings round-trip through the
//! `Other` variant instead of being rejected, so admin tooling can introduce
//! states without a schema change here. `success` is the only order status
//! the engine attaches side effects to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Processing,
    Success,
    Cancelled,
    Shipped,
    Delivered,
    /// Pass-through for states this engine does not interpret.
    Other(String),
}

impl OrderStatus {
    /// Canonical storage form. Known states are lowercase; `Other` keeps the
    /// caller's spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this is the fulfillment trigger state.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "processing" => Self::Processing,
            "success" => Self::Success,
            "cancelled" => Self::Cancelled,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery progress of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShipmentStatus {
    Pending,
    Shipped,
    Delivered,
    /// Pass-through for states this engine does not interpret.
    Other(String),
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for ShipmentStatus {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl From<String> for ShipmentStatus {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<ShipmentStatus> for String {
    fn from(status: ShipmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
