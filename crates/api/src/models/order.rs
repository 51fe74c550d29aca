//! Order domain types.
//!
//! An order is the durable record of a checkout session. Its unique Stripe
//! session id plus the pending-to-paid status transition is what makes
//! confirmation idempotent: a session that is already `paid` is never settled
//! a second time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ecostore_core::{OrderId, ProductId, UserId};

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Session created, payment not yet confirmed.
    Pending,
    /// Payment confirmed and stock applied.
    Paid,
    /// Canceled before payment.
    Canceled,
    /// Confirmation failed (payment incomplete or stock exhausted).
    Failed,
}

impl OrderStatus {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "canceled" => Ok(Self::Canceled),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// An order (domain type).
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Buying user.
    pub user_id: UserId,
    /// External Stripe checkout-session identifier. Unique.
    pub session_id: String,
    /// Subtotal at session-creation time.
    pub subtotal: Decimal,
    /// Tax at session-creation time.
    pub tax: Decimal,
    /// Grand total charged.
    pub total: Decimal,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the order last changed state.
    pub updated_at: DateTime<Utc>,
}

/// One purchased line, snapshotted at session-creation time.
#[derive(Debug, Clone)]
pub struct OrderLine {
    /// The purchased product.
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    /// Unit price the buyer was quoted.
    pub unit_price: Decimal,
    /// Units purchased.
    pub quantity: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Canceled,
            OrderStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_unknown() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
