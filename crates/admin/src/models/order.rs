//! Order domain type (collaborator surface).
//!
//! The back office treats orders as plain documents: list newest-first and
//! patch a status field by business key. No business rules live here.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orderdesk_core::{Email, OrderId, OrderNumber, OrderStatus};

/// An order as shown in the back office.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Internal record ID.
    pub id: OrderId,
    /// Human-facing order number (business key).
    pub order_number: OrderNumber,
    /// Customer contact email.
    pub customer_email: Email,
    /// Current order status (write-once unchecked).
    pub status: OrderStatus,
    /// Order total in cents.
    pub total_cents: i64,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}
