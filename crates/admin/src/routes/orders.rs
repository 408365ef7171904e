//! Order route handlers (collaborator surface behind the auth gate).
//!
//! These handlers read the principal the gate attached and do plain
//! document CRUD; they never re-derive authentication.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use orderdesk_core::{OrderNumber, OrderStatus};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// List all orders, newest first.
///
/// GET /api/admin/orders
pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let orders = OrderRepository::new(state.pool()).list_recent().await?;

    Ok(Json(json!({
        "status": "success",
        "data": orders,
    })))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// The new status value.
    pub status: Option<String>,
}

/// Update an order's status by business key.
///
/// PATCH /api/admin/orders/{order_number}/status
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let order_number = OrderNumber::parse(&order_number)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let status = body
        .status
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Status is required".to_owned()))?
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let order = OrderRepository::new(state.pool())
        .update_status(&order_number, status, Utc::now())
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound(format!("No order with number {order_number}"))
            }
            other => other.into(),
        })?;

    tracing::info!(
        admin_id = %admin.id,
        order_number = %order.order_number,
        status = %order.status,
        "order status updated"
    );

    Ok(Json(json!({
        "status": "success",
        "data": order,
    })))
}
