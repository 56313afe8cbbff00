//! Order API handlers
//!
//! Creation persists first, then fires the notification fan-out on a
//! detached task; the client gets its id as soon as the write commits.

use crate::core::ServerState;
use crate::orders::builder::build_order;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use shared::Json;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::order::{Order, OrderStatus, OrderSubmission, OrderSummary};
use tracing::info;

#[derive(Serialize)]
pub struct Created {
    pub id: String,
}

/// POST /orders
pub async fn create(
    State(state): State<ServerState>,
    Json(submission): Json<OrderSubmission>,
) -> AppResult<ApiResponse<Created>> {
    let order = build_order(&submission, &state.config.catalog, &state.config.district_fees)?;
    state.storage.create(&order)?;

    info!(
        order_id = %order.id,
        stores = order.store_keys.len(),
        payment = %order.payment,
        "[API] Order created"
    );

    // Initial broadcast never blocks the response
    let notifier = state.notifier.clone();
    let broadcast_order = order.clone();
    tokio::spawn(async move {
        notifier.order_created(&broadcast_order).await;
    });

    Ok(ApiResponse::success(Created { id: order.id }))
}

#[derive(Serialize)]
pub struct OrderList {
    pub orders: Vec<OrderSummary>,
}

/// GET /orders - the bounded recency index, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<OrderList>> {
    let orders = state.storage.list()?;
    Ok(ApiResponse::success(OrderList { orders }))
}

#[derive(Serialize)]
pub struct OrderDetail {
    pub order: Order,
}

/// GET /orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = state
        .storage
        .get(&id)?
        .ok_or_else(|| AppError::order_not_found(&id))?;
    Ok(ApiResponse::success(OrderDetail { order }))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: String,
}

#[derive(Serialize)]
pub struct StatusSummary {
    pub id: String,
    pub status: OrderStatus,
    pub updated_at: i64,
}

/// GET /order-status?id= - compact summary for storefront polling
pub async fn status(
    State(state): State<ServerState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<ApiResponse<StatusSummary>> {
    let order = state
        .storage
        .get(&query.id)?
        .ok_or_else(|| AppError::order_not_found(&query.id))?;
    Ok(ApiResponse::success(StatusSummary {
        id: order.id,
        status: order.status,
        updated_at: order.updated_at,
    }))
}
