//! Kitchen API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    KitchenArea, KitchenQueueEntry, KitchenQueueQuery, KitchenStatusChange, KitchenStatusUpdate,
    KitchenTicket,
};

use crate::api::ok;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/kitchen/queue?kitchen_area_id=&status=pending,cooking
pub async fn queue(
    State(state): State<ServerState>,
    Query(query): Query<KitchenQueueQuery>,
) -> AppResult<ApiResponse<Vec<KitchenQueueEntry>>> {
    Ok(ok(state.kitchen.get_queue(&query).await?))
}

/// GET /api/kitchen/areas
pub async fn areas(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<KitchenArea>>> {
    Ok(ok(state.kitchen.list_areas().await?))
}

/// GET /api/kitchen/items/{id}
pub async fn get_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<KitchenTicket>> {
    Ok(ok(state.kitchen.get_ticket(id).await?))
}

/// PUT /api/kitchen/items/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<KitchenStatusUpdate>,
) -> AppResult<ApiResponse<KitchenStatusChange>> {
    Ok(ok(state.kitchen.update_status(id, payload.status).await?))
}

/// PUT /api/kitchen/items/{id}/priority
pub async fn mark_priority(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<KitchenTicket>> {
    Ok(ok(state.kitchen.mark_priority(id).await?))
}
