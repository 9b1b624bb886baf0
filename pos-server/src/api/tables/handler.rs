//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{DiningTable, TableQuery, TableStatusUpdate};

use crate::api::ok;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// GET /api/tables?area=&status=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TableQuery>,
) -> AppResult<ApiResponse<Vec<DiningTable>>> {
    Ok(ok(state.tables.list(&query).await?))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<DiningTable>> {
    Ok(ok(state.tables.get(id).await?))
}

/// GET /api/tables/{id}/availability - 开台前检查
///
/// Returns the table when a new order may be opened on it.
pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<DiningTable>> {
    Ok(ok(state.orders.validate_table_for_order(id).await?))
}

/// PUT /api/tables/{id}/status - 手动改状态 (清台, 预订)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<ApiResponse<DiningTable>> {
    Ok(ok(state.tables.update_status(id, payload.status).await?))
}
