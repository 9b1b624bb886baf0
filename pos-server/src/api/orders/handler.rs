//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    DiscountApplied, DiscountRequest, KitchenDispatch, Order, OrderCreate, OrderDetail,
    OrderLineInput, OrderQuery, OrderTotals, Payment, SplitBill, SplitRequest,
};

use crate::api::{RequestActor, ok};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// Batch of lines to add
#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<OrderLineInput>,
}

/// Overrides for a totals recomputation
#[derive(Debug, Default, Deserialize)]
pub struct TotalsRequest {
    pub discount: Option<f64>,
    pub tax_rate: Option<f64>,
}

/// POST /api/orders - 开台
pub async fn open(
    State(state): State<ServerState>,
    RequestActor(actor): RequestActor,
    Json(payload): Json<OrderCreate>,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .orders
        .get_or_create_order_for_table(&payload, actor)
        .await?;
    Ok(ok(order))
}

/// GET /api/orders - 订单列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<ApiResponse<Vec<Order>>> {
    Ok(ok(state.orders.list_orders(&query).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<OrderDetail>> {
    Ok(ok(state.orders.get_order_detail(id).await?))
}

/// POST /api/orders/{id}/items - 批量加菜 (全部成功或全部失败)
pub async fn add_items(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddItemsRequest>,
) -> AppResult<ApiResponse<OrderDetail>> {
    Ok(ok(state.orders.add_items_to_order(id, &payload.items).await?))
}

/// DELETE /api/orders/{id}/items/{line_id}
pub async fn remove_line(
    State(state): State<ServerState>,
    Path((id, line_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<OrderDetail>> {
    Ok(ok(state.orders.remove_pending_line(id, line_id).await?))
}

/// POST /api/orders/{id}/send-to-kitchen
pub async fn send_to_kitchen(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<KitchenDispatch>> {
    Ok(ok(state.orders.send_order_to_kitchen(id).await?))
}

/// POST /api/orders/{id}/totals - 重算并保存账单
pub async fn totals(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    RequestActor(actor): RequestActor,
    Json(payload): Json<TotalsRequest>,
) -> AppResult<ApiResponse<OrderTotals>> {
    let totals = state
        .orders
        .calculate_order_totals(id, payload.discount, payload.tax_rate, actor)
        .await?;
    Ok(ok(totals))
}

/// POST /api/orders/{id}/split
pub async fn split(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SplitRequest>,
) -> AppResult<ApiResponse<SplitBill>> {
    Ok(ok(state.payments.split_bill(id, &payload).await?))
}

/// POST /api/orders/{id}/discount
pub async fn discount(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    RequestActor(actor): RequestActor,
    Json(payload): Json<DiscountRequest>,
) -> AppResult<ApiResponse<DiscountApplied>> {
    Ok(ok(state.payments.apply_discount(id, &payload, actor).await?))
}

/// GET /api/orders/{id}/payment
pub async fn payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Payment>> {
    Ok(ok(state.payments.get_payment_for_order(id).await?))
}
