//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Payment, PaymentMethod, PaymentReceipt, PaymentRequest};

use crate::api::{RequestActor, ok};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// POST /api/payments - 结账
pub async fn process(
    State(state): State<ServerState>,
    RequestActor(actor): RequestActor,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<ApiResponse<PaymentReceipt>> {
    Ok(ok(state.payments.process_payment(&payload, actor).await?))
}

/// GET /api/payments/methods
pub async fn methods(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<PaymentMethod>>> {
    Ok(ok(state.payments.list_methods().await?))
}

/// GET /api/payments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Payment>> {
    Ok(ok(state.payments.get_payment(id).await?))
}
