//! `AppError` and the JSON envelope every POS endpoint answers with

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error raised by the order, kitchen, payment and table services
///
/// `details` carries the ids and amounts a terminal needs to explain the
/// failure, e.g. `final_amount` and `amount_paid` on `INSUFFICIENT_PAYMENT`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's stock message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one detail entry; later keys overwrite earlier ones
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    /// Malformed input (`VALIDATION_FAILED`)
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Missing row without a dedicated code, e.g. `"Order 12"`
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{r} not found")).with_detail("resource", r)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Unique constraint hit (a second unsettled order, a second payment)
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }
}

/// Response envelope
///
/// Success: `{"code": 0, "message": "OK", "data": ...}`.
/// Failure: `{"code": 7002, "error": "TABLE_NEEDS_CLEANING", "message": ..., "details": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Stable error name, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            error: None,
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            error: Some(err.code.name().to_string()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        match self.code.category() {
            ErrorCategory::System => {
                tracing::error!(code = %self.code, message = %self.message, "System error occurred");
            }
            category => {
                tracing::debug!(code = %self.code, category = category.name(), message = %self.message, "Request rejected");
            }
        }

        let status = self.http_status();
        (status, Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::TableNotFound);
        assert_eq!(err.code, ErrorCode::TableNotFound);
        assert_eq!(err.message, "Table not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_insufficient_payment_details() {
        let err = AppError::with_message(ErrorCode::InsufficientPayment, "Payment short by 0.01")
            .with_detail("final_amount", 22.0)
            .with_detail("amount_paid", 21.99);
        let details = err.details.as_ref().unwrap();
        assert_eq!(details["final_amount"], Value::from(22.0));
        assert_eq!(details["amount_paid"], Value::from(21.99));
        assert_eq!(err.to_string(), "Payment short by 0.01");
    }

    #[test]
    fn test_not_found_constructor() {
        let err = AppError::not_found("Order 12");
        assert!(err.is(ErrorCode::NotFound));
        assert_eq!(err.message, "Order 12 not found");
        assert_eq!(err.details.unwrap()["resource"], "Order 12");
    }

    #[test]
    fn test_error_envelope() {
        let err = AppError::new(ErrorCode::TableNeedsCleaning).with_detail("table_id", 2);
        let json = serde_json::to_value(ApiResponse::<()>::error(&err)).unwrap();
        assert_eq!(json["code"], ErrorCode::TableNeedsCleaning.code());
        assert_eq!(json["error"], "TABLE_NEEDS_CLEANING");
        assert_eq!(json["details"]["table_id"], 2);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2, 3])).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("error").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let resp = AppError::new(ErrorCode::InvalidStatusTransition).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp = AppError::new(ErrorCode::InsufficientPayment).into_response();
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
        let resp = ApiResponse::success("ok").into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
