//! API 路由模块
//!
//! Thin HTTP adapter over the services in [`ServerState`]. Every success
//! body is an [`ApiResponse`]; errors render through `AppError`.
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 开台、点单、送厨、账单计算
//! - [`kitchen`] - 厨房队列
//! - [`payments`] - 结账
//! - [`tables`] - 桌台
//! - [`events`] - 实时通知 (SSE)

pub mod events;
pub mod health;
pub mod kitchen;
pub mod orders;
pub mod payments;
pub mod tables;

use std::time::Duration;

use axum::Router;
use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderName, HeaderValue};
use shared::models::Actor;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::{Config, ServerState};
use crate::utils::{ApiResponse, AppError};

/// Header carrying the acting staff member's id
pub const USER_ID_HEADER: &str = "x-user-id";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Acting user taken from `x-user-id`; absent means a system action
#[derive(Debug, Clone, Copy)]
pub struct RequestActor(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for RequestActor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_ID_HEADER) {
            None => Ok(Self(Actor::system())),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .map(|id| Self(Actor::user(id)))
                .ok_or_else(|| AppError::validation(format!("{USER_ID_HEADER} must be an integer"))),
        }
    }
}

/// Wrap a payload in a success envelope
pub fn ok<T>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

/// Request/response routes (no middleware, no state); the event stream
/// is added by [`build_app`]
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(kitchen::router())
        .merge(payments::router())
        .merge(tables::router())
}

/// Build the application with middleware
///
/// The event stream route sits outside the request timeout.
pub fn build_app(config: &Config) -> Router<ServerState> {
    health::mark_started();
    let timeout = Duration::from_millis(config.request_timeout_ms);
    build_router()
        .layer(TimeoutLayer::new(timeout))
        .merge(events::router())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
}
