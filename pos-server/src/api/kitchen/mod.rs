//! Kitchen API 模块
//!
//! Kitchen display endpoints: queue, areas, per-ticket status and priority.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/kitchen", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/queue", get(handler::queue))
        .route("/areas", get(handler::areas))
        .route("/items/{id}", get(handler::get_item))
        .route("/items/{id}/status", put(handler::update_status))
        .route("/items/{id}/priority", put(handler::mark_priority))
}
