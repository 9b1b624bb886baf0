//! Dining Table API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/tables | GET | 桌台列表 |
//! | /api/tables/{id} | GET | 桌台详情 |
//! | /api/tables/{id}/availability | GET | 能否开台 |
//! | /api/tables/{id}/status | PUT | 手动改状态 |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/availability", get(handler::availability))
        .route("/{id}/status", put(handler::update_status))
}
