//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 开台 (或返回桌台上未结订单) |
//! | /api/orders | GET | 订单列表 |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id}/items | POST | 批量加菜 |
//! | /api/orders/{id}/items/{line_id} | DELETE | 删除未送厨的菜 |
//! | /api/orders/{id}/send-to-kitchen | POST | 送厨 |
//! | /api/orders/{id}/totals | POST | 账单重算 |
//! | /api/orders/{id}/split | POST | 分单计算 |
//! | /api/orders/{id}/discount | POST | 折扣 |
//! | /api/orders/{id}/payment | GET | 订单的支付记录 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::open).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/items/{line_id}", delete(handler::remove_line))
        .route("/{id}/send-to-kitchen", post(handler::send_to_kitchen))
        .route("/{id}/totals", post(handler::totals))
        .route("/{id}/split", post(handler::split))
        .route("/{id}/discount", post(handler::discount))
        .route("/{id}/payment", get(handler::payment))
}
