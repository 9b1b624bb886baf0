//! HTTP API 测试 - 通过 oneshot 调用完整路由 (含中间件)

mod common;

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use common::TestServer;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use pos_server::api;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(server: &TestServer) -> Router {
    api::build_app(&server.config).with_state(server.state.clone())
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(api::USER_ID_HEADER, "7");
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let app = app(&server);

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = call(&app, "GET", "/health/detailed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_order_to_payment_over_http() {
    let server = TestServer::start().await;
    let app = app(&server);

    let (status, body) = call(&app, "POST", "/api/orders", Some(json!({ "table_id": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    let order_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["created_by"], 7);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/items"),
        Some(json!({ "items": [{ "menu_item_id": 1, "quantity": 2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 20.0);
    assert_eq!(body["data"]["lines"].as_array().unwrap().len(), 1);

    let (status, body) = call(&app, "POST", &format!("/api/orders/{order_id}/send-to-kitchen"), None).await;
    assert_eq!(status, StatusCode::OK);
    let ticket = body["data"]["items"][0]["kitchen_queue_id"].as_i64().unwrap();

    let (_, body) = call(&app, "GET", "/api/kitchen/queue?kitchen_area_id=1", None).await;
    assert_eq!(body["data"][0]["id"], ticket);
    assert_eq!(body["data"][0]["table_number"], "T5");

    for next in ["cooking", "ready"] {
        let (status, _) = call(
            &app,
            "PUT",
            &format!("/api/kitchen/items/{ticket}/status"),
            Some(json!({ "status": next })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = call(&app, "GET", &format!("/api/orders/{order_id}/totals"), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, body) = call(&app, "POST", &format!("/api/orders/{order_id}/totals"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["final_amount"], 22.0);

    let (status, body) = call(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "order_id": order_id, "payment_method_id": 1, "amount_paid": 25.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment"]["change_amount"], 3.0);
    assert_eq!(body["data"]["order"]["status"], "paid");

    let (_, body) = call(&app, "GET", "/api/tables/5", None).await;
    assert_eq!(body["data"]["status"], "needs_cleaning");
}

#[tokio::test]
async fn test_errors_use_the_envelope() {
    let server = TestServer::start().await;
    let app = app(&server);

    let (status, body) = call(&app, "POST", "/api/orders", Some(json!({ "table_id": 99 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TABLE_NOT_FOUND");
    assert_eq!(body["details"]["table_id"], 99);

    let (status, body) = call(&app, "POST", "/api/orders", Some(json!({ "table_id": 2 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "TABLE_NEEDS_CLEANING");

    let (status, body) = call(&app, "GET", "/api/tables/2/availability", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "TABLE_NEEDS_CLEANING");
    let (status, body) = call(&app, "GET", "/api/tables/5/availability", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 5);

    let (_, body) = call(&app, "POST", "/api/orders", Some(json!({ "table_id": 1 }))).await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/items"),
        Some(json!({ "items": [{ "menu_item_id": 3, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "MENU_ITEM_NOT_AVAILABLE");

    let (status, body) = call(&app, "PUT", "/api/kitchen/items/1/status", Some(json!({ "status": "ready" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "KITCHEN_ITEM_NOT_FOUND");

    let (status, body) = call(&app, "GET", "/api/payments/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "PAYMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_split_and_discount_routes() {
    let server = TestServer::start().await;
    let app = app(&server);

    let (_, body) = call(&app, "POST", "/api/orders", Some(json!({ "table_id": 1 }))).await;
    let order_id = body["data"]["id"].as_i64().unwrap();
    call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/items"),
        Some(json!({ "items": [{ "menu_item_id": 1, "quantity": 3 }] })),
    )
    .await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/discount"),
        Some(json!({ "discount_type": "fixed", "discount_value": 5.0, "reason": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_total"], 25.0);
    assert_eq!(body["data"]["order"]["final_amount"], 27.5);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/split"),
        Some(json!({ "split_type": "equal", "number_of_people": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["splits"][0]["amount"], 13.75);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/orders/{order_id}/split"),
        Some(json!({ "split_type": "equal", "number_of_people": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SPLIT");
}

#[tokio::test]
async fn test_event_stream_delivers_room_events() {
    let server = TestServer::start().await;
    let app = app(&server);

    let request = Request::builder()
        .uri("/api/events?role=waiter")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body();

    let state = &server.state;
    let order = server.open(5).await;
    state
        .orders
        .add_items_to_order(order.id, &[common::item(2, 1)])
        .await
        .unwrap();
    let dispatch = state.orders.send_order_to_kitchen(order.id).await.unwrap();
    let ticket = dispatch.items[0].kitchen_queue_id;
    state
        .kitchen
        .update_status(ticket, shared::models::KitchenStatus::Cooking)
        .await
        .unwrap();
    state
        .kitchen
        .update_status(ticket, shared::models::KitchenStatus::Ready)
        .await
        .unwrap();

    let mut text = String::new();
    let received = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame.unwrap().into_data() {
                text.push_str(&String::from_utf8_lossy(&data));
            }
            if text.contains("event: kitchen:item_ready") {
                return true;
            }
        }
        false
    })
    .await
    .unwrap();
    assert!(received);
    assert!(text.contains("event: order:created"));
    // Waiters are not in the kitchen rooms
    assert!(!text.contains("event: kitchen:new_items"));
    assert!(!text.contains("event: kitchen:status_changed"));
}

#[tokio::test]
async fn test_event_stream_rejects_unknown_role() {
    let server = TestServer::start().await;
    let (status, body) = call(&app(&server), "GET", "/api/events?role=owner", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
}
