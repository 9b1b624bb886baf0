//! 订单全流程 - 开台, 加菜, 送厨, 出菜, 结账
//!
//! Runs against a file-backed database so concurrent openers really race.

mod common;

use std::collections::HashSet;

use common::{TestServer, item};
use pos_server::ErrorCode;
use shared::message::{BusMessage, EventType, PosEvent, Room, StaffRole};
use shared::models::{
    Actor, KitchenStatus, OrderCreate, OrderStatus, PaymentRequest, TableStatus,
};
use tokio::sync::broadcast;

fn drain(rx: &mut broadcast::Receiver<BusMessage>) -> Vec<BusMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn cash(order_id: i64, amount_paid: f64) -> PaymentRequest {
    PaymentRequest {
        order_id,
        payment_method_id: 1,
        amount_paid,
        discount_amount: None,
        tax_amount: None,
        note: None,
    }
}

#[tokio::test]
async fn test_full_service_on_table_five() {
    let server = TestServer::start().await;
    let state = &server.state;
    let mut rx = state.bus.subscribe();

    let order = server.open(5).await;
    assert_eq!(order.status, OrderStatus::Open);

    let detail = state
        .orders
        .add_items_to_order(order.id, &[item(1, 2)])
        .await
        .unwrap();
    assert_eq!(detail.order.total, 20.0);

    let dispatch = state.orders.send_order_to_kitchen(order.id).await.unwrap();
    assert_eq!(dispatch.items.len(), 1);
    let ticket = dispatch.items[0].kitchen_queue_id;

    state.kitchen.update_status(ticket, KitchenStatus::Cooking).await.unwrap();
    let change = state.kitchen.update_status(ticket, KitchenStatus::Ready).await.unwrap();
    assert_eq!(change.order_status, Some(OrderStatus::ReadyToServe));

    let receipt = state
        .payments
        .process_payment(
            &PaymentRequest {
                discount_amount: Some(0.0),
                tax_amount: Some(2.0),
                ..cash(order.id, 22.0)
            },
            Actor::user(1),
        )
        .await
        .unwrap();
    assert_eq!(receipt.payment.final_amount, 22.0);
    assert_eq!(receipt.payment.change_amount, 0.0);
    assert_eq!(receipt.order.status, OrderStatus::Paid);

    let table = state.tables.get(5).await.unwrap();
    assert_eq!(table.status, TableStatus::NeedsCleaning);
    assert_eq!(table.current_order_id, None);

    let events: Vec<(EventType, Option<String>)> = drain(&mut rx)
        .into_iter()
        .map(|m| (m.event_type, m.target))
        .collect();
    let kinds: Vec<EventType> = events.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            EventType::OrderCreated,
            EventType::TableStatusChanged,
            EventType::OrderUpdated,
            EventType::KitchenNewItems,
            EventType::KitchenNewItems,
            EventType::KitchenStatusChanged,
            EventType::KitchenStatusChanged,
            EventType::KitchenItemReady,
            EventType::OrderUpdated,
            EventType::PaymentCompleted,
            EventType::TableStatusChanged,
        ]
    );
    assert_eq!(events[3].1.as_deref(), Some("area:1"));
    assert_eq!(events[4].1.as_deref(), Some("role:chef"));
    assert_eq!(events[7].1.as_deref(), Some("role:waiter"));
    assert_eq!(events[9].1, None);
}

#[tokio::test]
async fn test_insufficient_payment_leaves_order_untouched() {
    let server = TestServer::start().await;
    let state = &server.state;
    let order = server.open(5).await;
    state.orders.add_items_to_order(order.id, &[item(1, 2)]).await.unwrap();
    let dispatch = state.orders.send_order_to_kitchen(order.id).await.unwrap();
    let ticket = dispatch.items[0].kitchen_queue_id;
    state.kitchen.update_status(ticket, KitchenStatus::Cooking).await.unwrap();
    state.kitchen.update_status(ticket, KitchenStatus::Ready).await.unwrap();

    let err = state
        .payments
        .process_payment(&cash(order.id, 15.0), Actor::system())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientPayment);

    let detail = state.orders.get_order_detail(order.id).await.unwrap();
    assert_eq!(detail.order.status, OrderStatus::ReadyToServe);
    let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(server.pool())
        .await
        .unwrap();
    assert_eq!(payments, 0);
}

#[tokio::test]
async fn test_order_is_paid_once() {
    let server = TestServer::start().await;
    let state = &server.state;
    let order = server.open(1).await;
    state.orders.add_items_to_order(order.id, &[item(2, 2)]).await.unwrap();

    let req_a = cash(order.id, 20.0);
    let req_b = cash(order.id, 20.0);
    let (a, b) = tokio::join!(
        state.payments.process_payment(&req_a, Actor::system()),
        state.payments.process_payment(&req_b, Actor::system()),
    );
    let outcomes = [a.is_ok(), b.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let err = a.err().or(b.err()).unwrap();
    assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);

    let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE order_id = ?")
        .bind(order.id)
        .fetch_one(server.pool())
        .await
        .unwrap();
    assert_eq!(payments, 1);
}

#[tokio::test]
async fn test_concurrent_openers_share_one_order() {
    let server = TestServer::start().await;

    let mut handles = Vec::new();
    for waiter in 1..=8 {
        let orders = server.state.orders.clone();
        handles.push(tokio::spawn(async move {
            orders
                .get_or_create_order_for_table(
                    &OrderCreate {
                        table_id: 1,
                        ..Default::default()
                    },
                    Actor::user(waiter),
                )
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id);
    }
    assert_eq!(ids.len(), 1);

    let unsettled: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE table_id = 1 AND status NOT IN ('paid', 'completed')",
    )
    .fetch_one(server.pool())
    .await
    .unwrap();
    assert_eq!(unsettled, 1);
}

#[tokio::test]
async fn test_order_numbers_are_unique_across_tables() {
    let server = TestServer::start().await;
    let mut numbers = HashSet::new();
    for table_id in [1, 3, 5] {
        numbers.insert(server.open(table_id).await.order_number);
    }
    assert_eq!(numbers.len(), 3);
}

#[tokio::test]
async fn test_cleaned_table_can_be_reopened() {
    let server = TestServer::start().await;
    let state = &server.state;
    let first = server.open(1).await;
    state.orders.add_items_to_order(first.id, &[item(2, 1)]).await.unwrap();
    state
        .payments
        .process_payment(&cash(first.id, 10.0), Actor::system())
        .await
        .unwrap();

    let err = state
        .orders
        .get_or_create_order_for_table(
            &OrderCreate {
                table_id: 1,
                ..Default::default()
            },
            Actor::system(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TableNeedsCleaning);

    state.tables.update_status(1, TableStatus::Available).await.unwrap();
    let second = server.open(1).await;
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_chef_room_sees_only_its_events() {
    let server = TestServer::start().await;
    let state = &server.state;
    let mut rx = state.bus.subscribe();

    let order = server.open(5).await;
    state
        .orders
        .add_items_to_order(order.id, &[item(1, 1), item(2, 1)])
        .await
        .unwrap();
    state.orders.send_order_to_kitchen(order.id).await.unwrap();

    let bar_screen = [Room::Area(2)];
    let chef = [Room::Role(StaffRole::Chef)];
    let msgs = drain(&mut rx);

    let bar_new: Vec<PosEvent> = msgs
        .iter()
        .filter(|m| m.event_type == EventType::KitchenNewItems && m.is_visible_to(&bar_screen))
        .map(|m| m.parse_payload().unwrap())
        .collect();
    assert_eq!(bar_new.len(), 1);
    match &bar_new[0] {
        PosEvent::KitchenNewItems(payload) => {
            assert_eq!(payload.items.len(), 1);
            assert_eq!(payload.items[0].item_name, "Beer");
        }
        other => panic!("unexpected event {other:?}"),
    }

    let chef_new = msgs
        .iter()
        .filter(|m| m.event_type == EventType::KitchenNewItems && m.is_visible_to(&chef))
        .count();
    assert_eq!(chef_new, 1);
}
