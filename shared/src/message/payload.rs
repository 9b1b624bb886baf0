use serde::{Deserialize, Serialize};

use crate::models::{DispatchedItem, KitchenStatus, OrderStatus, TableStatus};

// ==================== Payloads ====================

/// 新订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    pub order_id: i64,
    pub order_number: String,
    pub table_id: i64,
}

/// 订单状态或金额变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdatedPayload {
    pub order_id: i64,
    pub status: OrderStatus,
    pub total: f64,
    pub final_amount: f64,
}

/// 送厨新菜 (per area, or all items for the chef broadcast)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenNewItemsPayload {
    pub order_id: i64,
    pub order_number: String,
    pub table_id: i64,
    pub items: Vec<DispatchedItem>,
}

/// 厨房单状态变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenStatusChangedPayload {
    pub kitchen_queue_id: i64,
    pub order_id: i64,
    pub order_line_id: i64,
    pub from: KitchenStatus,
    pub status: KitchenStatus,
    /// Set when the transition changed the order's aggregate status
    pub order_status: Option<OrderStatus>,
}

/// 出菜提醒 (to waiters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenItemReadyPayload {
    pub kitchen_queue_id: i64,
    pub order_id: i64,
    pub order_line_id: i64,
    pub table_id: i64,
}

/// 加急
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenPriorityPayload {
    pub kitchen_queue_id: i64,
    pub order_id: i64,
    pub kitchen_area_id: Option<i64>,
}

/// 结账完成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCompletedPayload {
    pub payment_id: i64,
    pub order_id: i64,
    pub table_id: i64,
    pub final_amount: f64,
    pub change_amount: f64,
}

/// 桌台状态变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatusChangedPayload {
    pub table_id: i64,
    pub status: TableStatus,
    pub current_order_id: Option<i64>,
}

/// Every event the POS core publishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum PosEvent {
    #[serde(rename = "order:created")]
    OrderCreated(OrderCreatedPayload),
    #[serde(rename = "order:updated")]
    OrderUpdated(OrderUpdatedPayload),
    #[serde(rename = "kitchen:new_items")]
    KitchenNewItems(KitchenNewItemsPayload),
    #[serde(rename = "kitchen:status_changed")]
    KitchenStatusChanged(KitchenStatusChangedPayload),
    #[serde(rename = "kitchen:item_ready")]
    KitchenItemReady(KitchenItemReadyPayload),
    #[serde(rename = "kitchen:priority")]
    KitchenPriority(KitchenPriorityPayload),
    #[serde(rename = "payment:completed")]
    PaymentCompleted(PaymentCompletedPayload),
    #[serde(rename = "table:status_changed")]
    TableStatusChanged(TableStatusChangedPayload),
}

impl PosEvent {
    pub fn event_type(&self) -> super::EventType {
        use super::EventType;
        match self {
            Self::OrderCreated(_) => EventType::OrderCreated,
            Self::OrderUpdated(_) => EventType::OrderUpdated,
            Self::KitchenNewItems(_) => EventType::KitchenNewItems,
            Self::KitchenStatusChanged(_) => EventType::KitchenStatusChanged,
            Self::KitchenItemReady(_) => EventType::KitchenItemReady,
            Self::KitchenPriority(_) => EventType::KitchenPriority,
            Self::PaymentCompleted(_) => EventType::PaymentCompleted,
            Self::TableStatusChanged(_) => EventType::TableStatusChanged,
        }
    }
}
