//! Order Model

use serde::{Deserialize, Serialize};

use super::{KitchenTicket, OrderLine};

/// Order lifecycle status
///
/// `open → sent_to_kitchen → ready_to_serve → served → paid → completed`.
/// `ready_to_serve` and `served` are inferred from the order's lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    #[default]
    Open,
    SentToKitchen,
    ReadyToServe,
    Served,
    Paid,
    Completed,
}

impl OrderStatus {
    /// Statuses of an order still holding its table
    pub const UNSETTLED: [OrderStatus; 4] = [
        OrderStatus::Open,
        OrderStatus::SentToKitchen,
        OrderStatus::ReadyToServe,
        OrderStatus::Served,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::SentToKitchen => "sent_to_kitchen",
            Self::ReadyToServe => "ready_to_serve",
            Self::Served => "served",
            Self::Paid => "paid",
            Self::Completed => "completed",
        }
    }

    /// Paid or completed; no further mutation allowed
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::Completed)
    }
}

/// Where the order was opened from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderSource {
    #[default]
    Pos,
    Qr,
}

/// Order entity (订单)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// `ORD-YYYYMMDD-NNNN`
    pub order_number: String,
    pub table_id: i64,
    pub status: OrderStatus,
    pub source: OrderSource,
    pub customer_count: i32,
    pub waiter_id: Option<i64>,
    pub created_by: Option<i64>,
    pub note: Option<String>,
    pub total: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
    pub opened_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
}

/// Open (or re-enter) an order on a table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    #[serde(default)]
    pub source: Option<OrderSource>,
    pub customer_count: Option<i32>,
    pub note: Option<String>,
}

/// Who performs an operation; only used for attribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<i64>,
}

impl Actor {
    pub fn user(id: i64) -> Self {
        Self { user_id: Some(id) }
    }

    pub fn system() -> Self {
        Self { user_id: None }
    }
}

/// Order listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Order with its lines and kitchen tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub kitchen_tickets: Vec<KitchenTicket>,
}

/// Derived monetary fields of an order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
}
