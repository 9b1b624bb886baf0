//! Order Line Model

use serde::{Deserialize, Serialize};

/// Order line status, mirrored from the line's kitchen ticket after dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderLineStatus {
    #[default]
    Pending,
    SentToKitchen,
    Cooking,
    Ready,
    Served,
    Cancelled,
}

impl OrderLineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SentToKitchen => "sent_to_kitchen",
            Self::Cooking => "cooking",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Modifier attached to a line (e.g. "no onion")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineModifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Order line entity (订单明细)
///
/// `unit_price` and `menu_item_name` are snapshots taken when the line was
/// added; `line_total = unit_price × quantity` never follows catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub line_total: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub modifiers: Vec<LineModifier>,
    pub note: Option<String>,
    pub status: OrderLineStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One requested item in an add-items batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub modifiers: Vec<LineModifier>,
    pub note: Option<String>,
}
