//! Payment Model

use serde::{Deserialize, Serialize};

use super::Order;

/// Payment method (现金, 刷卡, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

/// Settlement record, at most one per order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub payment_method_id: i64,
    /// Gross order total at settlement
    pub amount: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub final_amount: f64,
    pub amount_paid: f64,
    pub change_amount: f64,
    pub note: Option<String>,
    pub processed_by: Option<i64>,
    pub created_at: i64,
}

/// Settle an order
///
/// `discount_amount` / `tax_amount` override the stored values when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: i64,
    pub payment_method_id: i64,
    pub amount_paid: f64,
    pub discount_amount: Option<f64>,
    pub tax_amount: Option<f64>,
    pub note: Option<String>,
}

/// Result of a successful settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub order: Order,
}

/// Split bill request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "split_type", rename_all = "snake_case")]
pub enum SplitRequest {
    /// Divide the final amount evenly, rounding each share up to the cent
    Equal { number_of_people: u32 },
    /// Each person pays for the listed lines
    ByItem { item_assignments: Vec<ItemAssignment> },
    /// Caller decides the amounts
    Custom { amounts: Vec<SplitShare> },
}

impl SplitRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Equal { .. } => "equal",
            Self::ByItem { .. } => "by_item",
            Self::Custom { .. } => "custom",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAssignment {
    pub person: u32,
    pub line_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitShare {
    pub person: u32,
    pub amount: f64,
}

/// Computed split; nothing is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitBill {
    pub order_id: i64,
    pub total_amount: f64,
    pub split_type: String,
    pub splits: Vec<SplitShare>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a percent of the gross total (0..=100)
    Percentage,
    /// `value` is an absolute amount (0..=total)
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub discount_type: DiscountKind,
    pub discount_value: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub order_id: i64,
    pub discount_amount: f64,
    /// Gross total minus discount
    pub new_total: f64,
    pub order: Order,
}
