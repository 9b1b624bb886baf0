//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status
///
/// `current_order_id` is set exactly when the status is `Occupied`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    NeedsCleaning,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
            Self::NeedsCleaning => "needs_cleaning",
        }
    }

    /// 是否允许开新单
    pub fn accepts_new_order(&self) -> bool {
        !matches!(self, Self::NeedsCleaning)
    }
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub table_number: String,
    pub area: Option<String>,
    pub seats: i32,
    pub status: TableStatus,
    pub current_order_id: Option<i64>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Table listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableQuery {
    pub area: Option<String>,
    pub status: Option<TableStatus>,
}

/// Manual table status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}
