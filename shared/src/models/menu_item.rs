//! Menu Item Model
//!
//! Read-only from the order lifecycle's point of view: the catalog price
//! is re-read at item addition and frozen onto the order line.

use serde::{Deserialize, Serialize};

/// Menu item (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
    pub kitchen_area_id: Option<i64>,
    pub prep_time_minutes: Option<i32>,
}
