//! Inventory Repository
//!
//! Recipe lookups and stock movements used by the stock ledger.

use super::RepoResult;
use sqlx::{Executor, FromRow, Sqlite};

/// Aggregated stock requirement of one order for one inventory item
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StockRequirement {
    pub inventory_item_id: i64,
    pub quantity: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub current_stock: f64,
    pub updated_at: i64,
}

/// Recipe quantities × line quantities of every non-cancelled line
pub async fn find_requirements_for_order<'e, E>(
    executor: E,
    order_id: i64,
) -> RepoResult<Vec<StockRequirement>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, StockRequirement>(
        "SELECT mii.inventory_item_id, SUM(mii.quantity * ol.quantity) AS quantity FROM order_lines ol JOIN menu_item_ingredients mii ON mii.menu_item_id = ol.menu_item_id WHERE ol.order_id = ? AND ol.status != 'cancelled' GROUP BY mii.inventory_item_id ORDER BY mii.inventory_item_id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// True once any movement was recorded for the order
pub async fn has_movements_for_order<'e, E>(executor: E, order_id: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM inventory_movements WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Add `delta` (negative to deduct) to the current stock
pub async fn adjust_stock<'e, E>(executor: E, id: i64, delta: f64, now: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE inventory_items SET current_stock = current_stock + ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn insert_movement<'e, E>(
    executor: E,
    inventory_item_id: i64,
    order_id: Option<i64>,
    quantity_change: f64,
    reason: &str,
    now: i64,
) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO inventory_movements (inventory_item_id, order_id, quantity_change, reason, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
    )
    .bind(inventory_item_id)
    .bind(order_id)
    .bind(quantity_change)
    .bind(reason)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn find_item<'e, E>(executor: E, id: i64) -> RepoResult<Option<InventoryItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, InventoryItem>(
        "SELECT id, name, unit, current_stock, updated_at FROM inventory_items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(item)
}
