//! Order Line Repository

use super::{RepoError, RepoResult};
use shared::models::{LineModifier, OrderLine, OrderLineStatus};
use sqlx::types::Json;
use sqlx::{Executor, FromRow, Sqlite};

const COLUMNS: &str = "id, order_id, menu_item_id, menu_item_name, unit_price, quantity, line_total, modifiers, note, status, created_at, updated_at";

/// Insert payload; prices are already snapshotted by the caller
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub line_total: f64,
    pub modifiers: Vec<LineModifier>,
    pub note: Option<String>,
    pub now: i64,
}

/// Pending line joined with its menu item's kitchen routing
#[derive(Debug, Clone, FromRow)]
pub struct PendingLine {
    pub id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    pub kitchen_area_id: Option<i64>,
}

pub async fn insert<'e, E>(executor: E, data: &NewOrderLine) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_lines (order_id, menu_item_id, menu_item_name, unit_price, quantity, line_total, modifiers, note, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', ?9, ?9) RETURNING id",
    )
    .bind(data.order_id)
    .bind(data.menu_item_id)
    .bind(&data.menu_item_name)
    .bind(data.unit_price)
    .bind(data.quantity)
    .bind(data.line_total)
    .bind(Json(&data.modifiers))
    .bind(&data.note)
    .bind(data.now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<OrderLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let line = sqlx::query_as::<_, OrderLine>(&format!(
        "SELECT {COLUMNS} FROM order_lines WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(line)
}

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let lines = sqlx::query_as::<_, OrderLine>(&format!(
        "SELECT {COLUMNS} FROM order_lines WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(lines)
}

/// Statuses of every line of an order, for aggregate inference
pub async fn find_statuses<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderLineStatus>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let statuses =
        sqlx::query_scalar::<_, OrderLineStatus>("SELECT status FROM order_lines WHERE order_id = ?")
            .bind(order_id)
            .fetch_all(executor)
            .await?;
    Ok(statuses)
}

pub async fn find_pending_for_dispatch<'e, E>(
    executor: E,
    order_id: i64,
) -> RepoResult<Vec<PendingLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let lines = sqlx::query_as::<_, PendingLine>(
        "SELECT ol.id, ol.menu_item_id, ol.menu_item_name, ol.quantity, mi.kitchen_area_id FROM order_lines ol JOIN menu_items mi ON mi.id = ol.menu_item_id WHERE ol.order_id = ? AND ol.status = 'pending' ORDER BY ol.id",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(lines)
}

/// Sum of line totals, cancelled lines excluded
pub async fn sum_line_totals<'e, E>(executor: E, order_id: i64) -> RepoResult<f64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let total = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(line_total), 0.0) FROM order_lines WHERE order_id = ? AND status != 'cancelled'",
    )
    .bind(order_id)
    .fetch_one(executor)
    .await?;
    Ok(total)
}

/// Sum of the given lines of one order; lines of other orders are ignored
pub async fn sum_selected_totals<'e, E>(
    executor: E,
    order_id: i64,
    line_ids: &[i64],
) -> RepoResult<(f64, i64)>
where
    E: Executor<'e, Database = Sqlite>,
{
    if line_ids.is_empty() {
        return Ok((0.0, 0));
    }
    let mut qb = sqlx::QueryBuilder::<Sqlite>::new(
        "SELECT COALESCE(SUM(line_total), 0.0), COUNT(*) FROM order_lines WHERE order_id = ",
    );
    qb.push_bind(order_id).push(" AND id IN (");
    let mut sep = qb.separated(", ");
    for id in line_ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(")");

    let row = qb
        .build_query_as::<(f64, i64)>()
        .fetch_one(executor)
        .await?;
    Ok(row)
}

pub async fn update_status<'e, E>(
    executor: E,
    id: i64,
    status: OrderLineStatus,
    now: i64,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE order_lines SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order line {id} not found")));
    }
    Ok(())
}

/// Delete a line that has not been dispatched yet; false if none matched
pub async fn delete_pending<'e, E>(executor: E, order_id: i64, id: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "DELETE FROM order_lines WHERE id = ?1 AND order_id = ?2 AND status = 'pending'",
    )
    .bind(id)
    .bind(order_id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
