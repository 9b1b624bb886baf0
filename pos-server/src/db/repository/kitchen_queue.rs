//! Kitchen Queue Repository

use super::RepoResult;
use shared::models::{KitchenQueueEntry, KitchenStatus, KitchenTicket};
use sqlx::{Executor, QueryBuilder, Sqlite};

const COLUMNS: &str = "id, order_id, order_line_id, menu_item_id, kitchen_area_id, quantity, status, is_priority, started_at, completed_at, created_at, updated_at";

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub order_id: i64,
    pub order_line_id: i64,
    pub menu_item_id: i64,
    pub kitchen_area_id: Option<i64>,
    pub quantity: i32,
    pub now: i64,
}

/// Insert a `pending` ticket; fails with Duplicate if the line already has one
pub async fn insert<'e, E>(executor: E, data: &NewTicket) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO kitchen_queue (order_id, order_line_id, menu_item_id, kitchen_area_id, quantity, status, is_priority, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', 0, ?6, ?6) RETURNING id",
    )
    .bind(data.order_id)
    .bind(data.order_line_id)
    .bind(data.menu_item_id)
    .bind(data.kitchen_area_id)
    .bind(data.quantity)
    .bind(data.now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Write lock on a ticket row; false if it does not exist
pub async fn lock<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE kitchen_queue SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<KitchenTicket>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let ticket = sqlx::query_as::<_, KitchenTicket>(&format!(
        "SELECT {COLUMNS} FROM kitchen_queue WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(ticket)
}

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<KitchenTicket>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let tickets = sqlx::query_as::<_, KitchenTicket>(&format!(
        "SELECT {COLUMNS} FROM kitchen_queue WHERE order_id = ? ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(executor)
    .await?;
    Ok(tickets)
}

/// Compare-and-set the ticket status, stamping start/completion times
///
/// Returns false when the ticket is no longer in `from`.
pub async fn transition<'e, E>(
    executor: E,
    id: i64,
    from: KitchenStatus,
    to: KitchenStatus,
    now: i64,
) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE kitchen_queue SET status = ?1, started_at = CASE WHEN ?1 = 'cooking' THEN ?2 ELSE started_at END, completed_at = CASE WHEN ?1 = 'ready' THEN ?2 ELSE completed_at END, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_priority<'e, E>(executor: E, id: i64, now: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows =
        sqlx::query("UPDATE kitchen_queue SET is_priority = 1, updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(id)
            .execute(executor)
            .await?;
    Ok(rows.rows_affected() > 0)
}

/// Kitchen display rows, oldest first
///
/// Priority is advisory: it is exposed on each row, the FIFO order is kept.
pub async fn find_queue<'e, E>(
    executor: E,
    statuses: &[KitchenStatus],
    kitchen_area_id: Option<i64>,
    now: i64,
) -> RepoResult<Vec<KitchenQueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT kq.id, kq.order_id, kq.order_line_id, o.order_number, t.table_number, kq.menu_item_id, ol.menu_item_name AS item_name, kq.quantity, ol.modifiers, ol.note, kq.status, kq.is_priority, kq.kitchen_area_id, ka.name AS kitchen_area_name, mi.prep_time_minutes, MAX(0, (",
    );
    qb.push_bind(now);
    qb.push(
        " - kq.created_at) / 60000) AS wait_time_minutes, kq.started_at, kq.created_at FROM kitchen_queue kq JOIN orders o ON o.id = kq.order_id JOIN dining_tables t ON t.id = o.table_id JOIN order_lines ol ON ol.id = kq.order_line_id JOIN menu_items mi ON mi.id = kq.menu_item_id LEFT JOIN kitchen_areas ka ON ka.id = kq.kitchen_area_id WHERE 1 = 1",
    );
    if let Some(area) = kitchen_area_id {
        qb.push(" AND kq.kitchen_area_id = ").push_bind(area);
    }
    if !statuses.is_empty() {
        qb.push(" AND kq.status IN (");
        let mut sep = qb.separated(", ");
        for status in statuses {
            sep.push_bind(*status);
        }
        sep.push_unseparated(")");
    }
    qb.push(" ORDER BY kq.created_at ASC, kq.id ASC");

    let rows = qb
        .build_query_as::<KitchenQueueEntry>()
        .fetch_all(executor)
        .await?;
    Ok(rows)
}
