//! Order Repository

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderQuery, OrderSource, OrderStatus, OrderTotals};
use sqlx::{Executor, QueryBuilder, Sqlite};

const COLUMNS: &str = "id, order_number, table_id, status, source, customer_count, waiter_id, created_by, note, total, discount_amount, tax_amount, final_amount, opened_at, updated_at, paid_at";

/// SQL list of [`OrderStatus::UNSETTLED`]
const UNSETTLED_SQL: &str = "('open', 'sent_to_kitchen', 'ready_to_serve', 'served')";

const DEFAULT_LIST_LIMIT: i64 = 100;

/// Insert payload
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub table_id: i64,
    pub source: OrderSource,
    pub customer_count: i32,
    pub waiter_id: Option<i64>,
    pub created_by: Option<i64>,
    pub note: Option<String>,
    pub now: i64,
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

/// Take the write lock before reading the order (see `dining_table::lock`)
///
/// Returns false if the order does not exist.
pub async fn lock<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE orders SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Most recent order still holding the table
pub async fn find_unsettled_for_table<'e, E>(executor: E, table_id: i64) -> RepoResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE table_id = ? AND status IN {UNSETTLED_SQL} ORDER BY opened_at DESC, id DESC LIMIT 1"
    ))
    .bind(table_id)
    .fetch_optional(executor)
    .await?;
    Ok(order)
}

pub async fn find_all<'e, E>(executor: E, query: &OrderQuery) -> RepoResult<Vec<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM orders WHERE 1 = 1"));
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(table_id) = query.table_id {
        qb.push(" AND table_id = ").push_bind(table_id);
    }
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(1000);
    qb.push(" ORDER BY opened_at DESC, id DESC LIMIT ")
        .push_bind(limit);

    let orders = qb.build_query_as::<Order>().fetch_all(executor).await?;
    Ok(orders)
}

/// Atomically claim the next sequence number of a calendar day (1-based)
pub async fn next_daily_sequence<'e, E>(executor: E, day: &str) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let seq = sqlx::query_scalar::<_, i64>(
        "INSERT INTO order_sequence (day, last_seq) VALUES (?1, 1) ON CONFLICT(day) DO UPDATE SET last_seq = last_seq + 1 RETURNING last_seq",
    )
    .bind(day)
    .fetch_one(executor)
    .await?;
    Ok(seq)
}

/// Insert an `open` order, returning its id
pub async fn insert<'e, E>(executor: E, data: &NewOrder) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_number, table_id, status, source, customer_count, waiter_id, created_by, note, opened_at, updated_at) VALUES (?1, ?2, 'open', ?3, ?4, ?5, ?6, ?7, ?8, ?8) RETURNING id",
    )
    .bind(&data.order_number)
    .bind(data.table_id)
    .bind(data.source)
    .bind(data.customer_count)
    .bind(data.waiter_id)
    .bind(data.created_by)
    .bind(&data.note)
    .bind(data.now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn update_status<'e, E>(
    executor: E,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

/// Persist all four monetary fields
pub async fn update_totals<'e, E>(
    executor: E,
    id: i64,
    totals: &OrderTotals,
    now: i64,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE orders SET total = ?1, discount_amount = ?2, tax_amount = ?3, final_amount = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(totals.total)
    .bind(totals.discount_amount)
    .bind(totals.tax_amount)
    .bind(totals.final_amount)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

/// Settle the order; false when it was already paid/completed
pub async fn mark_paid<'e, E>(
    executor: E,
    id: i64,
    totals: &OrderTotals,
    now: i64,
) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE orders SET status = 'paid', total = ?1, discount_amount = ?2, tax_amount = ?3, final_amount = ?4, paid_at = ?5, updated_at = ?5 WHERE id = ?6 AND status NOT IN ('paid', 'completed')",
    )
    .bind(totals.total)
    .bind(totals.discount_amount)
    .bind(totals.tax_amount)
    .bind(totals.final_amount)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
