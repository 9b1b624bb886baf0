//! Dining Table Repository

use super::RepoResult;
use shared::models::{DiningTable, TableQuery, TableStatus};
use sqlx::{Executor, QueryBuilder, Sqlite};

const COLUMNS: &str = "id, table_number, area, seats, status, current_order_id, position_x, position_y, created_at, updated_at";

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<DiningTable>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(table)
}

/// List tables, optionally filtered by area and status
pub async fn find_all<'e, E>(executor: E, query: &TableQuery) -> RepoResult<Vec<DiningTable>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM dining_tables WHERE 1 = 1"));
    if let Some(area) = &query.area {
        qb.push(" AND area = ").push_bind(area.clone());
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY area, table_number");

    let tables = qb.build_query_as::<DiningTable>().fetch_all(executor).await?;
    Ok(tables)
}

/// Take the write lock on a table row for the rest of the transaction
///
/// SQLite has no `SELECT ... FOR UPDATE`; a no-op write upgrades the
/// transaction to a writer, so concurrent openers on the same database
/// queue behind it (bounded by busy_timeout). Returns false if the table
/// does not exist.
pub async fn lock<'e, E>(executor: E, id: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE dining_tables SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Link the table to its new order
pub async fn occupy<'e, E>(executor: E, id: i64, order_id: i64, now: i64) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE dining_tables SET status = 'occupied', current_order_id = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(order_id)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Set a status that carries no order link (everything except `occupied`)
pub async fn set_unlinked_status<'e, E>(
    executor: E,
    id: i64,
    status: TableStatus,
    now: i64,
) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug_assert!(status != TableStatus::Occupied);
    let rows = sqlx::query(
        "UPDATE dining_tables SET status = ?1, current_order_id = NULL, updated_at = ?2 WHERE id = ?3",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn seed(pool: &sqlx::SqlitePool) {
        sqlx::query(
            "INSERT INTO dining_tables (id, table_number, area, seats, status, created_at, updated_at) VALUES (1, 'T1', 'hall', 4, 'available', 0, 0), (2, 'T2', 'hall', 2, 'reserved', 0, 0), (3, 'P1', 'patio', 6, 'available', 0, 0)",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_filters() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;

        let all = find_all(&db.pool, &TableQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let hall = find_all(
            &db.pool,
            &TableQuery {
                area: Some("hall".into()),
                status: Some(TableStatus::Available),
            },
        )
        .await
        .unwrap();
        assert_eq!(hall.len(), 1);
        assert_eq!(hall[0].table_number, "T1");
    }

    #[tokio::test]
    async fn test_occupied_requires_order_link() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;

        // CHECK constraint rejects occupied without current_order_id
        let err = sqlx::query("UPDATE dining_tables SET status = 'occupied' WHERE id = 1")
            .execute(&db.pool)
            .await
            .unwrap_err();
        assert!(matches!(
            super::super::RepoError::from(err),
            super::super::RepoError::Validation(_)
        ));

        assert!(lock(&db.pool, 1).await.unwrap());
        assert!(!lock(&db.pool, 99).await.unwrap());

        assert!(
            set_unlinked_status(&db.pool, 2, TableStatus::NeedsCleaning, 10)
                .await
                .unwrap()
        );
        let table = find_by_id(&db.pool, 2).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::NeedsCleaning);
        assert!(table.current_order_id.is_none());
    }
}
