//! Audit Log Repository (append only)

use super::RepoResult;
use shared::models::AuditLog;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite};

#[derive(Debug, Clone)]
pub struct NewAuditLog<'a> {
    pub user_id: Option<i64>,
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Option<i64>,
    pub details: serde_json::Value,
    pub now: i64,
}

pub async fn insert<'e, E>(executor: E, entry: &NewAuditLog<'_>) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
    )
    .bind(entry.user_id)
    .bind(entry.action)
    .bind(entry.entity_type)
    .bind(entry.entity_id)
    .bind(Json(&entry.details))
    .bind(entry.now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Entries of one entity, oldest first
pub async fn find_by_entity<'e, E>(
    executor: E,
    entity_type: &str,
    entity_id: i64,
) -> RepoResult<Vec<AuditLog>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let logs = sqlx::query_as::<_, AuditLog>(
        "SELECT id, user_id, action, entity_type, entity_id, details, created_at FROM audit_logs WHERE entity_type = ? AND entity_id = ? ORDER BY id",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_all(executor)
    .await?;
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = DbService::in_memory().await.unwrap();
        insert(
            &db.pool,
            &NewAuditLog {
                user_id: Some(7),
                action: "discount_applied",
                entity_type: "order",
                entity_id: Some(42),
                details: json!({ "discount_amount": 5.0 }),
                now: 1,
            },
        )
        .await
        .unwrap();

        let logs = find_by_entity(&db.pool, "order", 42).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "discount_applied");
        assert_eq!(logs[0].details["discount_amount"], 5.0);
        assert!(find_by_entity(&db.pool, "order", 43).await.unwrap().is_empty());
    }
}
