//! Audit Log Model

use serde::{Deserialize, Serialize};

/// Audit trail entry for money-affecting actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub details: serde_json::Value,
    pub created_at: i64,
}
