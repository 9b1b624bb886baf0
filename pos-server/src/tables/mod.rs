//! Dining tables: listing and manual status changes
//!
//! `occupied` is only ever set by opening an order, and a table holding an
//! unsettled order keeps its link until the order is paid.

use std::sync::Arc;

use shared::message::payload::TableStatusChangedPayload;
use shared::message::{PosEvent, Room};
use shared::models::{DiningTable, TableQuery, TableStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db;
use crate::db::repository::{dining_table, order};
use crate::notify::Notifier;
use crate::orders::table_not_found;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Table service
#[derive(Clone)]
pub struct TableService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for TableService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableService").finish_non_exhaustive()
    }
}

impl TableService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    pub async fn list(&self, query: &TableQuery) -> AppResult<Vec<DiningTable>> {
        Ok(dining_table::find_all(&self.pool, query).await?)
    }

    pub async fn get(&self, table_id: i64) -> AppResult<DiningTable> {
        dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or_else(|| table_not_found(table_id))
    }

    /// Manual status change (cleaning done, reservation)
    pub async fn update_status(
        &self,
        table_id: i64,
        status: TableStatus,
    ) -> AppResult<DiningTable> {
        if status == TableStatus::Occupied {
            return Err(AppError::with_message(
                ErrorCode::InvalidTableStatus,
                "Tables become occupied by opening an order",
            ));
        }

        let mut tx = db::begin(&self.pool).await?;
        if !dining_table::lock(&mut *tx, table_id).await? {
            return Err(table_not_found(table_id));
        }
        if let Some(open) = order::find_unsettled_for_table(&mut *tx, table_id).await? {
            return Err(AppError::with_message(
                ErrorCode::TableOccupied,
                format!("Table {table_id} holds unsettled order {}", open.order_number),
            )
            .with_detail("order_id", open.id));
        }
        dining_table::set_unlinked_status(&mut *tx, table_id, status, now_millis()).await?;
        let table = dining_table::find_by_id(&mut *tx, table_id)
            .await?
            .ok_or_else(|| table_not_found(table_id))?;
        db::commit(tx).await?;

        tracing::info!(table_id, status = status.as_str(), "Table status updated");
        self.notifier
            .publish(
                PosEvent::TableStatusChanged(TableStatusChangedPayload {
                    table_id,
                    status,
                    current_order_id: None,
                }),
                Room::All,
            )
            .await;
        Ok(table)
    }
}
