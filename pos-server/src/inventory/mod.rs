//! Stock ledger
//!
//! Deducts recipe quantities for a paid order. Runs after the payment has
//! committed, in its own transaction; callers log and swallow failures.

use async_trait::async_trait;
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db::{self, repository::{inventory, order}};
use crate::utils::{AppError, AppResult};

/// Movement reason written for sale deductions
pub const REASON_SALE: &str = "sale";

#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Deduct the stock consumed by an order; returns the number of items touched
    async fn deduct_for_order(&self, order_id: i64) -> AppResult<usize>;
}

/// SQLite-backed ledger over `inventory_items` / `inventory_movements`
#[derive(Debug, Clone)]
pub struct SqlStockLedger {
    pool: SqlitePool,
}

impl SqlStockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockLedger for SqlStockLedger {
    async fn deduct_for_order(&self, order_id: i64) -> AppResult<usize> {
        let mut tx = db::begin(&self.pool).await?;
        if !order::lock(&mut *tx, order_id).await? {
            return Err(AppError::not_found(format!("Order {order_id}")));
        }
        if inventory::has_movements_for_order(&mut *tx, order_id).await? {
            tracing::debug!(order_id, "Stock already deducted for order");
            return Ok(0);
        }

        let requirements = inventory::find_requirements_for_order(&mut *tx, order_id).await?;
        let now = now_millis();
        for req in &requirements {
            if !inventory::adjust_stock(&mut *tx, req.inventory_item_id, -req.quantity, now).await? {
                return Err(AppError::not_found(format!(
                    "Inventory item {}",
                    req.inventory_item_id
                )));
            }
            inventory::insert_movement(
                &mut *tx,
                req.inventory_item_id,
                Some(order_id),
                -req.quantity,
                REASON_SALE,
                now,
            )
            .await?;
        }
        db::commit(tx).await?;

        tracing::debug!(order_id, items = requirements.len(), "Stock deducted");
        Ok(requirements.len())
    }
}
