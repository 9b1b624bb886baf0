//! Fixtures for unit tests: an in-memory database with a small menu,
//! a few tables and services wired to a [`RecordingNotifier`].

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{Actor, OrderCreate, OrderLineInput};
use sqlx::SqlitePool;

use crate::db::DbService;
use crate::inventory::{SqlStockLedger, StockLedger};
use crate::kitchen::KitchenService;
use crate::notify::RecordingNotifier;
use crate::orders::OrderService;
use crate::payments::PaymentService;
use crate::tables::TableService;
use crate::utils::{AppError, AppResult};

pub const TAX_RATE: f64 = 0.10;

/// Menu: 1 Steak 10.00 (grill), 2 Beer 4.50 (bar), 3 Soup 6.00 (unavailable),
/// 4 Salad 8.00 (no kitchen area).
/// Tables: 1 T1, 5 T5 (available), 2 T2 (needs_cleaning), 3 T3 (reserved).
pub async fn seed(pool: &SqlitePool) {
    for sql in [
        "INSERT INTO kitchen_areas (id, name, description) VALUES (1, 'Grill', 'Hot line'), (2, 'Bar', NULL)",
        "INSERT INTO menu_items (id, name, price, is_available, kitchen_area_id, prep_time_minutes) VALUES (1, 'Steak', 10.0, 1, 1, 15), (2, 'Beer', 4.5, 1, 2, 2), (3, 'Soup', 6.0, 0, 1, 5), (4, 'Salad', 8.0, 1, NULL, NULL)",
        "INSERT INTO dining_tables (id, table_number, area, seats, status, created_at, updated_at) VALUES (1, 'T1', 'hall', 4, 'available', 0, 0), (2, 'T2', 'hall', 2, 'needs_cleaning', 0, 0), (3, 'T3', 'patio', 6, 'reserved', 0, 0), (5, 'T5', 'hall', 4, 'available', 0, 0)",
        "INSERT INTO inventory_items (id, name, unit, current_stock, updated_at) VALUES (1, 'Beef', 'kg', 10.0, 0), (2, 'Lager', 'l', 50.0, 0)",
        "INSERT INTO menu_item_ingredients (menu_item_id, inventory_item_id, quantity) VALUES (1, 1, 0.25), (2, 2, 0.5)",
    ] {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

/// Ledger that always fails
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStockLedger;

#[async_trait]
impl StockLedger for FailingStockLedger {
    async fn deduct_for_order(&self, order_id: i64) -> AppResult<usize> {
        Err(AppError::internal(format!(
            "stock ledger unavailable (order {order_id})"
        )))
    }
}

pub struct TestEnv {
    pub db: DbService,
    pub notifier: Arc<RecordingNotifier>,
    pub orders: OrderService,
    pub kitchen: KitchenService,
    pub payments: PaymentService,
    pub tables: TableService,
}

impl TestEnv {
    pub async fn new() -> Self {
        let db = DbService::in_memory().await.unwrap();
        let ledger: Arc<dyn StockLedger> = Arc::new(SqlStockLedger::new(db.pool.clone()));
        Self::with_ledger(db, ledger).await
    }

    pub async fn with_ledger(db: DbService, ledger: Arc<dyn StockLedger>) -> Self {
        seed(&db.pool).await;
        let notifier = Arc::new(RecordingNotifier::new());
        Self {
            orders: OrderService::new(db.pool.clone(), notifier.clone(), TAX_RATE),
            kitchen: KitchenService::new(db.pool.clone(), notifier.clone(), TAX_RATE),
            payments: PaymentService::new(db.pool.clone(), notifier.clone(), ledger, TAX_RATE),
            tables: TableService::new(db.pool.clone(), notifier.clone()),
            notifier,
            db,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub async fn open(&self, table_id: i64) -> shared::models::Order {
        self.orders
            .get_or_create_order_for_table(
                &OrderCreate {
                    table_id,
                    ..Default::default()
                },
                Actor::user(1),
            )
            .await
            .unwrap()
    }
}

pub fn item(menu_item_id: i64, quantity: i32) -> OrderLineInput {
    OrderLineInput {
        menu_item_id,
        quantity,
        modifiers: Vec::new(),
        note: None,
    }
}
