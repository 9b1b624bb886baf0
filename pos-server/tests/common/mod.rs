//! Shared fixtures for the integration tests: a file-backed database with
//! a small menu and four tables, wired into a full [`ServerState`].

#![allow(dead_code)]

use pos_server::db::DbService;
use pos_server::{Config, MessageBus, ServerState};
use shared::models::{Actor, OrderCreate, OrderLineInput};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestServer {
    pub state: ServerState,
    pub config: Config,
    // Keeps the database directory alive
    _dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.db");
        let mut config = Config::with_overrides(path.to_string_lossy(), 0);
        config.tax_rate = 0.10;
        config.request_timeout_ms = 5_000;

        let db = DbService::new(&config.database_path).await.unwrap();
        seed(&db.pool).await;
        let bus = MessageBus::with_capacity(256);
        let state = ServerState::new(config.clone(), db, bus);
        Self {
            state,
            config,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        self.state.pool()
    }

    pub async fn open(&self, table_id: i64) -> shared::models::Order {
        self.state
            .orders
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

/// Menu: 1 Steak 10.00 (grill), 2 Beer 4.50 (bar), 3 Soup (unavailable).
/// Tables: 1 and 5 available, 2 needs_cleaning, 3 reserved.
pub async fn seed(pool: &SqlitePool) {
    for sql in [
        "INSERT INTO kitchen_areas (id, name, description) VALUES (1, 'Grill', NULL), (2, 'Bar', NULL)",
        "INSERT INTO menu_items (id, name, price, is_available, kitchen_area_id, prep_time_minutes) VALUES (1, 'Steak', 10.0, 1, 1, 15), (2, 'Beer', 4.5, 1, 2, 2), (3, 'Soup', 6.0, 0, 1, 5)",
        "INSERT INTO dining_tables (id, table_number, area, seats, status, created_at, updated_at) VALUES (1, 'T1', 'hall', 4, 'available', 0, 0), (2, 'T2', 'hall', 2, 'needs_cleaning', 0, 0), (3, 'T3', 'patio', 6, 'reserved', 0, 0), (5, 'T5', 'hall', 4, 'available', 0, 0)",
        "INSERT INTO inventory_items (id, name, unit, current_stock, updated_at) VALUES (1, 'Beef', 'kg', 10.0, 0)",
        "INSERT INTO menu_item_ingredients (menu_item_id, inventory_item_id, quantity) VALUES (1, 1, 0.25)",
    ] {
        sqlx::query(sql).execute(pool).await.unwrap();
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
