use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::{Config, Result};
use crate::db::DbService;
use crate::inventory::{SqlStockLedger, StockLedger};
use crate::kitchen::KitchenService;
use crate::notify::{MessageBus, MessageBusNotifier, Notifier};
use crate::orders::OrderService;
use crate::payments::PaymentService;
use crate::tables::TableService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// Cloning is cheap: the pool, the bus sender and the notifier are all
/// reference-counted.
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | bus | MessageBus | 实时通知总线 |
/// | orders | OrderService | 订单生命周期 |
/// | kitchen | KitchenService | 厨房队列 |
/// | payments | PaymentService | 结账 |
/// | tables | TableService | 桌台 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub bus: MessageBus,
    pub orders: OrderService,
    pub kitchen: KitchenService,
    pub payments: PaymentService,
    pub tables: TableService,
}

impl ServerState {
    /// Wire every service to the same pool and bus
    pub fn new(config: Config, db: DbService, bus: MessageBus) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(MessageBusNotifier::new(bus.clone()));
        let ledger: Arc<dyn StockLedger> = Arc::new(SqlStockLedger::new(db.pool.clone()));
        let tax_rate = config.tax_rate;

        Self {
            orders: OrderService::new(db.pool.clone(), notifier.clone(), tax_rate),
            kitchen: KitchenService::new(db.pool.clone(), notifier.clone(), tax_rate),
            payments: PaymentService::new(db.pool.clone(), notifier.clone(), ledger, tax_rate),
            tables: TableService::new(db.pool.clone(), notifier),
            config,
            db,
            bus,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 数据库 (打开文件, 执行迁移)
    /// 2. 消息总线
    /// 3. 各服务
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path).await?;
        let bus = MessageBus::with_capacity(config.notify_channel_capacity);
        tracing::info!(
            tax_rate = config.tax_rate,
            channel_capacity = config.notify_channel_capacity,
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db, bus))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}
