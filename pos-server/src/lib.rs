//! POS Server - 餐厅点餐/厨房/结账后端
//!
//! # 架构概述
//!
//! - **订单生命周期** (`orders`): 开台、加菜、送厨、账单计算
//! - **厨房队列** (`kitchen`): 每道菜的状态机, 由菜品状态推导订单状态
//! - **结账** (`payments`): 收款、找零、释放桌台、分单、折扣
//! - **实时通知** (`notify`): 按房间 (角色 / 厨房区域) 推送事件
//! - **数据库** (`db`): SQLite + sqlx, 每个操作一个事务
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、迁移、仓储函数
//! ├── orders/        # 订单生命周期
//! ├── kitchen/       # 厨房队列
//! ├── payments/      # 结账
//! ├── tables/        # 桌台
//! ├── inventory/     # 库存扣减 (best effort)
//! ├── notify/        # 消息总线与通知
//! ├── money/         # 金额计算 (rust_decimal)
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod inventory;
pub mod kitchen;
pub mod money;
pub mod notify;
pub mod orders;
pub mod payments;
pub mod tables;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use notify::{MessageBus, Notifier};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and start logging
///
/// Production logs are JSON.
pub fn setup_environment() -> Config {
    // .env is optional
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    init_logger_with_file(
        Some(config.log_level.as_str()),
        Some(config.is_production()),
        config.log_dir.as_deref(),
    );
    config
}
