//! Data models
//!
//! Shared between pos-server and its clients (via API and event payloads).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are epoch millis.

pub mod audit_log;
pub mod dining_table;
pub mod kitchen;
pub mod menu_item;
pub mod order;
pub mod order_line;
pub mod payment;

// Re-exports
pub use audit_log::*;
pub use dining_table::*;
pub use kitchen::*;
pub use menu_item::*;
pub use order::*;
pub use order_line::*;
pub use payment::*;
