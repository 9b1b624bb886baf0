//! Shared types for the POS backend
//!
//! Common types used by pos-server and its clients: error codes and API
//! responses, domain models, and real-time event payloads.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType, PosEvent, Room, StaffRole};
