//! 实时通知消息类型定义
//!
//! 这些类型在 pos-server 和 clients (服务员平板, 厨房屏) 之间共享。
//! Events are addressed to a [`Room`]; a client joins the rooms of its
//! role and, for kitchen screens, of its kitchen area.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "order:created")]
    OrderCreated,
    #[serde(rename = "order:updated")]
    OrderUpdated,
    #[serde(rename = "kitchen:new_items")]
    KitchenNewItems,
    #[serde(rename = "kitchen:status_changed")]
    KitchenStatusChanged,
    #[serde(rename = "kitchen:item_ready")]
    KitchenItemReady,
    #[serde(rename = "kitchen:priority")]
    KitchenPriority,
    #[serde(rename = "payment:completed")]
    PaymentCompleted,
    #[serde(rename = "table:status_changed")]
    TableStatusChanged,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrderCreated => "order:created",
            EventType::OrderUpdated => "order:updated",
            EventType::KitchenNewItems => "kitchen:new_items",
            EventType::KitchenStatusChanged => "kitchen:status_changed",
            EventType::KitchenItemReady => "kitchen:item_ready",
            EventType::KitchenPriority => "kitchen:priority",
            EventType::PaymentCompleted => "payment:completed",
            EventType::TableStatusChanged => "table:status_changed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 员工角色 (only used for event routing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Waiter,
    Chef,
    Cashier,
    Manager,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiter => "waiter",
            Self::Chef => "chef",
            Self::Cashier => "cashier",
            Self::Manager => "manager",
        }
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiter" => Ok(Self::Waiter),
            "chef" => Ok(Self::Chef),
            "cashier" => Ok(Self::Cashier),
            "manager" => Ok(Self::Manager),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Delivery scope of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Every connected client
    All,
    /// `role:<role>`
    Role(StaffRole),
    /// `area:<kitchen_area_id>`
    Area(i64),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::All => f.write_str("all"),
            Room::Role(role) => write!(f, "role:{}", role.as_str()),
            Room::Area(id) => write!(f, "area:{id}"),
        }
    }
}

impl FromStr for Room {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Room::All);
        }
        match s.split_once(':') {
            Some(("role", role)) => role.parse().map(Room::Role),
            Some(("area", id)) => id
                .parse()
                .map(Room::Area)
                .map_err(|_| format!("invalid area id: {id}")),
            _ => Err(format!("invalid room: {s}")),
        }
    }
}

/// 消息总线消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    /// Room name (`role:chef`, `area:3`); `None` reaches everyone
    pub target: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            target: None,
            payload,
        }
    }

    /// Serialize an event for a room
    pub fn from_event(event: &PosEvent, room: Room) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(event)?;
        let msg = Self::new(event.event_type(), payload);
        Ok(match room {
            Room::All => msg,
            other => msg.with_target(&other.to_string()),
        })
    }

    /// 设置目标房间
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    /// Whether a client that joined `rooms` should receive this message
    pub fn is_visible_to(&self, rooms: &[Room]) -> bool {
        match &self.target {
            None => true,
            Some(target) => rooms.iter().any(|r| r.to_string() == *target),
        }
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
