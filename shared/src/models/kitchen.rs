//! Kitchen Queue Model
//!
//! One [`KitchenTicket`] per dispatched order line. The ticket status
//! machine lives here so every caller shares the same transition table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LineModifier, OrderLineStatus, OrderStatus};

/// Kitchen ticket status
///
/// ```text
/// pending ──► cooking ──► ready ──► served
///    │           │
///    └───────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum KitchenStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
    Served,
    Cancelled,
}

impl KitchenStatus {
    /// Statuses shown on the kitchen display by default
    pub const ACTIVE: [KitchenStatus; 2] = [KitchenStatus::Pending, KitchenStatus::Cooking];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cooking => "cooking",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step from `self`
    pub fn allowed_next(&self) -> &'static [KitchenStatus] {
        match self {
            Self::Pending => &[Self::Cooking, Self::Cancelled],
            Self::Cooking => &[Self::Ready, Self::Cancelled],
            Self::Ready => &[Self::Served],
            Self::Served | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: KitchenStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Status mirrored onto the ticket's order line
    pub fn line_status(&self) -> OrderLineStatus {
        match self {
            Self::Pending => OrderLineStatus::SentToKitchen,
            Self::Cooking => OrderLineStatus::Cooking,
            Self::Ready => OrderLineStatus::Ready,
            Self::Served => OrderLineStatus::Served,
            Self::Cancelled => OrderLineStatus::Cancelled,
        }
    }
}

impl std::str::FromStr for KitchenStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "cooking" => Ok(Self::Cooking),
            "ready" => Ok(Self::Ready),
            "served" => Ok(Self::Served),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown kitchen status: {other}")),
        }
    }
}

/// Kitchen area (station), e.g. grill, bar
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenArea {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Kitchen queue ticket (厨房单)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenTicket {
    pub id: i64,
    pub order_id: i64,
    pub order_line_id: i64,
    pub menu_item_id: i64,
    pub kitchen_area_id: Option<i64>,
    pub quantity: i32,
    pub status: KitchenStatus,
    pub is_priority: bool,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Joined row for the kitchen display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KitchenQueueEntry {
    pub id: i64,
    pub order_id: i64,
    pub order_line_id: i64,
    pub order_number: String,
    pub table_number: String,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub modifiers: Vec<LineModifier>,
    pub note: Option<String>,
    pub status: KitchenStatus,
    pub is_priority: bool,
    pub kitchen_area_id: Option<i64>,
    pub kitchen_area_name: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub wait_time_minutes: i64,
    pub started_at: Option<i64>,
    pub created_at: i64,
}

/// Kitchen queue filter
///
/// `status` is a comma separated list; empty means pending + cooking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KitchenQueueQuery {
    pub kitchen_area_id: Option<i64>,
    pub status: Option<String>,
}

impl KitchenQueueQuery {
    pub fn statuses(&self) -> Result<Vec<KitchenStatus>, String> {
        let parsed = match self.status.as_deref() {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<_>, _>>()?,
        };
        if parsed.is_empty() {
            Ok(KitchenStatus::ACTIVE.to_vec())
        } else {
            Ok(parsed)
        }
    }
}

/// Ticket status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenStatusUpdate {
    pub status: KitchenStatus,
}

/// Outcome of a ticket status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenStatusChange {
    pub ticket: KitchenTicket,
    pub from: KitchenStatus,
    /// New order status when the change completed the order's lines
    pub order_status: Option<OrderStatus>,
}

/// One line pushed into the kitchen queue at dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedItem {
    pub kitchen_queue_id: i64,
    pub order_line_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub kitchen_area_id: Option<i64>,
}

/// Result of sending an order to the kitchen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenDispatch {
    pub order_id: i64,
    pub order_number: String,
    pub table_id: i64,
    pub items: Vec<DispatchedItem>,
}

impl KitchenDispatch {
    /// Items grouped by kitchen area (`None` = unassigned station)
    pub fn by_area(&self) -> BTreeMap<Option<i64>, Vec<DispatchedItem>> {
        let mut groups: BTreeMap<Option<i64>, Vec<DispatchedItem>> = BTreeMap::new();
        for item in &self.items {
            groups
                .entry(item.kitchen_area_id)
                .or_default()
                .push(item.clone());
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [KitchenStatus; 5] = [
        KitchenStatus::Pending,
        KitchenStatus::Cooking,
        KitchenStatus::Ready,
        KitchenStatus::Served,
        KitchenStatus::Cancelled,
    ];

    #[test]
    fn test_transition_table() {
        use KitchenStatus::*;
        let allowed = [
            (Pending, Cooking),
            (Pending, Cancelled),
            (Cooking, Ready),
            (Cooking, Cancelled),
            (Ready, Served),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(KitchenStatus::Served.is_terminal());
        assert!(KitchenStatus::Cancelled.is_terminal());
        assert!(!KitchenStatus::Ready.is_terminal());
    }

    #[test]
    fn test_line_status_mapping() {
        assert_eq!(
            KitchenStatus::Pending.line_status(),
            OrderLineStatus::SentToKitchen
        );
        assert_eq!(KitchenStatus::Ready.line_status(), OrderLineStatus::Ready);
        assert_eq!(
            KitchenStatus::Cancelled.line_status(),
            OrderLineStatus::Cancelled
        );
    }

    #[test]
    fn test_queue_query_defaults_to_active() {
        let query = KitchenQueueQuery::default();
        assert_eq!(query.statuses().unwrap(), KitchenStatus::ACTIVE.to_vec());

        let query = KitchenQueueQuery {
            kitchen_area_id: None,
            status: Some("ready, served".into()),
        };
        assert_eq!(
            query.statuses().unwrap(),
            vec![KitchenStatus::Ready, KitchenStatus::Served]
        );

        let query = KitchenQueueQuery {
            kitchen_area_id: None,
            status: Some("burnt".into()),
        };
        assert!(query.statuses().is_err());
    }

    #[test]
    fn test_dispatch_grouping() {
        let item = |id: i64, area: Option<i64>| DispatchedItem {
            kitchen_queue_id: id,
            order_line_id: id,
            menu_item_id: 1,
            item_name: "Soup".into(),
            quantity: 1,
            kitchen_area_id: area,
        };
        let dispatch = KitchenDispatch {
            order_id: 1,
            order_number: "ORD-20260101-0001".into(),
            table_id: 5,
            items: vec![item(1, Some(2)), item(2, None), item(3, Some(2))],
        };
        let groups = dispatch.by_area();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Some(2)].len(), 2);
        assert_eq!(groups[&None].len(), 1);
    }
}
