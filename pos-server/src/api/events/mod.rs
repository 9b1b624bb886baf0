//! 实时通知 (Server-Sent Events)
//!
//! `GET /api/events?role=chef&area=2` joins `role:chef` and `area:2`;
//! broadcast events reach every subscriber. Each SSE frame carries the
//! event name (`kitchen:new_items`, ...) and the JSON-encoded event.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use serde::Deserialize;
use shared::message::{BusMessage, Room, StaffRole};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(subscribe))
}

/// Rooms to join
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub role: Option<String>,
    pub area: Option<i64>,
}

impl SubscribeQuery {
    pub fn rooms(&self) -> AppResult<Vec<Room>> {
        let mut rooms = Vec::new();
        if let Some(role) = &self.role {
            let role: StaffRole = role.parse().map_err(AppError::validation)?;
            rooms.push(Room::Role(role));
        }
        if let Some(area) = self.area {
            rooms.push(Room::Area(area));
        }
        Ok(rooms)
    }
}

fn to_sse(msg: &BusMessage) -> Event {
    Event::default()
        .event(msg.event_type.as_str())
        .id(msg.request_id.to_string())
        .data(String::from_utf8_lossy(&msg.payload))
}

/// GET /api/events
pub async fn subscribe(
    State(state): State<ServerState>,
    Query(query): Query<SubscribeQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let rooms = query.rooms()?;
    let rx = state.bus.subscribe();
    let token = state.bus.shutdown_token().clone();
    tracing::debug!(?rooms, "Event subscriber connected");

    let stream = futures::stream::unfold((rx, token, rooms), |(mut rx, token, rooms)| async move {
        loop {
            let received = tokio::select! {
                _ = token.cancelled() => return None,
                received = rx.recv() => received,
            };
            match received {
                Ok(msg) if msg.is_visible_to(&rooms) => {
                    let event = to_sse(&msg);
                    return Some((Ok(event), (rx, token, rooms)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagged, messages dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rooms_from_query() {
        let query = SubscribeQuery {
            role: Some("chef".into()),
            area: Some(2),
        };
        assert_eq!(
            query.rooms().unwrap(),
            vec![Room::Role(StaffRole::Chef), Room::Area(2)]
        );
        assert!(SubscribeQuery::default().rooms().unwrap().is_empty());

        let err = SubscribeQuery {
            role: Some("owner".into()),
            area: None,
        }
        .rooms()
        .unwrap_err();
        assert_eq!(err.code, shared::error::ErrorCode::ValidationFailed);
    }
}
