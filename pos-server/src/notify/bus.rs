//! 消息总线
//!
//! A single broadcast channel from the server to every subscriber. Room
//! filtering happens on the receiving side via [`BusMessage::is_visible_to`].

use async_trait::async_trait;
use shared::message::{BusMessage, PosEvent, Room};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::Notifier;
use crate::utils::AppError;

/// Default capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 1024;

/// 消息总线 - 服务器到客户端的广播通道
#[derive(Debug, Clone)]
pub struct MessageBus {
    server_tx: broadcast::Sender<BusMessage>,
    shutdown_token: CancellationToken,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布消息 (服务器 -> 所有订阅者)
    ///
    /// Fails only when nobody is subscribed.
    pub fn publish(&self, msg: BusMessage) -> Result<usize, AppError> {
        self.server_tx
            .send(msg)
            .map_err(|e| AppError::internal(e.to_string()))
    }

    /// 订阅服务器广播
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }

    /// 关闭令牌; cancelled on server shutdown so open streams end
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Notifier`] backed by the in-process [`MessageBus`]
#[derive(Debug, Clone)]
pub struct MessageBusNotifier {
    bus: MessageBus,
}

impl MessageBusNotifier {
    pub fn new(bus: MessageBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }
}

#[async_trait]
impl Notifier for MessageBusNotifier {
    async fn publish(&self, event: PosEvent, room: Room) {
        let event_type = event.event_type();
        let msg = match BusMessage::from_event(&event, room) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(event = %event_type, error = %e, "Failed to encode event");
                return;
            }
        };
        match self.bus.publish(msg) {
            Ok(receivers) => {
                tracing::debug!(event = %event_type, room = %room, receivers, "Event published")
            }
            Err(_) => tracing::debug!(event = %event_type, room = %room, "No subscribers, event dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{EventType, StaffRole};
    use shared::message::payload::TableStatusChangedPayload;
    use shared::models::TableStatus;

    fn table_event() -> PosEvent {
        PosEvent::TableStatusChanged(TableStatusChangedPayload {
            table_id: 5,
            status: TableStatus::NeedsCleaning,
            current_order_id: None,
        })
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let notifier = MessageBusNotifier::new(MessageBus::with_capacity(8));
        notifier.publish(table_event(), Room::All).await;
        assert_eq!(notifier.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_targeted_message() {
        let bus = MessageBus::with_capacity(8);
        let mut rx = bus.subscribe();
        let notifier = MessageBusNotifier::new(bus);

        notifier
            .publish(table_event(), Room::Role(StaffRole::Waiter))
            .await;

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.event_type, EventType::TableStatusChanged);
        assert_eq!(msg.target.as_deref(), Some("role:waiter"));
        assert!(msg.is_visible_to(&[Room::Role(StaffRole::Waiter)]));
        assert!(!msg.is_visible_to(&[Room::Role(StaffRole::Chef)]));
        let event: PosEvent = msg.parse_payload().unwrap();
        assert_eq!(event, table_event());
    }
}
