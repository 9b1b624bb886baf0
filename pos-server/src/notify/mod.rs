//! Real-time notification fan-out
//!
//! Services publish [`PosEvent`]s to a [`Notifier`] after their transaction
//! commits. Delivery is fire-and-forget: publishing never fails the caller.
//!
//! ```text
//! OrderService / KitchenService / PaymentService
//!          │ publish(event, room)
//!          ▼
//!   MessageBusNotifier ──► MessageBus (broadcast) ──► /api/events (SSE)
//! ```

mod bus;
mod recorder;

pub use bus::{MessageBus, MessageBusNotifier};
pub use recorder::RecordingNotifier;

use async_trait::async_trait;
use shared::message::{PosEvent, Room};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Best-effort delivery of one event to a room
    async fn publish(&self, event: PosEvent, room: Room);

    async fn publish_all(&self, events: Vec<(PosEvent, Room)>) {
        for (event, room) in events {
            self.publish(event, room).await;
        }
    }
}
