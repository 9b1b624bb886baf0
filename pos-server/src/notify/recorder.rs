use async_trait::async_trait;
use parking_lot::Mutex;
use shared::message::{EventType, PosEvent, Room};

use super::Notifier;

/// Notifier that keeps every published event in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(PosEvent, Room)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(PosEvent, Room)> {
        self.events.lock().clone()
    }

    pub fn of_type(&self, event_type: EventType) -> Vec<(PosEvent, Room)> {
        self.events
            .lock()
            .iter()
            .filter(|(event, _)| event.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, event: PosEvent, room: Room) {
        self.events.lock().push((event, room));
    }
}
