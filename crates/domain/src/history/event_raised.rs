use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventType, HistoryEventData};

/// 外部事件送达编排实例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRaisedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub input: Option<String>,
}

impl EventRaisedEvent {
    pub fn new(event_id: i32, name: impl Into<String>, input: Option<String>) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            name: name.into(),
            input,
        }
    }
}

impl HistoryEventData for EventRaisedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::EventRaised
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
