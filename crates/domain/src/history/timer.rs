use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventType, HistoryEventData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCreatedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub fire_at: DateTime<Utc>,
}

impl TimerCreatedEvent {
    pub fn new(event_id: i32, fire_at: DateTime<Utc>) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            fire_at,
        }
    }
}

impl HistoryEventData for TimerCreatedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::TimerCreated
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerFiredEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub timer_id: i32,
    pub fire_at: DateTime<Utc>,
}

impl TimerFiredEvent {
    pub fn new(event_id: i32, timer_id: i32, fire_at: DateTime<Utc>) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            timer_id,
            fire_at,
        }
    }
}

impl HistoryEventData for TimerFiredEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::TimerFired
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
