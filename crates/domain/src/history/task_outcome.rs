use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventType, HistoryEventData};

/// 活动执行成功，`task_scheduled_id` 指向对应的 TaskScheduled 事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub task_scheduled_id: i32,
    #[serde(default)]
    pub result: Option<String>,
}

impl TaskCompletedEvent {
    pub fn new(event_id: i32, task_scheduled_id: i32, result: Option<String>) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            task_scheduled_id,
            result,
        }
    }
}

impl HistoryEventData for TaskCompletedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::TaskCompleted
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 活动执行失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub task_scheduled_id: i32,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl TaskFailedEvent {
    pub fn new(
        event_id: i32,
        task_scheduled_id: i32,
        reason: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            task_scheduled_id,
            reason: reason.into(),
            details,
        }
    }
}

impl HistoryEventData for TaskFailedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::TaskFailed
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
