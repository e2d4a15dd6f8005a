//! 编排历史事件
//!
//! 一个编排实例的全部历史由有序、只追加的 [`HistoryEvent`] 序列组成。
//! 事件类型由枚举变体决定，序列化时写入 `event_type` 标签，但内存中不存在可单独修改的类型字段。

mod event_raised;
mod execution;
mod task_outcome;
mod task_scheduled;
mod timer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use event_raised::EventRaisedEvent;
pub use execution::{
    ExecutionCompletedEvent, ExecutionStartedEvent, OrchestrationStatus,
    OrchestratorCompletedEvent, OrchestratorStartedEvent,
};
pub use task_outcome::{TaskCompletedEvent, TaskFailedEvent};
pub use task_scheduled::TaskScheduledEvent;
pub use timer::{TimerCreatedEvent, TimerFiredEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    ExecutionStarted,
    ExecutionCompleted,
    TaskScheduled,
    TaskCompleted,
    TaskFailed,
    TimerCreated,
    TimerFired,
    EventRaised,
    OrchestratorStarted,
    OrchestratorCompleted,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ExecutionStarted => "ExecutionStarted",
            EventType::ExecutionCompleted => "ExecutionCompleted",
            EventType::TaskScheduled => "TaskScheduled",
            EventType::TaskCompleted => "TaskCompleted",
            EventType::TaskFailed => "TaskFailed",
            EventType::TimerCreated => "TimerCreated",
            EventType::TimerFired => "TimerFired",
            EventType::EventRaised => "EventRaised",
            EventType::OrchestratorStarted => "OrchestratorStarted",
            EventType::OrchestratorCompleted => "OrchestratorCompleted",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 所有历史事件的公共身份
///
/// `event_id` 只能在构造时给定，之后只读；`event_type` 由具体类型决定。
pub trait HistoryEventData: Send + Sync {
    fn event_id(&self) -> i32;
    fn event_type(&self) -> EventType;
    fn timestamp(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum HistoryEvent {
    ExecutionStarted(ExecutionStartedEvent),
    ExecutionCompleted(ExecutionCompletedEvent),
    TaskScheduled(TaskScheduledEvent),
    TaskCompleted(TaskCompletedEvent),
    TaskFailed(TaskFailedEvent),
    TimerCreated(TimerCreatedEvent),
    TimerFired(TimerFiredEvent),
    EventRaised(EventRaisedEvent),
    OrchestratorStarted(OrchestratorStartedEvent),
    OrchestratorCompleted(OrchestratorCompletedEvent),
}

impl HistoryEvent {
    fn data(&self) -> &dyn HistoryEventData {
        match self {
            HistoryEvent::ExecutionStarted(event) => event,
            HistoryEvent::ExecutionCompleted(event) => event,
            HistoryEvent::TaskScheduled(event) => event,
            HistoryEvent::TaskCompleted(event) => event,
            HistoryEvent::TaskFailed(event) => event,
            HistoryEvent::TimerCreated(event) => event,
            HistoryEvent::TimerFired(event) => event,
            HistoryEvent::EventRaised(event) => event,
            HistoryEvent::OrchestratorStarted(event) => event,
            HistoryEvent::OrchestratorCompleted(event) => event,
        }
    }

    pub fn event_id(&self) -> i32 {
        self.data().event_id()
    }

    pub fn event_type(&self) -> EventType {
        self.data().event_type()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.data().timestamp()
    }

    pub fn as_task_scheduled(&self) -> Option<&TaskScheduledEvent> {
        match self {
            HistoryEvent::TaskScheduled(event) => Some(event),
            _ => None,
        }
    }
}

impl From<ExecutionStartedEvent> for HistoryEvent {
    fn from(event: ExecutionStartedEvent) -> Self {
        HistoryEvent::ExecutionStarted(event)
    }
}

impl From<ExecutionCompletedEvent> for HistoryEvent {
    fn from(event: ExecutionCompletedEvent) -> Self {
        HistoryEvent::ExecutionCompleted(event)
    }
}

impl From<TaskScheduledEvent> for HistoryEvent {
    fn from(event: TaskScheduledEvent) -> Self {
        HistoryEvent::TaskScheduled(event)
    }
}

impl From<TaskCompletedEvent> for HistoryEvent {
    fn from(event: TaskCompletedEvent) -> Self {
        HistoryEvent::TaskCompleted(event)
    }
}

impl From<TaskFailedEvent> for HistoryEvent {
    fn from(event: TaskFailedEvent) -> Self {
        HistoryEvent::TaskFailed(event)
    }
}

impl From<TimerCreatedEvent> for HistoryEvent {
    fn from(event: TimerCreatedEvent) -> Self {
        HistoryEvent::TimerCreated(event)
    }
}

impl From<TimerFiredEvent> for HistoryEvent {
    fn from(event: TimerFiredEvent) -> Self {
        HistoryEvent::TimerFired(event)
    }
}

impl From<EventRaisedEvent> for HistoryEvent {
    fn from(event: EventRaisedEvent) -> Self {
        HistoryEvent::EventRaised(event)
    }
}

impl From<OrchestratorStartedEvent> for HistoryEvent {
    fn from(event: OrchestratorStartedEvent) -> Self {
        HistoryEvent::OrchestratorStarted(event)
    }
}

impl From<OrchestratorCompletedEvent> for HistoryEvent {
    fn from(event: OrchestratorCompletedEvent) -> Self {
        HistoryEvent::OrchestratorCompleted(event)
    }
}
