use chrono::{DateTime, Utc};
use opentelemetry::trace::SpanContext;
use serde::{Deserialize, Serialize};

use super::{EventType, HistoryEventData};
use crate::trace_context::{AmbientSpan, DistributedTraceContext, TraceContextError};

/// 编排实例开始执行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStartedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub instance_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_trace_context: Option<DistributedTraceContext>,
}

impl ExecutionStartedEvent {
    pub fn new(event_id: i32, instance_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            instance_id: instance_id.into(),
            name: name.into(),
            version: None,
            input: None,
            parent_trace_context: None,
        }
    }

    pub fn parent_trace_context(&self) -> Option<&DistributedTraceContext> {
        self.parent_trace_context.as_ref()
    }

    pub fn try_get_parent_trace_context(&self) -> Result<SpanContext, TraceContextError> {
        match &self.parent_trace_context {
            Some(context) => context.try_parse(),
            None => Ok(SpanContext::empty_context()),
        }
    }

    /// 新建编排实例时由调度组件调用
    pub(crate) fn set_parent_trace_context(&mut self, active_span: Option<&dyn AmbientSpan>) {
        if let Some(context) = DistributedTraceContext::capture(active_span) {
            self.parent_trace_context = Some(context);
        }
    }
}

impl HistoryEventData for ExecutionStartedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::ExecutionStarted
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestrationStatus {
    Completed,
    Failed,
    Terminated,
}

/// 编排实例执行结束
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionCompletedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    pub orchestration_status: OrchestrationStatus,
    #[serde(default)]
    pub result: Option<String>,
}

impl ExecutionCompletedEvent {
    pub fn new(event_id: i32, orchestration_status: OrchestrationStatus, result: Option<String>) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            orchestration_status,
            result,
        }
    }
}

impl HistoryEventData for ExecutionCompletedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::ExecutionCompleted
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 一轮编排决策开始
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStartedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl OrchestratorStartedEvent {
    pub fn new(event_id: i32) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
        }
    }
}

impl HistoryEventData for OrchestratorStartedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::OrchestratorStarted
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// 一轮编排决策结束
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorCompletedEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl OrchestratorCompletedEvent {
    pub fn new(event_id: i32) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
        }
    }
}

impl HistoryEventData for OrchestratorCompletedEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::OrchestratorCompleted
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
