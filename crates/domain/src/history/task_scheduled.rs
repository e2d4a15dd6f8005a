use chrono::{DateTime, Utc};
use opentelemetry::trace::SpanContext;
use serde::{Deserialize, Serialize};

use super::{EventType, HistoryEventData};
use crate::trace_context::{AmbientSpan, DistributedTraceContext, TraceContextError};

/// 编排决定调用活动 `name`@`version`，输入为 `input`
///
/// 名称、版本和输入都是不透明数据，这里不做校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskScheduledEvent {
    event_id: i32,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    /// 早期格式没有该字段，读取旧数据时为 `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_trace_context: Option<DistributedTraceContext>,
}

impl TaskScheduledEvent {
    pub fn new(event_id: i32) -> Self {
        Self {
            event_id,
            timestamp: Utc::now(),
            name: String::new(),
            version: None,
            input: None,
            parent_trace_context: None,
        }
    }

    pub fn parent_trace_context(&self) -> Option<&DistributedTraceContext> {
        self.parent_trace_context.as_ref()
    }

    /// 解析调度时记录的追踪上下文
    ///
    /// 没有记录时返回空上下文（成功），记录的字符串格式错误时返回 `Err`，不会 panic。
    pub fn try_get_parent_trace_context(&self) -> Result<SpanContext, TraceContextError> {
        match &self.parent_trace_context {
            Some(context) => context.try_parse(),
            None => Ok(SpanContext::empty_context()),
        }
    }

    /// 仅供调度组件在创建事件时调用一次
    pub(crate) fn set_parent_trace_context(&mut self, active_span: Option<&dyn AmbientSpan>) {
        if let Some(context) = DistributedTraceContext::capture(active_span) {
            self.parent_trace_context = Some(context);
        }
    }
}

impl HistoryEventData for TaskScheduledEvent {
    fn event_id(&self) -> i32 {
        self.event_id
    }

    fn event_type(&self) -> EventType {
        EventType::TaskScheduled
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_context::TraceContextBridge;

    const TRACE_PARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    struct FixedSpan {
        id: &'static str,
        state: &'static str,
    }

    impl AmbientSpan for FixedSpan {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn trace_state_string(&self) -> String {
            self.state.to_string()
        }
    }

    #[test]
    fn test_new_event_identity() {
        for event_id in [0, 1, 42, i32::MAX] {
            let event = TaskScheduledEvent::new(event_id);
            assert_eq!(event.event_id(), event_id);
            assert_eq!(event.event_type(), EventType::TaskScheduled);
            assert!(event.name.is_empty());
            assert!(event.version.is_none());
            assert!(event.input.is_none());
            assert!(event.parent_trace_context().is_none());
        }
    }

    #[test]
    fn test_unset_trace_context_parses_as_empty() {
        let event = TaskScheduledEvent::new(1);
        assert_eq!(
            event.try_get_parent_trace_context(),
            Ok(SpanContext::empty_context())
        );
    }

    #[test]
    fn test_capture_then_parse_round_trip() {
        let mut event = TaskScheduledEvent::new(3);
        let span = FixedSpan {
            id: TRACE_PARENT,
            state: "vendor=value",
        };
        event.set_parent_trace_context(Some(&span));

        let stored = event.parent_trace_context().unwrap();
        assert_eq!(stored.trace_parent(), TRACE_PARENT);
        assert_eq!(stored.trace_state(), "vendor=value");

        let context = event.try_get_parent_trace_context().unwrap();
        assert_eq!(TraceContextBridge::format_trace_parent(&context), TRACE_PARENT);
        assert_eq!(
            context.trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
        assert_eq!(context.span_id().to_string(), "00f067aa0ba902b7");
        assert_eq!(context.trace_state().header(), "vendor=value");
    }

    #[test]
    fn test_malformed_trace_parent_reports_failure() {
        let mut event = TaskScheduledEvent::new(5);
        let span = FixedSpan {
            id: "not-a-traceparent",
            state: "",
        };
        event.set_parent_trace_context(Some(&span));

        assert!(event.try_get_parent_trace_context().is_err());
        // 重复读取结果一致
        assert!(event.try_get_parent_trace_context().is_err());
    }

    #[test]
    fn test_capture_without_active_span_leaves_context_unset() {
        let mut event = TaskScheduledEvent::new(2);
        event.set_parent_trace_context(None);

        assert!(event.parent_trace_context().is_none());
        assert_eq!(
            event.try_get_parent_trace_context(),
            Ok(SpanContext::empty_context())
        );
    }

    #[test]
    fn test_serde_round_trip_with_and_without_trace_context() {
        let mut with_trace = TaskScheduledEvent::new(7);
        with_trace.name = "SendEmail".to_string();
        with_trace.version = Some("2.0".to_string());
        with_trace.input = Some(r#"{"to":"ops@example.com"}"#.to_string());
        with_trace.set_parent_trace_context(Some(&FixedSpan {
            id: TRACE_PARENT,
            state: "vendor=value",
        }));

        let mut without_trace = with_trace.clone();
        without_trace.parent_trace_context = None;

        for event in [with_trace, without_trace] {
            let json = serde_json::to_string(&event).unwrap();
            let decoded: TaskScheduledEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn test_old_format_without_trace_context_field() {
        let json = r#"{"event_id":9,"name":"Legacy","version":"1.0","input":"\"x\""}"#;
        let event: TaskScheduledEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.event_id(), 9);
        assert_eq!(event.name, "Legacy");
        assert!(event.parent_trace_context().is_none());
        assert!(event.try_get_parent_trace_context().is_ok());
    }

    #[test]
    fn test_null_version_and_input_are_accepted() {
        let json = r#"{"event_id":1,"name":"A","version":null,"input":null}"#;
        let event: TaskScheduledEvent = serde_json::from_str(json).unwrap();
        assert!(event.version.is_none());
        assert!(event.input.is_none());
    }
}
