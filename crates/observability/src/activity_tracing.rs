use history_domain::{HistoryEventData, TaskScheduledEvent};

use crate::{CrossComponentTracer, StructuredLogger};

pub const TRACE_CONTEXT_PARSE_FAILURES: &str = "history_trace_context_parse_failures_total";

/// Extension trait to add tracing capabilities to scheduled activities
pub trait ActivityTracingExt {
    /// Create the dispatch span, parented on the trace context captured at scheduling time
    fn create_activity_span(&self, instance_id: &str, operation: &str) -> tracing::Span;
}

impl ActivityTracingExt for TaskScheduledEvent {
    fn create_activity_span(&self, instance_id: &str, operation: &str) -> tracing::Span {
        let parent = match self.try_get_parent_trace_context() {
            Ok(context) => Some(context),
            Err(error) => {
                // 解析失败不影响活动执行，只是开启新的 trace
                StructuredLogger::log_trace_context_rejected(instance_id, self, &error);
                metrics::counter!(TRACE_CONTEXT_PARSE_FAILURES).increment(1);
                None
            }
        };

        let attributes = vec![
            ("instance.id".to_string(), instance_id.to_string()),
            ("task.name".to_string(), self.name.clone()),
            (
                "task.version".to_string(),
                self.version.clone().unwrap_or_default(),
            ),
            (
                "history.event_id".to_string(),
                self.event_id().to_string(),
            ),
        ];

        CrossComponentTracer::create_child_span_from_context(
            parent,
            &format!("activity.{operation}"),
            attributes,
        )
    }
}
