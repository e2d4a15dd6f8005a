//! 编排决策记录
//!
//! 决策引擎通过 [`DecisionRecorder`] 把调度决定写入历史日志。
//! 事件ID在这里按发生顺序分配，追踪上下文也只在这里写入。

use chrono::{DateTime, Utc};
use history_core::{HistoryError, HistoryResult};
use tracing::debug;

use crate::history::{
    EventRaisedEvent, ExecutionCompletedEvent, ExecutionStartedEvent, HistoryEvent,
    OrchestrationStatus, OrchestratorCompletedEvent, OrchestratorStartedEvent,
    TaskCompletedEvent, TaskFailedEvent, TaskScheduledEvent, TimerCreatedEvent, TimerFiredEvent,
};
use crate::history_log::HistoryLog;
use crate::trace_context::AmbientSpan;

/// 单个编排实例的决策记录器，单写者
#[derive(Debug, Default)]
pub struct DecisionRecorder {
    log: HistoryLog,
}

impl DecisionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在已加载的历史之后继续记录
    pub fn resume(log: HistoryLog) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn into_log(self) -> HistoryLog {
        self.log
    }

    fn record(&mut self, event: HistoryEvent) -> HistoryResult<i32> {
        let event_id = event.event_id();
        let event_type = event.event_type();
        self.log.append(event)?;
        debug!(event.id = event_id, event.type = %event_type, "history event recorded");
        Ok(event_id)
    }

    pub fn start_execution(
        &mut self,
        instance_id: &str,
        name: &str,
        version: Option<&str>,
        input: Option<String>,
        active_span: Option<&dyn AmbientSpan>,
    ) -> HistoryResult<i32> {
        let mut event = ExecutionStartedEvent::new(self.log.next_event_id()?, instance_id, name);
        event.version = version.map(str::to_string);
        event.input = input;
        event.set_parent_trace_context(active_span);
        self.record(event.into())
    }

    /// 记录调度活动的决定，返回 TaskScheduled 事件ID
    pub fn schedule_task(
        &mut self,
        name: &str,
        version: Option<&str>,
        input: Option<String>,
        active_span: Option<&dyn AmbientSpan>,
    ) -> HistoryResult<i32> {
        let mut event = TaskScheduledEvent::new(self.log.next_event_id()?);
        event.name = name.to_string();
        event.version = version.map(str::to_string);
        event.input = input;
        event.set_parent_trace_context(active_span);
        self.record(event.into())
    }

    pub fn complete_task(&mut self, scheduled_id: i32, result: Option<String>) -> HistoryResult<i32> {
        self.ensure_scheduled(scheduled_id)?;
        let event = TaskCompletedEvent::new(self.log.next_event_id()?, scheduled_id, result);
        self.record(event.into())
    }

    pub fn fail_task(
        &mut self,
        scheduled_id: i32,
        reason: &str,
        details: Option<String>,
    ) -> HistoryResult<i32> {
        self.ensure_scheduled(scheduled_id)?;
        let event = TaskFailedEvent::new(self.log.next_event_id()?, scheduled_id, reason, details);
        self.record(event.into())
    }

    pub fn create_timer(&mut self, fire_at: DateTime<Utc>) -> HistoryResult<i32> {
        let event = TimerCreatedEvent::new(self.log.next_event_id()?, fire_at);
        self.record(event.into())
    }

    pub fn fire_timer(&mut self, timer_id: i32) -> HistoryResult<i32> {
        let fire_at = self
            .log
            .events()
            .iter()
            .find_map(|event| match event {
                HistoryEvent::TimerCreated(timer) if event.event_id() == timer_id => {
                    Some(timer.fire_at)
                }
                _ => None,
            })
            .ok_or_else(|| {
                HistoryError::Internal(format!("定时器不存在: timer_id={timer_id}"))
            })?;
        let event = TimerFiredEvent::new(self.log.next_event_id()?, timer_id, fire_at);
        self.record(event.into())
    }

    pub fn raise_event(&mut self, name: &str, input: Option<String>) -> HistoryResult<i32> {
        let event = EventRaisedEvent::new(self.log.next_event_id()?, name, input);
        self.record(event.into())
    }

    pub fn begin_episode(&mut self) -> HistoryResult<i32> {
        let event = OrchestratorStartedEvent::new(self.log.next_event_id()?);
        self.record(event.into())
    }

    pub fn end_episode(&mut self) -> HistoryResult<i32> {
        let event = OrchestratorCompletedEvent::new(self.log.next_event_id()?);
        self.record(event.into())
    }

    pub fn complete_execution(
        &mut self,
        status: OrchestrationStatus,
        result: Option<String>,
    ) -> HistoryResult<i32> {
        let event = ExecutionCompletedEvent::new(self.log.next_event_id()?, status, result);
        self.record(event.into())
    }

    fn ensure_scheduled(&self, scheduled_id: i32) -> HistoryResult<()> {
        match self.log.task_scheduled(scheduled_id) {
            Some(_) => Ok(()),
            None => Err(HistoryError::task_not_scheduled(scheduled_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{EventType, HistoryEventData};
    use crate::trace_context::TraceContextBridge;
    use opentelemetry::trace::SpanContext;

    const TRACE_PARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn active_span() -> SpanContext {
        TraceContextBridge::try_parse(Some(TRACE_PARENT), Some("vendor=value")).unwrap()
    }

    #[test]
    fn test_event_ids_follow_occurrence_order() {
        let mut recorder = DecisionRecorder::new();
        recorder.begin_episode().unwrap();
        recorder
            .start_execution("instance-1", "Checkout", None, None, None)
            .unwrap();
        let scheduled = recorder
            .schedule_task("ChargeCard", Some("1.0"), Some("{}".to_string()), None)
            .unwrap();
        recorder.end_episode().unwrap();
        recorder.complete_task(scheduled, Some("ok".to_string())).unwrap();

        let ids: Vec<i32> = recorder.log().events().iter().map(|e| e.event_id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(scheduled, 2);
    }

    #[test]
    fn test_schedule_task_captures_active_span() {
        let span = active_span();
        let mut recorder = DecisionRecorder::new();
        let id = recorder
            .schedule_task("SendEmail", None, None, Some(&span))
            .unwrap();

        let event = recorder.log().task_scheduled(id).unwrap();
        assert_eq!(event.event_type(), EventType::TaskScheduled);
        assert_eq!(event.name, "SendEmail");

        let stored = event.parent_trace_context().unwrap();
        assert_eq!(stored.trace_parent(), TRACE_PARENT);
        assert_eq!(stored.trace_state(), "vendor=value");

        let parsed = event.try_get_parent_trace_context().unwrap();
        assert_eq!(parsed.trace_id(), span.trace_id());
        assert_eq!(parsed.span_id(), span.span_id());
    }

    #[test]
    fn test_schedule_task_without_span() {
        let mut recorder = DecisionRecorder::new();
        let id = recorder.schedule_task("SendEmail", None, None, None).unwrap();

        let event = recorder.log().task_scheduled(id).unwrap();
        assert!(event.parent_trace_context().is_none());
        assert_eq!(
            event.try_get_parent_trace_context(),
            Ok(SpanContext::empty_context())
        );
    }

    #[test]
    fn test_invalid_span_context_is_not_captured() {
        let invalid = SpanContext::empty_context();
        let mut recorder = DecisionRecorder::new();
        let id = recorder
            .schedule_task("SendEmail", None, None, Some(&invalid))
            .unwrap();

        assert!(recorder
            .log()
            .task_scheduled(id)
            .unwrap()
            .parent_trace_context()
            .is_none());
    }

    #[test]
    fn test_start_execution_captures_active_span() {
        let span = active_span();
        let mut recorder = DecisionRecorder::new();
        recorder
            .start_execution("instance-7", "Flow", Some("2"), None, Some(&span))
            .unwrap();

        match &recorder.log().events()[0] {
            HistoryEvent::ExecutionStarted(event) => {
                assert_eq!(event.instance_id, "instance-7");
                assert_eq!(event.version.as_deref(), Some("2"));
                assert_eq!(
                    event.parent_trace_context().map(|c| c.trace_parent()),
                    Some(TRACE_PARENT)
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_completing_unknown_task_fails() {
        let mut recorder = DecisionRecorder::new();
        let err = recorder.complete_task(3, None).unwrap_err();
        assert!(matches!(err, HistoryError::TaskNotScheduled { scheduled_id: 3 }));

        let err = recorder.fail_task(3, "boom", None).unwrap_err();
        assert!(matches!(err, HistoryError::TaskNotScheduled { scheduled_id: 3 }));
        assert!(recorder.log().is_empty());
    }

    #[test]
    fn test_timer_lifecycle() {
        let mut recorder = DecisionRecorder::new();
        let fire_at = Utc::now();
        let timer_id = recorder.create_timer(fire_at).unwrap();
        let fired_id = recorder.fire_timer(timer_id).unwrap();

        match &recorder.log().events()[1] {
            HistoryEvent::TimerFired(event) => {
                assert_eq!(event.event_id(), fired_id);
                assert_eq!(event.timer_id, timer_id);
                assert_eq!(event.fire_at, fire_at);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert!(recorder.fire_timer(99).is_err());
    }

    #[test]
    fn test_resume_after_max_event_id_fails_without_panic() {
        let log = HistoryLog::from_json(
            r#"[{"event_type":"TaskScheduled","event_id":2147483647,"name":"A"}]"#,
        )
        .unwrap();
        let mut recorder = DecisionRecorder::resume(log);

        let err = recorder.schedule_task("B", None, None, None).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::EventIdExhausted {
                last_event_id: i32::MAX
            }
        ));
        assert!(recorder.begin_episode().is_err());
        assert_eq!(recorder.log().len(), 1);
    }

    #[test]
    fn test_resume_continues_numbering() {
        let mut recorder = DecisionRecorder::new();
        recorder.schedule_task("A", None, None, None).unwrap();
        recorder.raise_event("approval", None).unwrap();

        let mut resumed = DecisionRecorder::resume(recorder.into_log());
        let id = resumed.schedule_task("B", None, None, None).unwrap();
        assert_eq!(id, 2);

        resumed
            .complete_execution(OrchestrationStatus::Completed, Some("done".to_string()))
            .unwrap();
        assert_eq!(resumed.log().len(), 4);
    }
}
