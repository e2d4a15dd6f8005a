//! history-inspector 子命令实现
//!
//! 输出写入调用方提供的 writer，便于测试。

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use history_domain::{
    AmbientSpan, DecisionRecorder, DistributedTraceContext, HistoryError, HistoryEvent,
    HistoryLog, HistoryRepository, OrchestrationStatus,
};
use history_observability::{CrossComponentTracer, StructuredLogger};
use tracing::info;

pub async fn list(repo: &dyn HistoryRepository, out: &mut impl Write) -> Result<()> {
    let instances = repo.list_instances().await?;
    if instances.is_empty() {
        writeln!(out, "no orchestration instances")?;
    }
    for instance_id in instances {
        writeln!(out, "{instance_id}")?;
    }
    Ok(())
}

async fn load(repo: &dyn HistoryRepository, instance_id: &str) -> Result<HistoryLog> {
    let log = repo
        .load(instance_id)
        .await?
        .ok_or_else(|| HistoryError::instance_not_found(instance_id))?;
    StructuredLogger::log_history_loaded(instance_id, &log);
    Ok(log)
}

pub async fn show(repo: &dyn HistoryRepository, instance_id: &str, out: &mut impl Write) -> Result<()> {
    let log = load(repo, instance_id).await?;
    writeln!(out, "instance {instance_id} ({} events)", log.len())?;
    for event in &log {
        writeln!(
            out,
            "{:>5}  {:<22} {}  {}",
            event.event_id(),
            event.event_type(),
            event.timestamp().to_rfc3339(),
            describe(event)
        )?;
    }
    Ok(())
}

fn describe(event: &HistoryEvent) -> String {
    match event {
        HistoryEvent::ExecutionStarted(e) => format!(
            "name={} version={} instance={}",
            e.name,
            e.version.as_deref().unwrap_or("-"),
            e.instance_id
        ),
        HistoryEvent::ExecutionCompleted(e) => format!(
            "status={:?} result={}",
            e.orchestration_status,
            e.result.as_deref().unwrap_or("-")
        ),
        HistoryEvent::TaskScheduled(e) => format!(
            "name={} version={} input={}",
            e.name,
            e.version.as_deref().unwrap_or("-"),
            e.input.as_deref().unwrap_or("-")
        ),
        HistoryEvent::TaskCompleted(e) => format!(
            "scheduled_id={} result={}",
            e.task_scheduled_id,
            e.result.as_deref().unwrap_or("-")
        ),
        HistoryEvent::TaskFailed(e) => {
            format!("scheduled_id={} reason={}", e.task_scheduled_id, e.reason)
        }
        HistoryEvent::TimerCreated(e) => format!("fire_at={}", e.fire_at.to_rfc3339()),
        HistoryEvent::TimerFired(e) => {
            format!("timer_id={} fire_at={}", e.timer_id, e.fire_at.to_rfc3339())
        }
        HistoryEvent::EventRaised(e) => format!("name={}", e.name),
        HistoryEvent::OrchestratorStarted(_) | HistoryEvent::OrchestratorCompleted(_) => {
            String::new()
        }
    }
}

/// 逐个列出带追踪上下文的事件及其解析结果
pub async fn traces(
    repo: &dyn HistoryRepository,
    instance_id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let log = load(repo, instance_id).await?;
    for event in &log {
        let (label, stored, parsed) = match event {
            HistoryEvent::ExecutionStarted(e) => (
                format!("execution {}", e.name),
                e.parent_trace_context(),
                e.try_get_parent_trace_context(),
            ),
            HistoryEvent::TaskScheduled(e) => (
                format!("task {}", e.name),
                e.parent_trace_context(),
                e.try_get_parent_trace_context(),
            ),
            _ => continue,
        };

        let status = match (stored, parsed) {
            (None, _) => "none".to_string(),
            (Some(_), Ok(context)) if !context.is_valid() => "empty".to_string(),
            (Some(_), Ok(context)) => format!(
                "ok trace_id={} span_id={}",
                context.trace_id(),
                context.span_id()
            ),
            (Some(_), Err(error)) => format!("invalid: {error}"),
        };
        writeln!(
            out,
            "{:>5}  {:<30} {:<55} {}",
            event.event_id(),
            label,
            stored.map_or("-", DistributedTraceContext::trace_parent),
            status
        )?;
    }
    Ok(())
}

/// 在当前 span 下记录一段示例编排并写入存储
pub async fn record_demo(repo: &dyn HistoryRepository, instance_id: &str) -> Result<HistoryLog> {
    let log = {
        let active = CrossComponentTracer::current_span_context();
        let active_span = active.as_ref().map(|c| c as &dyn AmbientSpan);
        record_sample_orchestration(instance_id, active_span)?
    };

    repo.append(instance_id, log.events())
        .await
        .with_context(|| format!("保存编排历史失败: {instance_id}"))?;

    info!(
        instance.id = instance_id,
        history.events = log.len(),
        "Demo orchestration recorded"
    );
    Ok(log)
}

fn record_sample_orchestration(
    instance_id: &str,
    active_span: Option<&dyn AmbientSpan>,
) -> Result<HistoryLog> {
    let mut recorder = DecisionRecorder::new();

    recorder.begin_episode()?;
    let started = recorder.start_execution(
        instance_id,
        "OrderFulfillment",
        Some("1.0"),
        Some(r#"{"order_id":"A-1001"}"#.to_string()),
        active_span,
    )?;
    if let Some(HistoryEvent::ExecutionStarted(event)) = recorder
        .log()
        .events()
        .iter()
        .find(|event| event.event_id() == started)
    {
        StructuredLogger::log_execution_started(event);
    }
    let reserve = recorder.schedule_task(
        "ReserveInventory",
        Some("1.0"),
        Some(r#"{"sku":"WIDGET","quantity":2}"#.to_string()),
        active_span,
    )?;
    let charge = recorder.schedule_task(
        "ChargePayment",
        Some("2.1"),
        Some(r#"{"amount":42.5}"#.to_string()),
        active_span,
    )?;
    let timer = recorder.create_timer(Utc::now() + Duration::seconds(30))?;
    recorder.end_episode()?;

    for scheduled_id in [reserve, charge] {
        if let Some(event) = recorder.log().task_scheduled(scheduled_id) {
            StructuredLogger::log_task_scheduled(instance_id, event);
        }
    }

    recorder.begin_episode()?;
    recorder.complete_task(reserve, Some(r#"{"reserved":true}"#.to_string()))?;
    recorder.fail_task(charge, "card declined", None)?;
    recorder.fire_timer(timer)?;
    recorder.raise_event("ManualApproval", Some(r#"{"approved":true}"#.to_string()))?;
    recorder.complete_execution(
        OrchestrationStatus::Completed,
        Some(r#"{"shipped":true}"#.to_string()),
    )?;
    recorder.end_episode()?;

    Ok(recorder.into_log())
}

pub async fn purge(repo: &dyn HistoryRepository, instance_id: &str, out: &mut impl Write) -> Result<()> {
    if repo.purge(instance_id).await? {
        writeln!(out, "purged {instance_id}")?;
    } else {
        writeln!(out, "instance {instance_id} not found")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use history_domain::{EventType, TraceContextBridge};
    use history_infrastructure::InMemoryHistoryRepository;

    const TRACE_PARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[tokio::test]
    async fn test_record_demo_without_span_stores_no_trace_context() {
        let repo = InMemoryHistoryRepository::new();
        let log = record_demo(&repo, "demo-1").await.unwrap();

        assert_eq!(log.scheduled_tasks().count(), 2);
        assert!(log.scheduled_tasks().all(|e| e.parent_trace_context().is_none()));
        assert_eq!(
            log.events().last().map(HistoryEvent::event_type),
            Some(EventType::OrchestratorCompleted)
        );

        let stored = repo.load("demo-1").await.unwrap().unwrap();
        assert_eq!(stored, log);
    }

    #[test]
    fn test_sample_orchestration_captures_given_span() {
        let span = TraceContextBridge::try_parse(Some(TRACE_PARENT), None).unwrap();
        let log = record_sample_orchestration("demo-2", Some(&span)).unwrap();

        for event in log.scheduled_tasks() {
            assert_eq!(
                event.parent_trace_context().map(|c| c.trace_parent()),
                Some(TRACE_PARENT)
            );
        }
    }

    #[tokio::test]
    async fn test_show_and_traces_output() {
        let repo = InMemoryHistoryRepository::new();
        let span = TraceContextBridge::try_parse(Some(TRACE_PARENT), None).unwrap();
        let log = record_sample_orchestration("demo-3", Some(&span)).unwrap();
        repo.append("demo-3", log.events()).await.unwrap();

        let mut buffer = Vec::new();
        show(&repo, "demo-3", &mut buffer).await.unwrap();
        let shown = output(buffer);
        assert!(shown.starts_with("instance demo-3"));
        assert!(shown.contains("TaskScheduled"));
        assert!(shown.contains("reason=card declined"));

        let mut buffer = Vec::new();
        traces(&repo, "demo-3", &mut buffer).await.unwrap();
        let traced = output(buffer);
        assert_eq!(traced.lines().count(), 3);
        assert!(traced.contains("task ReserveInventory"));
        assert!(traced.contains("ok trace_id=4bf92f3577b34da6a3ce929d0e0e4736"));
    }

    #[tokio::test]
    async fn test_missing_instance_is_an_error() {
        let repo = InMemoryHistoryRepository::new();
        let mut buffer = Vec::new();
        let err = show(&repo, "ghost", &mut buffer).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_list_and_purge() {
        let repo = InMemoryHistoryRepository::new();
        let mut buffer = Vec::new();
        list(&repo, &mut buffer).await.unwrap();
        assert_eq!(output(buffer), "no orchestration instances\n");

        record_demo(&repo, "demo-4").await.unwrap();
        let mut buffer = Vec::new();
        list(&repo, &mut buffer).await.unwrap();
        assert_eq!(output(buffer), "demo-4\n");

        let mut buffer = Vec::new();
        purge(&repo, "demo-4", &mut buffer).await.unwrap();
        purge(&repo, "demo-4", &mut buffer).await.unwrap();
        assert_eq!(output(buffer), "purged demo-4\ninstance demo-4 not found\n");
    }
}
