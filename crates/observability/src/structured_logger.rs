use history_core::config::{LogConfig, OutputFormat};
use history_domain::{
    ExecutionStartedEvent, HistoryEventData, HistoryLog, TaskScheduledEvent, TraceContextError,
};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
    pub include_thread_id: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            include_location: false,
            include_thread_id: false,
        }
    }
}

impl From<&LogConfig> for LoggingConfig {
    fn from(config: &LogConfig) -> Self {
        Self {
            level: config.level.to_string(),
            format: match config.format {
                OutputFormat::Json => LogFormat::Json,
                OutputFormat::Pretty => LogFormat::Pretty,
                OutputFormat::Compact => LogFormat::Compact,
            },
            include_location: config.include_location,
            include_thread_id: config.include_thread_id,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_execution_started(event: &ExecutionStartedEvent) {
        info!(
            event = "execution_started",
            instance.id = %event.instance_id,
            orchestration.name = %event.name,
            orchestration.version = event.version.as_deref().unwrap_or(""),
            history.event_id = event.event_id(),
            trace.captured = event.parent_trace_context().is_some(),
            "Orchestration execution started"
        );
    }

    pub fn log_task_scheduled(instance_id: &str, event: &TaskScheduledEvent) {
        info!(
            event = "task_scheduled",
            instance.id = instance_id,
            task.name = %event.name,
            task.version = event.version.as_deref().unwrap_or(""),
            history.event_id = event.event_id(),
            trace.captured = event.parent_trace_context().is_some(),
            "Activity scheduled"
        );
    }

    pub fn log_trace_context_rejected(
        instance_id: &str,
        event: &TaskScheduledEvent,
        error: &TraceContextError,
    ) {
        warn!(
            event = "trace_context_rejected",
            instance.id = instance_id,
            task.name = %event.name,
            history.event_id = event.event_id(),
            error = %error,
            "Stored trace context could not be parsed, starting a new trace"
        );
    }

    pub fn log_history_loaded(instance_id: &str, log: &HistoryLog) {
        info!(
            event = "history_loaded",
            instance.id = instance_id,
            history.events = log.len(),
            history.scheduled_tasks = log.scheduled_tasks().count(),
            history.last_event_id = log.last_event_id().unwrap_or(-1),
            "History loaded"
        );
    }
}
