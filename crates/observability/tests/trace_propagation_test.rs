use history_domain::{AmbientSpan, DecisionRecorder, HistoryLog};
use history_observability::{ActivityTracingExt, CrossComponentTracer};
use opentelemetry::trace::{TraceContextExt, TracerProvider as _};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::layer::SubscriberExt;

fn with_otel_subscriber<F: FnOnce()>(f: F) {
    let provider = SdkTracerProvider::builder().build();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("history-test")));
    tracing::subscriber::with_default(subscriber, f);
}

#[test]
fn test_activity_span_continues_scheduling_trace() {
    with_otel_subscriber(|| {
        let orchestration_span = tracing::info_span!("orchestration.run");
        let (scheduling_context, json) = {
            let _enter = orchestration_span.enter();
            let current = CrossComponentTracer::current_span_context().expect("active span");

            let mut recorder = DecisionRecorder::new();
            recorder.begin_episode().unwrap();
            recorder
                .schedule_task("ChargeCard", Some("1.0"), None, Some(&current))
                .unwrap();
            recorder.end_episode().unwrap();
            (current, recorder.log().to_json().unwrap())
        };

        // 执行方只拿到持久化后的历史
        let log = HistoryLog::from_json(&json).unwrap();
        let event = log.task_scheduled(1).unwrap();
        let stored = event.parent_trace_context().unwrap();
        assert!(stored.trace_parent().starts_with("00-"));
        assert!(stored.trace_parent().ends_with("-01"));

        let activity_span = event.create_activity_span("order-1", "execute");
        let activity_context = activity_span.context().span().span_context().clone();

        assert!(activity_context.is_valid());
        assert_eq!(activity_context.trace_id(), scheduling_context.trace_id());
        assert_ne!(activity_context.span_id(), scheduling_context.span_id());
    });
}

#[test]
fn test_recording_outside_span_stores_no_context() {
    with_otel_subscriber(|| {
        let current = CrossComponentTracer::current_span_context();
        assert!(current.is_none());

        let mut recorder = DecisionRecorder::new();
        let id = recorder
            .schedule_task("ChargeCard", None, None, current.as_ref().map(|c| c as &dyn AmbientSpan))
            .unwrap();
        assert!(recorder
            .log()
            .task_scheduled(id)
            .unwrap()
            .parent_trace_context()
            .is_none());
    });
}

#[test]
fn test_malformed_stored_context_starts_new_trace() {
    let json = r#"[
        {"event_type":"TaskScheduled","event_id":4,"name":"Ship",
         "parent_trace_context":{"trace_parent":"00-zzzz-00f067aa0ba902b7-01","trace_state":""}}
    ]"#;
    let log = HistoryLog::from_json(json).unwrap();
    let event = log.task_scheduled(4).unwrap();
    assert!(event.try_get_parent_trace_context().is_err());

    with_otel_subscriber(|| {
        let activity_span = event.create_activity_span("order-2", "execute");
        let context = activity_span.context().span().span_context().clone();
        // 解析失败时仍然得到一个独立的根 span
        assert!(context.is_valid());
        assert_ne!(
            context.trace_id().to_string(),
            "4bf92f3577b34da6a3ce929d0e0e4736"
        );
    });
}
