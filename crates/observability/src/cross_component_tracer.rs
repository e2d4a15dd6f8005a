use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry::Context;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct CrossComponentTracer;

impl CrossComponentTracer {
    /// 当前 tracing span 对应的 OpenTelemetry 上下文
    ///
    /// 没有安装 OpenTelemetry 层或当前不在 span 内时返回 `None`。
    pub fn current_span_context() -> Option<SpanContext> {
        let context = tracing::Span::current().context();
        let span_context = context.span().span_context().clone();
        span_context.is_valid().then_some(span_context)
    }

    pub fn create_child_span_from_context(
        parent: Option<SpanContext>,
        span_name: &str,
        attributes: Vec<(String, String)>,
    ) -> tracing::Span {
        let span = tracing::info_span!(target: "orchestration", "activity", name = span_name);
        if let Some(parent) = parent.filter(SpanContext::is_valid) {
            span.set_parent(Context::new().with_remote_span_context(parent));
        }
        for (key, value) in attributes {
            span.set_attribute(key, value);
        }

        span
    }
}
