//! 分布式追踪上下文
//!
//! 调度方在写入历史事件时记录 W3C `traceparent`/`tracestate` 原始字符串，
//! 执行方读取事件后再解析为结构化的 [`SpanContext`]，从而把两个进程的追踪链路接起来。

use std::collections::HashMap;

use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 持久化在历史事件中的 W3C 追踪上下文
///
/// 构造时不做任何校验，两个字段都允许为空；编码是否正确由 [`TraceContextBridge`] 判断。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistributedTraceContext {
    #[serde(default)]
    trace_parent: String,
    #[serde(default)]
    trace_state: String,
}

impl DistributedTraceContext {
    pub fn new(trace_parent: impl Into<String>, trace_state: impl Into<String>) -> Self {
        Self {
            trace_parent: trace_parent.into(),
            trace_state: trace_state.into(),
        }
    }

    pub fn trace_parent(&self) -> &str {
        &self.trace_parent
    }

    pub fn trace_state(&self) -> &str {
        &self.trace_state
    }

    /// 从当前活跃的 span 捕获追踪上下文，没有活跃 span 时返回 `None`
    pub(crate) fn capture(active_span: Option<&dyn AmbientSpan>) -> Option<Self> {
        active_span
            .filter(|span| span.is_active())
            .map(|span| Self::new(span.id(), span.trace_state_string()))
    }

    /// 解析为结构化上下文，语义同 [`TraceContextBridge::try_parse`]
    pub fn try_parse(&self) -> Result<SpanContext, TraceContextError> {
        TraceContextBridge::try_parse(Some(&self.trace_parent), Some(&self.trace_state))
    }
}

/// 调度时刻的环境 span
///
/// 由追踪子系统提供，`id` 为 W3C traceparent 编码。
pub trait AmbientSpan {
    fn id(&self) -> String;

    fn trace_state_string(&self) -> String;

    /// 未采样或未初始化的 span 不参与捕获
    fn is_active(&self) -> bool {
        true
    }
}

impl AmbientSpan for SpanContext {
    fn id(&self) -> String {
        TraceContextBridge::format_trace_parent(self)
    }

    fn trace_state_string(&self) -> String {
        self.trace_state().header()
    }

    fn is_active(&self) -> bool {
        self.is_valid()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceContextError {
    #[error("traceparent 格式错误 ({reason}): {value}")]
    MalformedTraceParent { value: String, reason: &'static str },
}

const TRACE_PARENT_HEADER: &str = "traceparent";
const TRACE_STATE_HEADER: &str = "tracestate";

/// W3C Trace Context 文本编码与 [`SpanContext`] 之间的转换
pub struct TraceContextBridge;

impl TraceContextBridge {
    /// 解析 traceparent/tracestate，永不 panic
    ///
    /// - traceparent 缺失或为空字符串：返回空上下文，视为成功
    /// - traceparent 非空但格式错误（包括首尾空白）：返回 `Err`
    /// - tracestate 无法解析时退化为空 tracestate，不影响结果
    pub fn try_parse(
        trace_parent: Option<&str>,
        trace_state: Option<&str>,
    ) -> Result<SpanContext, TraceContextError> {
        let trace_parent = match trace_parent {
            None | Some("") => return Ok(SpanContext::empty_context()),
            Some(value) => value,
        };

        let malformed = |reason: &'static str| TraceContextError::MalformedTraceParent {
            value: trace_parent.to_string(),
            reason,
        };

        // 传播器会先 trim，这里保持原值不做规范化
        if trace_parent.trim() != trace_parent {
            return Err(malformed("surrounding whitespace"));
        }

        let mut carrier = HashMap::with_capacity(2);
        carrier.insert(TRACE_PARENT_HEADER.to_string(), trace_parent.to_string());
        if let Some(state) = trace_state {
            carrier.insert(TRACE_STATE_HEADER.to_string(), state.to_string());
        }

        // 以空上下文为基础，提取失败时不会带出当前线程的 span
        let context = TraceContextPropagator::new().extract_with_context(&Context::new(), &carrier);
        let span_context = context.span().span_context().clone();
        if !span_context.is_valid() {
            return Err(malformed("rejected by W3C trace context propagator"));
        }
        if !is_canonical(trace_parent, &span_context) {
            return Err(malformed("fields are not in canonical width"));
        }

        Ok(span_context)
    }

    /// 按 00 版本格式输出 traceparent
    pub fn format_trace_parent(context: &SpanContext) -> String {
        format!(
            "00-{}-{}-{:02x}",
            context.trace_id(),
            context.span_id(),
            context.trace_flags().to_u8()
        )
    }
}

/// 传播器按数值解析各字段，位数不足的 id 会被补零成另一个 id
fn is_canonical(trace_parent: &str, context: &SpanContext) -> bool {
    let fields: Vec<&str> = trace_parent.split('-').collect();
    match fields.as_slice() {
        [version, trace_id, span_id, flags, ..] => {
            version.len() == 2
                && flags.len() == 2
                && *trace_id == context.trace_id().to_string()
                && *span_id == context.span_id().to_string()
        }
        _ => false,
    }
}
