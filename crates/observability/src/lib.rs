pub mod activity_tracing;
pub mod cross_component_tracer;
pub mod structured_logger;
pub mod telemetry_setup;

pub use activity_tracing::{ActivityTracingExt, TRACE_CONTEXT_PARSE_FAILURES};
pub use cross_component_tracer::CrossComponentTracer;
pub use structured_logger::{LogFormat, LoggingConfig, StructuredLogger};
pub use telemetry_setup::{
    build_tracer_provider, init_logging_and_tracing, init_metrics, init_observability,
    shutdown_observability, TelemetryGuard,
};
