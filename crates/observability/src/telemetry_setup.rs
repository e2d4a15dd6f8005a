use anyhow::{Context as _, Result};
use history_core::config::{AppConfig, ObservabilityConfig};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::global;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::structured_logger::{LogFormat, LoggingConfig};

/// 持有 tracer provider，关闭时刷新尚未导出的 span
#[must_use]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

pub fn build_tracer_provider(config: &ObservabilityConfig) -> Result<SdkTracerProvider> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .build();
    let mut builder = SdkTracerProvider::builder().with_resource(resource);

    if let Some(endpoint) = &config.otlp_endpoint {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint.clone())
            .build()
            .with_context(|| format!("Failed to create OTLP exporter for {endpoint}"))?;
        builder = builder.with_batch_exporter(exporter);
    }

    Ok(builder.build())
}

pub fn init_logging_and_tracing(
    logging_config: LoggingConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<()> {
    let level = logging_config.level.clone();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging_config.level.clone().into());

    let otel_layer = tracer_provider.map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer("orchestration-history"))
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer);
    match logging_config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(logging_config.include_location)
                .with_line_number(logging_config.include_location)
                .with_thread_ids(logging_config.include_thread_id)
                .with_writer(std::io::stderr);

            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_file(logging_config.include_location)
                .with_line_number(logging_config.include_location)
                .with_thread_ids(logging_config.include_thread_id)
                .with_writer(std::io::stderr);

            registry.with(fmt_layer).try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_file(logging_config.include_location)
                .with_line_number(logging_config.include_location)
                .with_thread_ids(logging_config.include_thread_id)
                .with_writer(std::io::stderr);

            registry.with(fmt_layer).try_init()?;
        }
    }

    info!(
        logging.format = ?logging_config.format,
        logging.level = level,
        logging.location = logging_config.include_location,
        tracing.enabled = tracer_provider.is_some(),
        "Logging and tracing initialized"
    );

    Ok(())
}

pub fn init_metrics(port: u16) -> Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    metrics::describe_counter!(
        crate::activity_tracing::TRACE_CONTEXT_PARSE_FAILURES,
        "Stored trace contexts that could not be parsed at dispatch"
    );

    info!("Metrics initialized with Prometheus exporter on :{}", port);
    Ok(())
}

pub fn init_observability(config: &AppConfig) -> Result<TelemetryGuard> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer_provider = if config.observability.tracing_enabled {
        let provider = build_tracer_provider(&config.observability)?;
        global::set_tracer_provider(provider.clone());
        Some(provider)
    } else {
        None
    };

    init_logging_and_tracing(LoggingConfig::from(&config.logging), tracer_provider.as_ref())?;

    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_port)?;
    }

    info!(
        service.name = %config.observability.service_name,
        otlp.endpoint = config.observability.otlp_endpoint.as_deref().unwrap_or("none"),
        "Complete observability stack initialized"
    );
    Ok(TelemetryGuard { tracer_provider })
}

pub fn shutdown_observability(guard: TelemetryGuard) {
    if let Some(provider) = guard.tracer_provider {
        if let Err(e) = provider.shutdown() {
            warn!("Tracer provider shutdown failed: {}", e);
        }
    }
    info!("OpenTelemetry observability shutdown completed");
}
