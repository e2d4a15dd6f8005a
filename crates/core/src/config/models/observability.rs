use serde::{Deserialize, Serialize};

fn default_service_name() -> String {
    "orchestration-history".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// 是否把 tracing span 接入 OpenTelemetry
    pub tracing_enabled: bool,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// OTLP 导出端点，未配置时只在本进程内传播追踪上下文
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            tracing_enabled: true,
            service_name: default_service_name(),
            otlp_endpoint: None,
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(anyhow::anyhow!("服务名称不能为空"));
        }

        if let Some(endpoint) = &self.otlp_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "无效的OTLP端点: {}，必须以 http:// 或 https:// 开头",
                    endpoint
                ));
            }
        }

        if self.metrics_enabled && self.metrics_port == 0 {
            return Err(anyhow::anyhow!("指标端口必须大于0"));
        }

        Ok(())
    }
}
