use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{logging::LogConfig, observability::ObservabilityConfig, storage::StorageConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub observability: ObservabilityConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// 按顺序合并：内置默认值、TOML 配置文件、`HISTORY_` 前缀的环境变量
    ///
    /// 环境变量用双下划线分隔层级，例如 `HISTORY_STORAGE__DIRECTORY`。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.include_location", false)?
            .set_default("logging.include_thread_id", false)?
            .set_default("observability.tracing_enabled", true)?
            .set_default("observability.service_name", "orchestration-history")?
            .set_default("observability.metrics_enabled", false)?
            .set_default("observability.metrics_port", 9090)?
            .set_default("storage.backend", "file")?
            .set_default("storage.directory", "data/history")?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/history.toml", "history.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("HISTORY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.observability.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
