pub mod app_config;
pub mod logging;
pub mod observability;
pub mod storage;

pub use app_config::AppConfig;
pub use logging::{LogConfig, LogLevel, OutputFormat};
pub use observability::ObservabilityConfig;
pub use storage::{StorageBackend, StorageConfig};
