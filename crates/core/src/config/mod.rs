//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、TOML 文件、环境变量。

pub mod models;

pub use models::*;
