//! Configuration Module
//!
//! 提供应用配置管理功能，支持多层级配置来源：
//! - 部署环境变量（GCS_BUCKET_NAME 等，最高优先级）
//! - `VOCALIS_` 前缀环境变量
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）

mod loader;
mod types;

pub use loader::{load_config, load_config_from, print_config, ConfigError};
pub use types::{
    AppConfig, CacheConfig, CliBackendConfig, FakeBackendConfig, HttpBackendConfig, LogConfig,
    ServerConfig, StorageConfig, SynthesisBackend, SynthesisConfig, WorkerConfig,
    MAX_SIGNED_URL_TTL_SECS,
};
