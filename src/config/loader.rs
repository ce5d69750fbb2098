//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 部署环境变量（GCS_BUCKET_NAME 等，无前缀）
//! 2. 环境变量（前缀 `VOCALIS_`）
//! 3. 配置文件（vocalis.toml / vocalis.local.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File, Map};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, SynthesisBackend, MAX_SIGNED_URL_TTL_SECS};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["vocalis", "vocalis.local"];

/// 部署环境变量
pub const ENV_GCS_CREDENTIALS_JSON: &str = "GCS_CREDENTIALS_JSON";
pub const ENV_GCS_BUCKET_NAME: &str = "GCS_BUCKET_NAME";
pub const ENV_F5_CUSTOM_MODELS: &str = "F5_CUSTOM_MODELS";
pub const ENV_DISABLE_AUTO_TRANSCRIPTION: &str = "DISABLE_AUTO_TRANSCRIPTION";

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOCALIS_SERVER__PORT=8080`
/// - `VOCALIS_SYNTHESIS__BACKEND=http`
/// - `VOCALIS_CACHE__MAX_SIZE_BYTES=1073741824`
/// - `GCS_BUCKET_NAME=my-bucket`（覆盖 `storage.bucket`）
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(None, std::env::vars().collect())
}

/// 从指定配置文件和环境变量集合加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
/// - `env` - 环境变量（测试时可传入固定集合）
pub fn load_config_from(
    config_path: Option<&Path>,
    env: Map<String, String>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("synthesis.backend", "cli")?
        .set_default("synthesis.custom_models", "")?
        .set_default("synthesis.disable_auto_transcription", true)?
        .set_default("synthesis.timeout_secs", 0)?
        .set_default("synthesis.cli.program", "f5-tts_infer-cli")?
        .set_default("synthesis.cli.model", "F5TTS_v1_Base")?
        .set_default("synthesis.http.url", "http://localhost:8000")?
        .set_default("synthesis.fake.duration_ms", 2000)?
        .set_default("synthesis.fake.sample_rate", 24000)?
        .set_default("storage.signed_url_ttl_secs", MAX_SIGNED_URL_TTL_SECS)?
        .set_default("storage.in_memory", false)?
        .set_default("cache.dir", "/tmp/audio_cache")?
        .set_default("cache.max_size_bytes", 0)?
        .set_default("worker.max_concurrent", 1)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 带前缀的环境变量
    // 前缀: VOCALIS_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("VOCALIS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(env.clone())),
    );

    // 4. 部署环境变量（最高优先级）
    let non_empty = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();
    builder = builder
        .set_override_option("storage.credentials_json", non_empty(ENV_GCS_CREDENTIALS_JSON))?
        .set_override_option("storage.bucket", non_empty(ENV_GCS_BUCKET_NAME))?
        .set_override_option("synthesis.custom_models", env.get(ENV_F5_CUSTOM_MODELS).cloned())?
        .set_override_option(
            "synthesis.disable_auto_transcription",
            env.get(ENV_DISABLE_AUTO_TRANSCRIPTION)
                .map(|v| v.trim().eq_ignore_ascii_case("true")),
        )?;

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.cache.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Cache directory cannot be empty".to_string(),
        ));
    }

    match config.synthesis.backend {
        SynthesisBackend::Cli if config.synthesis.cli.program.trim().is_empty() => {
            return Err(ConfigError::ValidationError(
                "CLI program cannot be empty".to_string(),
            ));
        }
        SynthesisBackend::Http if config.synthesis.http.url.trim().is_empty() => {
            return Err(ConfigError::ValidationError(
                "Inference service URL cannot be empty".to_string(),
            ));
        }
        SynthesisBackend::Fake if config.synthesis.fake.sample_rate == 0 => {
            return Err(ConfigError::ValidationError(
                "Fake sample rate cannot be 0".to_string(),
            ));
        }
        _ => {}
    }

    if config.worker.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "worker.max_concurrent must be greater than 0".to_string(),
        ));
    }

    if config.storage.signed_url_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Signed URL TTL cannot be 0".to_string(),
        ));
    }

    if config.storage.signed_url_ttl_secs > MAX_SIGNED_URL_TTL_SECS {
        return Err(ConfigError::ValidationError(format!(
            "Signed URL TTL cannot exceed {}s (GCS V4 signature limit), got {}s",
            MAX_SIGNED_URL_TTL_SECS, config.storage.signed_url_ttl_secs
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志，不包含凭证）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Synthesis Backend: {}", config.synthesis.backend.as_str());
    match config.synthesis.backend {
        SynthesisBackend::Cli => tracing::info!(
            "CLI: {} (model {})",
            config.synthesis.cli.program,
            config.synthesis.cli.model
        ),
        SynthesisBackend::Http => tracing::info!("Inference URL: {}", config.synthesis.http.url),
        SynthesisBackend::Fake => tracing::info!(
            "Fake Audio: {}ms @ {}Hz",
            config.synthesis.fake.duration_ms,
            config.synthesis.fake.sample_rate
        ),
    }
    if config.synthesis.timeout_secs > 0 {
        tracing::info!("Synthesis Timeout: {}s", config.synthesis.timeout_secs);
    }
    tracing::info!(
        "Auto Transcription: {}",
        if config.synthesis.disable_auto_transcription {
            "disabled (ref_text required)"
        } else {
            "enabled"
        }
    );
    tracing::info!(
        "GCS Bucket: {}",
        config.storage.bucket.as_deref().unwrap_or("<not configured>")
    );
    tracing::info!(
        "GCS Credentials: {}",
        if config.storage.credentials_json.is_some() {
            "provided"
        } else {
            "not provided"
        }
    );
    if config.storage.in_memory {
        tracing::info!("Object Store: in-memory");
    }
    tracing::info!("Cache Directory: {:?}", config.cache.dir);
    if config.cache.max_size_bytes > 0 {
        tracing::info!("Cache Max Size: {} bytes", config.cache.max_size_bytes);
    }
    tracing::info!("Max Concurrent Jobs: {}", config.worker.max_concurrent);
    tracing::info!("Work Directory: {:?}", config.worker.work_dir());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::FakeSynthesizerConfig;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> AppConfig {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();
        load_config_from(Some(&path), env(pairs)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.synthesis.backend, SynthesisBackend::Cli);
        assert!(config.synthesis.disable_auto_transcription);
        assert_eq!(config.synthesis.custom_models, "");
        assert!(config.storage.bucket.is_none());
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/audio_cache"));
    }

    #[test]
    fn test_deployment_variables() {
        let config = load(&[
            ("GCS_BUCKET_NAME", "tts-output"),
            ("GCS_CREDENTIALS_JSON", "{\"type\":\"service_account\"}"),
            ("F5_CUSTOM_MODELS", "pt:/m/pt.pt:/m/pt.txt"),
            ("DISABLE_AUTO_TRANSCRIPTION", "FALSE"),
        ]);
        assert_eq!(config.storage.bucket.as_deref(), Some("tts-output"));
        assert!(config.storage.credentials_json.is_some());
        assert_eq!(config.synthesis.custom_models, "pt:/m/pt.pt:/m/pt.txt");
        assert!(!config.synthesis.disable_auto_transcription);
    }

    #[test]
    fn test_disable_auto_transcription_parsing() {
        assert!(load(&[("DISABLE_AUTO_TRANSCRIPTION", "True")]).synthesis.disable_auto_transcription);
        assert!(!load(&[("DISABLE_AUTO_TRANSCRIPTION", "yes")]).synthesis.disable_auto_transcription);
        assert!(!load(&[("DISABLE_AUTO_TRANSCRIPTION", "")]).synthesis.disable_auto_transcription);
    }

    #[test]
    fn test_prefixed_variables() {
        let config = load(&[
            ("VOCALIS_SERVER__PORT", "9000"),
            ("VOCALIS_SYNTHESIS__BACKEND", "fake"),
            ("VOCALIS_WORKER__MAX_CONCURRENT", "4"),
        ]);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.synthesis.backend, SynthesisBackend::Fake);
        assert_eq!(config.worker.max_concurrent, 4);
    }

    #[test]
    fn test_deployment_variable_wins_over_file_and_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vocalis.toml");
        std::fs::write(&path, "[storage]\nbucket = \"from-file\"\n").unwrap();

        let config = load_config_from(
            Some(&path),
            env(&[
                ("VOCALIS_STORAGE__BUCKET", "from-prefix"),
                ("GCS_BUCKET_NAME", "from-deploy"),
            ]),
        )
        .unwrap();
        assert_eq!(config.storage.bucket.as_deref(), Some("from-deploy"));

        let config = load_config_from(Some(&path), env(&[])).unwrap();
        assert_eq!(config.storage.bucket.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_http_url() {
        let mut config = AppConfig::default();
        config.synthesis.backend = SynthesisBackend::Http;
        config.synthesis.http.url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_concurrency() {
        let mut config = AppConfig::default();
        config.worker.max_concurrent = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_signed_url_ttl_bounds() {
        let mut config = AppConfig::default();
        config.storage.signed_url_ttl_secs = MAX_SIGNED_URL_TTL_SECS + 1;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("cannot exceed 604800s"));

        config.storage.signed_url_ttl_secs = 3600;
        assert!(validate_config(&config).is_ok());

        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();
        let result = load_config_from(
            Some(&path),
            env(&[("VOCALIS_STORAGE__SIGNED_URL_TTL_SECS", "700000")]),
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_fake_defaults_match_adapter_defaults() {
        let config = load(&[]);
        let adapter = FakeSynthesizerConfig::default();
        assert_eq!(config.synthesis.fake.sample_rate, adapter.sample_rate);
        assert_eq!(config.synthesis.fake.duration_ms, adapter.duration_ms);
    }

    #[test]
    fn test_validation_passes_for_default_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }
}
