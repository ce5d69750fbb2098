//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成（模型）配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 云存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 参考音频缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 任务执行配置
    #[serde(default)]
    pub worker: WorkerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 合成后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisBackend {
    /// `f5-tts_infer-cli` 子进程
    #[default]
    Cli,
    /// 外部 HTTP 推理服务
    Http,
    /// 写出静音音频，不调用模型
    Fake,
}

impl SynthesisBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Http => "http",
            Self::Fake => "fake",
        }
    }
}

/// 合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub backend: SynthesisBackend,

    /// 自定义模型: `lang:model_path:vocab_path`，逗号分隔
    #[serde(default)]
    pub custom_models: String,

    /// 禁用自动转写时 ref_text 必填
    #[serde(default = "default_disable_auto_transcription")]
    pub disable_auto_transcription: bool,

    /// 单次合成超时（秒），0 表示不限制
    #[serde(default)]
    pub timeout_secs: u64,

    #[serde(default)]
    pub cli: CliBackendConfig,

    #[serde(default)]
    pub http: HttpBackendConfig,

    #[serde(default)]
    pub fake: FakeBackendConfig,
}

fn default_disable_auto_transcription() -> bool {
    true
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            backend: SynthesisBackend::default(),
            custom_models: String::new(),
            disable_auto_transcription: default_disable_auto_transcription(),
            timeout_secs: 0,
            cli: CliBackendConfig::default(),
            http: HttpBackendConfig::default(),
            fake: FakeBackendConfig::default(),
        }
    }
}

/// CLI 后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct CliBackendConfig {
    /// 可执行程序
    #[serde(default = "default_cli_program")]
    pub program: String,

    /// 默认模型名
    #[serde(default = "default_cli_model")]
    pub model: String,
}

fn default_cli_program() -> String {
    "f5-tts_infer-cli".to_string()
}

fn default_cli_model() -> String {
    "F5TTS_v1_Base".to_string()
}

impl Default for CliBackendConfig {
    fn default() -> Self {
        Self {
            program: default_cli_program(),
            model: default_cli_model(),
        }
    }
}

/// HTTP 后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpBackendConfig {
    /// 推理服务基础 URL
    #[serde(default = "default_http_url")]
    pub url: String,
}

fn default_http_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            url: default_http_url(),
        }
    }
}

/// Fake 后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct FakeBackendConfig {
    #[serde(default = "default_fake_duration_ms")]
    pub duration_ms: u64,

    #[serde(default = "default_fake_sample_rate")]
    pub sample_rate: u32,
}

fn default_fake_duration_ms() -> u64 {
    2000
}

fn default_fake_sample_rate() -> u32 {
    24000
}

impl Default for FakeBackendConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_fake_duration_ms(),
            sample_rate: default_fake_sample_rate(),
        }
    }
}

/// 云存储配置
#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    /// 输出 bucket；未设置时上传不可用
    #[serde(default)]
    pub bucket: Option<String>,

    /// 服务账号 JSON
    #[serde(default)]
    pub credentials_json: Option<String>,

    /// 签名 URL 有效期（秒）
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,

    /// 不连接 GCS，使用内存对象存储（本地联调）
    #[serde(default)]
    pub in_memory: bool,
}

/// GCS V4 签名 URL 允许的最长有效期（7 天）
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

fn default_signed_url_ttl() -> u64 {
    MAX_SIGNED_URL_TTL_SECS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            credentials_json: None,
            signed_url_ttl_secs: default_signed_url_ttl(),
            in_memory: false,
        }
    }
}

// 凭证不进入日志
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field(
                "credentials_json",
                &self.credentials_json.as_ref().map(|_| "<redacted>"),
            )
            .field("signed_url_ttl_secs", &self.signed_url_ttl_secs)
            .field("in_memory", &self.in_memory)
            .finish()
    }
}

/// 参考音频缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 缓存目录
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// 最大缓存大小（字节），0 表示永不淘汰
    #[serde(default)]
    pub max_size_bytes: u64,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/tmp/audio_cache")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            max_size_bytes: 0,
        }
    }
}

/// 任务执行配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 同时运行的推理数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 临时输出目录；未设置时使用系统临时目录
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            work_dir: None,
        }
    }
}

impl WorkerConfig {
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
