//! Voice Synthesizer Port - 声音克隆 TTS 模型抽象
//!
//! 模型本身（F5-TTS）是外部依赖，这里只定义调用契约；具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Failed to start synthesizer: {0}")]
    SpawnError(String),

    #[error("Synthesizer exited with {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },

    #[error("Synthesis timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),
}

/// 合成请求
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// 本地参考音频路径
    pub ref_audio_path: PathBuf,
    /// 参考音频对应的文本
    pub ref_text: String,
    /// 要合成的文本
    pub gen_text: String,
    /// 输出 WAV 文件路径（由模型写入）
    pub output_path: PathBuf,
    /// 语速倍率
    pub speed: f64,
    /// 是否裁剪静音
    pub remove_silence: bool,
}

/// Voice Synthesizer Port
///
/// 一个实例对应一个已加载的模型（默认模型或某个语言的自定义模型）
#[async_trait]
pub trait VoiceSynthesizerPort: Send + Sync {
    /// 合成音频，写入 `request.output_path`
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<(), TtsError>;

    /// 模型描述（用于日志）
    fn describe(&self) -> String;
}

/// 自定义模型配置: `lang:model_path:vocab_path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomModelSpec {
    pub language: String,
    pub model_path: PathBuf,
    pub vocab_path: PathBuf,
}

/// 模型构造工厂
///
/// ModelRegistry 通过它构造默认模型与自定义模型的句柄
pub trait SynthesizerFactory: Send + Sync {
    fn default_model(&self) -> Result<Arc<dyn VoiceSynthesizerPort>, TtsError>;

    fn custom_model(
        &self,
        spec: &CustomModelSpec,
    ) -> Result<Arc<dyn VoiceSynthesizerPort>, TtsError>;
}
