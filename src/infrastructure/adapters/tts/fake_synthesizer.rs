//! Fake Synthesizer - 用于测试和本地运行的合成器
//!
//! 不调用任何模型，按配置写出一段静音 WAV，并记录收到的请求

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{SynthesisRequest, TtsError, VoiceSynthesizerPort};
use crate::infrastructure::adapters::audio::silent_wav;

/// Fake Synthesizer 配置
#[derive(Debug, Clone)]
pub struct FakeSynthesizerConfig {
    /// 模型标签（describe 中显示）
    pub label: String,
    /// 输出音频时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 设置后每次合成都失败并返回该消息
    pub failure: Option<String>,
}

impl Default for FakeSynthesizerConfig {
    fn default() -> Self {
        Self {
            label: "default".to_string(),
            duration_ms: 2000,
            sample_rate: 24000,
            failure: None,
        }
    }
}

impl FakeSynthesizerConfig {
    pub fn labelled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }
}

/// Fake Synthesizer
pub struct FakeSynthesizer {
    config: FakeSynthesizerConfig,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl FakeSynthesizer {
    pub fn new(config: FakeSynthesizerConfig) -> Self {
        Self {
            config,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的请求（按顺序）
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VoiceSynthesizerPort for FakeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<(), TtsError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        tracing::debug!(
            label = %self.config.label,
            gen_text_len = request.gen_text.len(),
            output = %request.output_path.display(),
            "FakeSynthesizer: writing silent audio"
        );

        if let Some(message) = &self.config.failure {
            return Err(TtsError::ServiceError(message.clone()));
        }

        let wav = silent_wav(self.config.duration_ms, self.config.sample_rate);
        tokio::fs::write(&request.output_path, wav)
            .await
            .map_err(|e| TtsError::IoError(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("fake:{}", self.config.label)
    }
}
