//! HTTP Synthesizer - 调用外部 F5-TTS 推理服务
//!
//! 外部推理 API:
//! POST {base_url}/api/tts/infer
//! Request: {"gen_text": "...", "ref_audio": "/path/ref.wav", "ref_text": "...", ...}  (JSON)
//! Response: audio/wav binary
//!
//! 参考音频以本地路径传递，推理服务需要与本进程共享缓存目录

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SynthesisRequest, TtsError, VoiceSynthesizerPort};

/// 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct InferHttpRequest<'a> {
    gen_text: &'a str,
    ref_audio: String,
    ref_text: &'a str,
    speed: f64,
    remove_silence: bool,
    /// 自定义模型语言；默认模型时省略
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

/// HTTP Synthesizer 配置
#[derive(Debug, Clone)]
pub struct HttpSynthesizerConfig {
    /// 推理服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒），0 表示不限制
    pub timeout_secs: u64,
}

impl Default for HttpSynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl HttpSynthesizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Synthesizer
pub struct HttpSynthesizer {
    client: Client,
    config: HttpSynthesizerConfig,
    /// 自定义模型的语言代码
    model: Option<String>,
}

impl HttpSynthesizer {
    pub fn new(config: HttpSynthesizerConfig) -> Result<Self, TtsError> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            model: None,
        })
    }

    /// 指定推理服务侧的模型（自定义语言模型）
    pub fn with_model(mut self, language: impl Into<String>) -> Self {
        self.model = Some(language.into());
        self
    }

    fn infer_url(&self) -> String {
        format!("{}/api/tts/infer", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl VoiceSynthesizerPort for HttpSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<(), TtsError> {
        let body = InferHttpRequest {
            gen_text: &request.gen_text,
            ref_audio: request.ref_audio_path.to_string_lossy().to_string(),
            ref_text: &request.ref_text,
            speed: request.speed,
            remove_silence: request.remove_silence,
            model: self.model.as_deref(),
        };

        tracing::debug!(
            url = %self.infer_url(),
            gen_text_len = body.gen_text.len(),
            ref_audio = %body.ref_audio,
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.infer_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout(self.config.timeout_secs)
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to inference service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        tokio::fs::write(&request.output_path, &audio_data)
            .await
            .map_err(|e| TtsError::IoError(e.to_string()))?;

        tracing::debug!(audio_size = audio_data.len(), "Synthesis response written");
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.model {
            Some(model) => format!("http:{}#{}", self.config.base_url, model),
            None => format!("http:{}", self.config.base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpSynthesizerConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpSynthesizerConfig::new("http://example.com:9000/").with_timeout(60);
        let synth = HttpSynthesizer::new(config).unwrap();
        assert_eq!(synth.infer_url(), "http://example.com:9000/api/tts/infer");
        assert_eq!(synth.config.timeout_secs, 60);
    }

    #[test]
    fn test_request_body_omits_default_model() {
        let body = InferHttpRequest {
            gen_text: "hi",
            ref_audio: "/c/ref.wav".to_string(),
            ref_text: "ref",
            speed: 1.0,
            remove_silence: true,
            model: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["ref_audio"], "/c/ref.wav");
    }

    #[test]
    fn test_describe_includes_model() {
        let synth = HttpSynthesizer::new(HttpSynthesizerConfig::default())
            .unwrap()
            .with_model("pt");
        assert_eq!(synth.describe(), "http:http://localhost:8000#pt");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let synth =
            HttpSynthesizer::new(HttpSynthesizerConfig::new("http://127.0.0.1:1").with_timeout(5))
                .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let request = SynthesisRequest {
            ref_audio_path: dir.path().join("ref.wav"),
            ref_text: "r".to_string(),
            gen_text: "g".to_string(),
            output_path: dir.path().join("out.wav"),
            speed: 1.0,
            remove_silence: true,
        };

        let err = synth.synthesize(&request).await.unwrap_err();
        assert!(matches!(err, TtsError::NetworkError(_)));
    }
}
