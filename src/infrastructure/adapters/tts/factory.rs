//! Synthesizer Factory - 按后端配置构造模型句柄

use std::sync::Arc;

use super::{
    CliSynthesizer, CliSynthesizerConfig, FakeSynthesizer, FakeSynthesizerConfig,
    HttpSynthesizer, HttpSynthesizerConfig,
};
use crate::application::ports::{
    CustomModelSpec, SynthesizerFactory, TtsError, VoiceSynthesizerPort,
};

/// 合成后端
#[derive(Debug, Clone)]
pub enum SynthesizerBackend {
    Cli(CliSynthesizerConfig),
    Http(HttpSynthesizerConfig),
    Fake(FakeSynthesizerConfig),
}

/// 基于配置的工厂
pub struct ConfiguredSynthesizerFactory {
    backend: SynthesizerBackend,
}

impl ConfiguredSynthesizerFactory {
    pub fn new(backend: SynthesizerBackend) -> Self {
        Self { backend }
    }
}

impl SynthesizerFactory for ConfiguredSynthesizerFactory {
    fn default_model(&self) -> Result<Arc<dyn VoiceSynthesizerPort>, TtsError> {
        Ok(match &self.backend {
            SynthesizerBackend::Cli(config) => Arc::new(CliSynthesizer::new(config.clone())),
            SynthesizerBackend::Http(config) => Arc::new(HttpSynthesizer::new(config.clone())?),
            SynthesizerBackend::Fake(config) => Arc::new(FakeSynthesizer::new(config.clone())),
        })
    }

    fn custom_model(
        &self,
        spec: &CustomModelSpec,
    ) -> Result<Arc<dyn VoiceSynthesizerPort>, TtsError> {
        Ok(match &self.backend {
            SynthesizerBackend::Cli(config) => Arc::new(CliSynthesizer::new(CliSynthesizerConfig {
                ckpt_file: Some(spec.model_path.clone()),
                vocab_file: Some(spec.vocab_path.clone()),
                ..config.clone()
            })),
            SynthesizerBackend::Http(config) => {
                Arc::new(HttpSynthesizer::new(config.clone())?.with_model(&spec.language))
            }
            SynthesizerBackend::Fake(config) => Arc::new(FakeSynthesizer::new(FakeSynthesizerConfig {
                label: spec.language.clone(),
                ..config.clone()
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec() -> CustomModelSpec {
        CustomModelSpec {
            language: "pt".to_string(),
            model_path: PathBuf::from("/models/pt.safetensors"),
            vocab_path: PathBuf::from("/models/pt.txt"),
        }
    }

    #[test]
    fn test_cli_custom_model_uses_checkpoint() {
        let factory =
            ConfiguredSynthesizerFactory::new(SynthesizerBackend::Cli(CliSynthesizerConfig::default()));
        assert_eq!(factory.default_model().unwrap().describe(), "cli:F5TTS_v1_Base");
        assert_eq!(
            factory.custom_model(&spec()).unwrap().describe(),
            "cli:F5TTS_v1_Base@/models/pt.safetensors"
        );
    }

    #[test]
    fn test_fake_custom_model_is_labelled_by_language() {
        let factory = ConfiguredSynthesizerFactory::new(SynthesizerBackend::Fake(
            FakeSynthesizerConfig::default(),
        ));
        assert_eq!(factory.custom_model(&spec()).unwrap().describe(), "fake:pt");
    }

    #[test]
    fn test_http_custom_model_names_language() {
        let factory = ConfiguredSynthesizerFactory::new(SynthesizerBackend::Http(
            HttpSynthesizerConfig::new("http://tts:8000"),
        ));
        assert_eq!(
            factory.custom_model(&spec()).unwrap().describe(),
            "http:http://tts:8000#pt"
        );
    }
}
