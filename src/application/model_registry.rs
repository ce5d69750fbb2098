//! Model Registry - 语言代码到模型句柄的映射
//!
//! 启动时构建一次，之后只读：
//! - `default` 始终存在，`en` / `zh` 是它的别名
//! - 自定义模型来自 `lang:model_path:vocab_path` 逗号分隔列表，可覆盖别名
//! - 单个自定义条目无效或加载失败只会被跳过，不影响其它条目

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::{CustomModelSpec, SynthesizerFactory, TtsError, VoiceSynthesizerPort};
use crate::domain::job::DEFAULT_LANGUAGE;

/// 默认模型的别名
const DEFAULT_ALIASES: &[&str] = &["en", "zh"];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("language '{language}' is not available. Available models: {}", .available.join(", "))]
    LanguageNotAvailable {
        language: String,
        available: Vec<String>,
    },
}

/// 解析自定义模型配置
///
/// 每个条目返回 `Ok(spec)` 或 `Err(原始条目)`（字段数不是 3 或某个字段为空）；空条目被忽略
pub fn parse_custom_models(raw: &str) -> Vec<Result<CustomModelSpec, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            match parts.as_slice() {
                [language, model_path, vocab_path]
                    if !language.is_empty() && !model_path.is_empty() && !vocab_path.is_empty() =>
                {
                    Ok(CustomModelSpec {
                        language: (*language).to_string(),
                        model_path: PathBuf::from(model_path),
                        vocab_path: PathBuf::from(vocab_path),
                    })
                }
                _ => Err(entry.to_string()),
            }
        })
        .collect()
}

/// 模型注册表
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn VoiceSynthesizerPort>>,
}

impl ModelRegistry {
    /// 构建注册表
    ///
    /// 默认模型构造失败是致命错误；自定义条目的失败只记录日志
    pub fn build(factory: &dyn SynthesizerFactory, custom_models: &str) -> Result<Self, TtsError> {
        tracing::info!("Loading default model");
        let default_model = factory.default_model()?;
        tracing::info!(model = %default_model.describe(), "Default model loaded");

        let mut registry = Self::with_default(default_model);

        let entries = parse_custom_models(custom_models);
        if !entries.is_empty() {
            tracing::info!(count = entries.len(), "Loading custom models");
        }

        for entry in entries {
            let spec = match entry {
                Ok(spec) => spec,
                Err(raw) => {
                    tracing::warn!(entry = %raw, "Ignoring invalid custom model entry");
                    continue;
                }
            };

            if !model_files_exist(&spec) {
                tracing::warn!(
                    language = %spec.language,
                    model_path = %spec.model_path.display(),
                    vocab_path = %spec.vocab_path.display(),
                    "Custom model files not found, skipping"
                );
                continue;
            }

            tracing::info!(
                language = %spec.language,
                model_path = %spec.model_path.display(),
                "Loading custom model"
            );
            match factory.custom_model(&spec) {
                Ok(model) => {
                    registry.models.insert(spec.language.clone(), model);
                    tracing::info!(language = %spec.language, "Custom model loaded");
                }
                Err(e) => {
                    tracing::error!(language = %spec.language, error = %e, "Failed to load custom model");
                }
            }
        }

        tracing::info!(languages = ?registry.languages(), "Available models");
        Ok(registry)
    }

    /// 只包含默认模型及其别名的注册表
    pub fn with_default(default_model: Arc<dyn VoiceSynthesizerPort>) -> Self {
        let mut models: BTreeMap<String, Arc<dyn VoiceSynthesizerPort>> = BTreeMap::new();
        for alias in DEFAULT_ALIASES {
            models.insert((*alias).to_string(), default_model.clone());
        }
        models.insert(DEFAULT_LANGUAGE.to_string(), default_model);
        Self { models }
    }

    /// 注册（或覆盖）某个语言的模型
    pub fn insert(&mut self, language: impl Into<String>, model: Arc<dyn VoiceSynthesizerPort>) {
        self.models.insert(language.into(), model);
    }

    /// 查找语言对应的模型
    pub fn load(&self, language: &str) -> Result<Arc<dyn VoiceSynthesizerPort>, RegistryError> {
        self.models
            .get(language)
            .cloned()
            .ok_or_else(|| RegistryError::LanguageNotAvailable {
                language: language.to_string(),
                available: self.languages(),
            })
    }

    /// 已注册的语言代码（有序）
    pub fn languages(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn contains(&self, language: &str) -> bool {
        self.models.contains_key(language)
    }
}

/// 检查自定义模型文件是否都存在
pub fn model_files_exist(spec: &CustomModelSpec) -> bool {
    spec.model_path.exists() && spec.vocab_path.exists()
}
