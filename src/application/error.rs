//! 应用层错误定义
//!
//! 任务处理的统一错误类型，只在任务边界转换为 `{error}`

use thiserror::Error;

use crate::application::model_registry::RegistryError;
use crate::application::ports::{AudioError, CacheError, StorageError, TtsError};
use crate::domain::job::ValidationError;

/// 任务错误
#[derive(Debug, Error)]
pub enum JobError {
    /// 输入校验失败（缺字段、未知语言等）
    #[error("{0}")]
    Validation(String),

    /// 参考音频获取失败
    #[error("{0}")]
    Fetch(String),

    /// 模型推理失败
    #[error("Synthesis failed: {0}")]
    Inference(String),

    /// 上传不可用
    #[error("Upload failed: {0}")]
    Upload(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobError {
    /// 错误类别（用于日志）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Fetch(_) => "fetch",
            Self::Inference(_) => "inference",
            Self::Upload(_) => "upload",
            Self::Internal(_) => "internal",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<ValidationError> for JobError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RegistryError> for JobError {
    fn from(err: RegistryError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CacheError> for JobError {
    fn from(err: CacheError) -> Self {
        Self::Fetch(err.to_string())
    }
}

impl From<TtsError> for JobError {
    fn from(err: TtsError) -> Self {
        Self::Inference(err.to_string())
    }
}

impl From<AudioError> for JobError {
    fn from(err: AudioError) -> Self {
        Self::Inference(format!("cannot read synthesized audio: {}", err))
    }
}

impl From<StorageError> for JobError {
    fn from(err: StorageError) -> Self {
        Self::Upload(err.to_string())
    }
}
