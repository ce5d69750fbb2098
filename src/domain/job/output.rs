//! Job Context - Output

use serde::Serialize;

/// 成功结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSuccess {
    /// 签名 URL；上传或签名失败时为 `gs://bucket/path` 原始引用
    pub audio_url: String,
    /// 时长（秒）
    pub duration: f64,
    pub voice_id: String,
    pub sample_rate: u32,
}

/// 任务输出
///
/// 序列化为 `{audio_url, duration, voice_id, sample_rate}` 或 `{error}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutput {
    Success(JobSuccess),
    Failure { error: String },
}

impl JobOutput {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }
}
