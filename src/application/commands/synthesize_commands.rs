//! Synthesize Commands - 合成任务命令

use std::path::PathBuf;

use crate::domain::job::{JobEnvelope, JobInput};

/// 合成任务命令
#[derive(Debug, Clone)]
pub struct SynthesizeCommand {
    pub job_id: String,
    pub input: JobInput,
}

impl SynthesizeCommand {
    /// 从任务信封创建命令，缺失的任务 ID 使用随机 UUID
    pub fn from_envelope(envelope: JobEnvelope) -> Self {
        let job_id = envelope
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            job_id,
            input: envelope.input,
        }
    }
}

/// 合成任务结果
#[derive(Debug, Clone)]
pub struct SynthesizeResponse {
    pub audio_url: String,
    /// audio_url 是否为签名 URL
    pub signed: bool,
    pub duration_secs: f64,
    pub voice_id: String,
    pub sample_rate: u32,
}

/// 任务处理设置
#[derive(Debug, Clone)]
pub struct SynthesizeSettings {
    /// 禁用自动转写时 ref_text 必填
    pub disable_auto_transcription: bool,
    /// 临时输出文件目录
    pub work_dir: PathBuf,
    /// 同时运行的推理数
    pub max_concurrent: usize,
}

impl Default for SynthesizeSettings {
    fn default() -> Self {
        Self {
            disable_auto_transcription: true,
            work_dir: std::env::temp_dir(),
            max_concurrent: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_envelope_keeps_id() {
        let cmd = SynthesizeCommand::from_envelope(JobEnvelope {
            id: Some("job-7".to_string()),
            input: JobInput::default(),
        });
        assert_eq!(cmd.job_id, "job-7");
    }

    #[test]
    fn test_from_envelope_generates_id() {
        let cmd = SynthesizeCommand::from_envelope(JobEnvelope {
            id: Some(String::new()),
            input: JobInput::default(),
        });
        assert!(uuid::Uuid::parse_str(&cmd.job_id).is_ok());
    }
}
