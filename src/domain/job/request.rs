//! Job Context - Input

use serde::Deserialize;

use super::ValidationError;
use crate::domain::voice::VoiceId;

/// 未指定 language 时使用的模型
pub const DEFAULT_LANGUAGE: &str = "default";

pub const DEFAULT_SPEED: f64 = 1.0;

/// 未提供 ref_text 且允许自动转写时，传给模型的参考文本
pub const PLACEHOLDER_REF_TEXT: &str = "Audio de referência para clonagem de voz.";

/// 任务信封: `{id?, input}`
#[derive(Debug, Clone, Deserialize)]
pub struct JobEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    pub input: JobInput,
}

/// 原始任务输入
///
/// 所有字段都是可选的，缺失与空字符串在 [`JobInput::validate`] 中统一处理
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub gen_text: Option<String>,
    #[serde(default)]
    pub ref_audio_url: Option<String>,
    #[serde(default)]
    pub ref_text: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub speed: Option<f64>,
}

/// 校验通过的任务
#[derive(Debug, Clone)]
pub struct ValidatedJob {
    pub job_id: String,
    pub gen_text: String,
    pub ref_audio_url: String,
    /// 为 None 时由调用方替换为 [`PLACEHOLDER_REF_TEXT`]
    pub ref_text: Option<String>,
    pub voice_id: VoiceId,
    pub language: String,
    pub output_path: String,
    pub speed: f64,
}

/// 默认上传路径: `outputs/{voice_id}/output_{job_id}.wav`
pub fn default_output_path(voice_id: &VoiceId, job_id: &str) -> String {
    format!("outputs/{}/output_{}.wav", voice_id, job_id)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl JobInput {
    /// 校验输入
    ///
    /// 顺序: gen_text → ref_audio_url → voice_id → ref_text（转写禁用时）→ speed
    pub fn validate(
        self,
        job_id: &str,
        disable_auto_transcription: bool,
    ) -> Result<ValidatedJob, ValidationError> {
        let gen_text =
            non_empty(self.gen_text).ok_or(ValidationError::MissingField("gen_text"))?;
        let ref_audio_url =
            non_empty(self.ref_audio_url).ok_or(ValidationError::MissingField("ref_audio_url"))?;
        let voice_id =
            non_empty(self.voice_id).ok_or(ValidationError::MissingField("voice_id"))?;
        let voice_id = VoiceId::parse(voice_id)?;

        let ref_text = non_empty(self.ref_text);
        if disable_auto_transcription && ref_text.is_none() {
            return Err(ValidationError::RefTextRequired);
        }

        let speed = self.speed.unwrap_or(DEFAULT_SPEED);
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ValidationError::InvalidSpeed(speed));
        }

        let language = non_empty(self.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let output_path = non_empty(self.output_path)
            .unwrap_or_else(|| default_output_path(&voice_id, job_id));

        Ok(ValidatedJob {
            job_id: job_id.to_string(),
            gen_text,
            ref_audio_url,
            ref_text,
            voice_id,
            language,
            output_path,
            speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> JobInput {
        JobInput {
            gen_text: Some("Olá mundo".to_string()),
            ref_audio_url: Some("gs://voices/ref.wav".to_string()),
            ref_text: Some("texto de referência".to_string()),
            voice_id: Some("speaker_1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_input_applies_defaults() {
        let job = complete_input().validate("job-1", true).unwrap();
        assert_eq!(job.language, DEFAULT_LANGUAGE);
        assert_eq!(job.speed, DEFAULT_SPEED);
        assert_eq!(job.output_path, "outputs/speaker_1/output_job-1.wav");
        assert_eq!(job.ref_text.as_deref(), Some("texto de referência"));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let err = JobInput::default().validate("j", false).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("gen_text"));
        assert_eq!(err.to_string(), "gen_text is required");

        let mut input = complete_input();
        input.ref_audio_url = Some(String::new());
        input.voice_id = None;
        let err = input.validate("j", false).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("ref_audio_url"));

        let mut input = complete_input();
        input.voice_id = None;
        assert_eq!(
            input.validate("j", false).unwrap_err().to_string(),
            "voice_id is required"
        );
    }

    #[test]
    fn test_ref_text_required_when_transcription_disabled() {
        let mut input = complete_input();
        input.ref_text = Some(String::new());
        assert_eq!(
            input.clone().validate("j", true).unwrap_err(),
            ValidationError::RefTextRequired
        );

        let job = input.validate("j", false).unwrap();
        assert!(job.ref_text.is_none());
    }

    #[test]
    fn test_invalid_speed_rejected() {
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut input = complete_input();
            input.speed = Some(speed);
            assert!(matches!(
                input.validate("j", true),
                Err(ValidationError::InvalidSpeed(_))
            ));
        }
    }

    #[test]
    fn test_explicit_output_path_and_language_kept() {
        let mut input = complete_input();
        input.output_path = Some("custom/out.wav".to_string());
        input.language = Some("pt".to_string());
        input.speed = Some(0.8);
        let job = input.validate("j", true).unwrap();
        assert_eq!(job.output_path, "custom/out.wav");
        assert_eq!(job.language, "pt");
        assert_eq!(job.speed, 0.8);
    }

    #[test]
    fn test_unsafe_voice_id_rejected() {
        let mut input = complete_input();
        input.voice_id = Some("../../etc/passwd".to_string());
        assert!(matches!(
            input.validate("j", true),
            Err(ValidationError::Voice(_))
        ));
    }

    #[test]
    fn test_envelope_deserializes_without_id() {
        let envelope: JobEnvelope = serde_json::from_value(serde_json::json!({
            "input": { "gen_text": "hi", "speed": 1 }
        }))
        .unwrap();
        assert!(envelope.id.is_none());
        assert_eq!(envelope.input.speed, Some(1.0));
        assert_eq!(envelope.input.gen_text.as_deref(), Some("hi"));
    }
}
