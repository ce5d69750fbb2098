//! Synthesize Handler - 合成任务处理
//!
//! 流程: 校验 → 选择模型 → 检查输出 bucket → 参考文本占位 → 参考音频缓存 → 推理 → 测量时长 → 上传
//! 临时输出文件无论成功失败都会被删除

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::application::commands::{SynthesizeCommand, SynthesizeResponse, SynthesizeSettings};
use crate::application::error::JobError;
use crate::application::model_registry::ModelRegistry;
use crate::application::ports::{
    AudioInfo, AudioInspectorPort, ReferenceCachePort, StorageError, SynthesisRequest,
    VoiceSynthesizerPort,
};
use crate::application::storage_transfer::StorageTransfer;
use crate::domain::job::{JobEnvelope, JobOutput, JobSuccess, ValidatedJob, PLACEHOLDER_REF_TEXT};

/// 日志中 gen_text 的最大预览长度（字符）
const TEXT_PREVIEW_CHARS: usize = 100;

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TEXT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Synthesize Handler
pub struct SynthesizeHandler {
    registry: Arc<ModelRegistry>,
    reference_cache: Arc<dyn ReferenceCachePort>,
    transfer: Arc<StorageTransfer>,
    inspector: Arc<dyn AudioInspectorPort>,
    settings: SynthesizeSettings,
    permits: Arc<Semaphore>,
}

impl SynthesizeHandler {
    pub fn new(
        registry: Arc<ModelRegistry>,
        reference_cache: Arc<dyn ReferenceCachePort>,
        transfer: Arc<StorageTransfer>,
        inspector: Arc<dyn AudioInspectorPort>,
        settings: SynthesizeSettings,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent.max(1)));
        Self {
            registry,
            reference_cache,
            transfer,
            inspector,
            settings,
            permits,
        }
    }

    /// 任务边界：任何错误都转换为 `{error}`
    pub async fn run(&self, envelope: JobEnvelope) -> JobOutput {
        self.run_command(SynthesizeCommand::from_envelope(envelope)).await
    }

    pub async fn run_command(&self, cmd: SynthesizeCommand) -> JobOutput {
        let job_id = cmd.job_id.clone();

        match self.handle(cmd).await {
            Ok(response) => JobOutput::Success(JobSuccess {
                audio_url: response.audio_url,
                duration: response.duration_secs,
                voice_id: response.voice_id,
                sample_rate: response.sample_rate,
            }),
            Err(e) => {
                match &e {
                    JobError::Validation(_) => {
                        tracing::warn!(job_id = %job_id, kind = e.kind(), error = %e, "Job rejected")
                    }
                    _ => tracing::error!(job_id = %job_id, kind = e.kind(), error = ?e, "Job failed"),
                }
                JobOutput::failure(e.to_string())
            }
        }
    }

    pub async fn handle(&self, cmd: SynthesizeCommand) -> Result<SynthesizeResponse, JobError> {
        let job = cmd
            .input
            .validate(&cmd.job_id, self.settings.disable_auto_transcription)?;

        let model = self.registry.load(&job.language)?;

        // 没有输出 bucket 时推理结果无处可去，在下载和推理之前就失败
        if self.transfer.bucket().is_none() {
            return Err(StorageError::NotConfigured.into());
        }

        let ref_text = job
            .ref_text
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_REF_TEXT.to_string());

        tracing::info!(
            job_id = %job.job_id,
            voice_id = %job.voice_id,
            language = %job.language,
            text = %preview(&job.gen_text),
            "Processing job"
        );

        let ref_audio_path = self
            .reference_cache
            .resolve(&job.voice_id, &job.ref_audio_url)
            .await?;

        let output = tempfile::Builder::new()
            .prefix("vocalis-")
            .suffix(".wav")
            .tempfile_in(&self.settings.work_dir)
            .map_err(|e| JobError::internal(format!("cannot create output file: {}", e)))?
            .into_temp_path();

        let result = self
            .synthesize_and_upload(&job, model, ref_audio_path, ref_text, &output)
            .await;

        if let Err(e) = output.close() {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(job_id = %job.job_id, error = %e, "Failed to remove temporary output");
            }
        }

        result
    }

    async fn synthesize_and_upload(
        &self,
        job: &ValidatedJob,
        model: Arc<dyn VoiceSynthesizerPort>,
        ref_audio_path: PathBuf,
        ref_text: String,
        output_path: &Path,
    ) -> Result<SynthesizeResponse, JobError> {
        let request = SynthesisRequest {
            ref_audio_path,
            ref_text,
            gen_text: job.gen_text.clone(),
            output_path: output_path.to_path_buf(),
            speed: job.speed,
            remove_silence: true,
        };

        {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| JobError::internal("synthesis worker pool is closed"))?;

            tracing::info!(
                job_id = %job.job_id,
                model = %model.describe(),
                ref_text = %request.ref_text,
                speed = request.speed,
                "Starting synthesis"
            );
            model.synthesize(&request).await?;
        }

        let info = self.inspect(output_path).await?;
        let duration_secs = info.duration_secs();
        tracing::info!(
            job_id = %job.job_id,
            duration_secs = duration_secs,
            sample_rate = info.sample_rate,
            "Synthesis completed"
        );

        let uploaded = self
            .transfer
            .upload_object(output_path, &job.output_path)
            .await?;
        if !uploaded.is_signed() {
            tracing::warn!(
                job_id = %job.job_id,
                audio_url = %uploaded.url(),
                "Returning unsigned storage reference"
            );
        }

        tracing::info!(job_id = %job.job_id, "Job completed");

        Ok(SynthesizeResponse {
            signed: uploaded.is_signed(),
            audio_url: uploaded.into_url(),
            duration_secs,
            voice_id: job.voice_id.to_string(),
            sample_rate: info.sample_rate,
        })
    }

    async fn inspect(&self, path: &Path) -> Result<AudioInfo, JobError> {
        let inspector = self.inspector.clone();
        let path = path.to_path_buf();
        let info = tokio::task::spawn_blocking(move || inspector.inspect(&path))
            .await
            .map_err(|e| JobError::internal(format!("audio inspection task failed: {}", e)))??;
        if info.sample_rate == 0 {
            return Err(JobError::Inference(
                "synthesized audio reports a sample rate of 0".to_string(),
            ));
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::JobInput;
    use crate::infrastructure::adapters::audio::SymphoniaInspector;
    use crate::infrastructure::adapters::tts::{FakeSynthesizer, FakeSynthesizerConfig};
    use crate::infrastructure::cache::{FileReferenceCache, KeepForever};
    use crate::infrastructure::memory::InMemoryObjectStore;
    use tempfile::TempDir;

    struct Fixture {
        handler: SynthesizeHandler,
        model: Arc<FakeSynthesizer>,
        store: Arc<InMemoryObjectStore>,
        work_dir: TempDir,
        _cache_dir: TempDir,
    }

    fn fixture(disable_auto_transcription: bool, model_config: FakeSynthesizerConfig) -> Fixture {
        fixture_with_bucket(disable_auto_transcription, model_config, Some("out"))
    }

    fn fixture_with_bucket(
        disable_auto_transcription: bool,
        model_config: FakeSynthesizerConfig,
        bucket: Option<&str>,
    ) -> Fixture {
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert("voices", "speaker_1.wav", b"reference".to_vec());

        let transfer = Arc::new(StorageTransfer::new(store.clone(), bucket.map(str::to_string)));
        let cache_dir = TempDir::new().unwrap();
        let cache = Arc::new(
            FileReferenceCache::new(cache_dir.path(), transfer.clone(), Box::new(KeepForever))
                .unwrap(),
        );

        let model = Arc::new(FakeSynthesizer::new(model_config));
        let mut registry = ModelRegistry::with_default(model.clone());
        registry.insert("pt", model.clone());

        let work_dir = TempDir::new().unwrap();
        let handler = SynthesizeHandler::new(
            Arc::new(registry),
            cache,
            transfer,
            Arc::new(SymphoniaInspector::new()),
            SynthesizeSettings {
                disable_auto_transcription,
                work_dir: work_dir.path().to_path_buf(),
                max_concurrent: 2,
            },
        );

        Fixture {
            handler,
            model,
            store,
            work_dir,
            _cache_dir: cache_dir,
        }
    }

    fn request() -> JobInput {
        JobInput {
            gen_text: Some("Bom dia a todos".to_string()),
            ref_audio_url: Some("gs://voices/speaker_1.wav".to_string()),
            ref_text: Some("Olá, esta é a minha voz.".to_string()),
            voice_id: Some("speaker_1".to_string()),
            ..Default::default()
        }
    }

    fn envelope(input: JobInput) -> JobEnvelope {
        JobEnvelope {
            id: Some("job-1".to_string()),
            input,
        }
    }

    fn work_dir_is_empty(fx: &Fixture) -> bool {
        std::fs::read_dir(fx.work_dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let fx = fixture(
            true,
            FakeSynthesizerConfig {
                sample_rate: 22050,
                ..Default::default()
            },
        );

        let output = fx.handler.run(envelope(request())).await;

        let JobOutput::Success(success) = output else {
            panic!("expected success, got {:?}", output);
        };
        assert!((success.duration - 2.0).abs() < 1e-3);
        assert_eq!(success.sample_rate, 22050);
        assert_eq!(success.voice_id, "speaker_1");
        assert!(!success.audio_url.is_empty());
        assert!(success.audio_url.contains("outputs/speaker_1/output_job-1.wav"));
        assert!(fx.store.get("out", "outputs/speaker_1/output_job-1.wav").is_some());

        let calls = fx.model.requests();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].remove_silence);
        assert_eq!(calls[0].speed, 1.0);
        assert_eq!(calls[0].gen_text, "Bom dia a todos");
        assert!(work_dir_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_missing_fields_never_invoke_model() {
        let fx = fixture(false, FakeSynthesizerConfig::default());

        for (field, strip) in [
            ("gen_text", (|i: &mut JobInput| i.gen_text = None) as fn(&mut JobInput)),
            ("ref_audio_url", |i: &mut JobInput| i.ref_audio_url = None),
            ("voice_id", |i: &mut JobInput| i.voice_id = Some(String::new())),
        ] {
            let mut input = request();
            strip(&mut input);
            let output = fx.handler.run(envelope(input)).await;
            assert_eq!(output, JobOutput::failure(format!("{} is required", field)));
        }
        assert!(fx.model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_ref_text_required_when_transcription_disabled() {
        let fx = fixture(true, FakeSynthesizerConfig::default());
        let mut input = request();
        input.ref_text = None;

        let output = fx.handler.run(envelope(input)).await;

        assert!(output.error().unwrap().starts_with("ref_text is required"));
        assert!(fx.model.requests().is_empty());
        assert_eq!(fx.store.download_count(), 0);
    }

    #[tokio::test]
    async fn test_placeholder_ref_text_when_transcription_enabled() {
        let fx = fixture(false, FakeSynthesizerConfig::default());
        let mut input = request();
        input.ref_text = None;

        let output = fx.handler.run(envelope(input)).await;

        assert!(output.is_success());
        assert_eq!(fx.model.requests()[0].ref_text, PLACEHOLDER_REF_TEXT);
    }

    #[tokio::test]
    async fn test_unknown_language_lists_registered_codes() {
        let fx = fixture(true, FakeSynthesizerConfig::default());
        let mut input = request();
        input.language = Some("ja".to_string());

        let output = fx.handler.run(envelope(input)).await;

        assert_eq!(
            output.error(),
            Some("language 'ja' is not available. Available models: default, en, pt, zh")
        );
        assert!(fx.model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_language_selects_model_and_speed_forwarded() {
        let fx = fixture(true, FakeSynthesizerConfig::default());
        let mut input = request();
        input.language = Some("pt".to_string());
        input.speed = Some(0.75);

        assert!(fx.handler.run(envelope(input)).await.is_success());
        assert_eq!(fx.model.requests()[0].speed, 0.75);
    }

    #[tokio::test]
    async fn test_temp_output_removed_on_synthesis_failure() {
        let fx = fixture(true, FakeSynthesizerConfig::failing("CUDA out of memory"));

        let output = fx.handler.run(envelope(request())).await;

        assert_eq!(output.error(), Some("Synthesis failed: Service error: CUDA out of memory"));
        let calls = fx.model.requests();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].output_path.exists());
        assert!(work_dir_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_upload_failure_returns_gs_reference() {
        let fx = fixture(true, FakeSynthesizerConfig::default());
        fx.store.set_fail_uploads(true);

        let output = fx.handler.run(envelope(request())).await;

        let JobOutput::Success(success) = output else {
            panic!("upload failure must not fail the job");
        };
        assert_eq!(success.audio_url, "gs://out/outputs/speaker_1/output_job-1.wav");
        assert!(work_dir_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_missing_bucket_fails_before_download_and_synthesis() {
        let fx = fixture_with_bucket(true, FakeSynthesizerConfig::default(), None);

        let output = fx.handler.run(envelope(request())).await;

        assert_eq!(output.error(), Some("Upload failed: Storage bucket is not configured"));
        assert!(fx.model.requests().is_empty());
        assert_eq!(fx.store.download_count(), 0);
        assert!(work_dir_is_empty(&fx));
    }

    #[tokio::test]
    async fn test_voice_id_with_spaces_and_punctuation() {
        let fx = fixture(true, FakeSynthesizerConfig::default());
        let mut input = request();
        input.voice_id = Some("Maria Silva (v2)".to_string());

        let output = fx.handler.run(envelope(input)).await;

        let JobOutput::Success(success) = output else {
            panic!("expected success, got {:?}", output);
        };
        assert_eq!(success.voice_id, "Maria Silva (v2)");
        assert!(fx
            .store
            .get("out", "outputs/Maria Silva (v2)/output_job-1.wav")
            .is_some());
    }

    #[tokio::test]
    async fn test_reference_fetch_failure_is_job_error() {
        let fx = fixture(true, FakeSynthesizerConfig::default());
        let mut input = request();
        input.ref_audio_url = Some("gs://voices/unknown.wav".to_string());

        let output = fx.handler.run(envelope(input)).await;

        assert!(output
            .error()
            .unwrap()
            .starts_with("Failed to download reference audio gs://voices/unknown.wav"));
        assert!(fx.model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_reference_downloaded_once_across_jobs() {
        let fx = fixture(true, FakeSynthesizerConfig::default());

        assert!(fx.handler.run(envelope(request())).await.is_success());
        assert!(fx.handler.run(envelope(request())).await.is_success());

        assert_eq!(fx.store.download_count(), 1);
        let calls = fx.model.requests();
        assert_eq!(calls[0].ref_audio_path, calls[1].ref_audio_path);
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "á".repeat(150);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), TEXT_PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }
}
