//! CLI Synthesizer - 通过 `f5-tts_infer-cli` 子进程执行推理
//!
//! 每次合成启动一个子进程；任务被取消（future 被 drop）时子进程会被杀掉

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{SynthesisRequest, TtsError, VoiceSynthesizerPort};

/// 默认模型名
pub const DEFAULT_MODEL_NAME: &str = "F5TTS_v1_Base";

/// stderr 保留的最大字符数
const STDERR_TAIL_CHARS: usize = 2000;

/// CLI Synthesizer 配置
#[derive(Debug, Clone)]
pub struct CliSynthesizerConfig {
    /// 可执行程序
    pub program: String,
    /// 模型名
    pub model: String,
    /// 自定义 checkpoint；为 None 时使用模型自带权重
    pub ckpt_file: Option<PathBuf>,
    /// 自定义词表
    pub vocab_file: Option<PathBuf>,
    /// 超时（秒），0 表示不限制
    pub timeout_secs: u64,
}

impl Default for CliSynthesizerConfig {
    fn default() -> Self {
        Self {
            program: "f5-tts_infer-cli".to_string(),
            model: DEFAULT_MODEL_NAME.to_string(),
            ckpt_file: None,
            vocab_file: None,
            timeout_secs: 0,
        }
    }
}

/// CLI Synthesizer
pub struct CliSynthesizer {
    config: CliSynthesizerConfig,
}

impl CliSynthesizer {
    pub fn new(config: CliSynthesizerConfig) -> Self {
        Self { config }
    }

    /// 构造命令行参数
    pub fn build_args(&self, request: &SynthesisRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--model".into(), self.config.model.clone().into()];

        if let Some(ckpt) = &self.config.ckpt_file {
            args.push("--ckpt_file".into());
            args.push(ckpt.clone().into_os_string());
        }
        if let Some(vocab) = &self.config.vocab_file {
            args.push("--vocab_file".into());
            args.push(vocab.clone().into_os_string());
        }

        args.push("--ref_audio".into());
        args.push(request.ref_audio_path.clone().into_os_string());
        args.push("--ref_text".into());
        args.push(request.ref_text.clone().into());
        args.push("--gen_text".into());
        args.push(request.gen_text.clone().into());

        // CLI 以 output_dir + output_file 指定输出位置
        if let Some(dir) = request.output_path.parent() {
            args.push("--output_dir".into());
            args.push(dir.as_os_str().to_os_string());
        }
        if let Some(file) = request.output_path.file_name() {
            args.push("--output_file".into());
            args.push(file.to_os_string());
        }

        args.push("--speed".into());
        args.push(request.speed.to_string().into());
        if request.remove_silence {
            args.push("--remove_silence".into());
        }
        args
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_TAIL_CHARS);
    text.chars().skip(skip).collect()
}

#[async_trait]
impl VoiceSynthesizerPort for CliSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<(), TtsError> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %self.config.program,
            model = %self.config.model,
            output = %request.output_path.display(),
            "Spawning synthesizer"
        );

        let child = cmd
            .spawn()
            .map_err(|e| TtsError::SpawnError(format!("{}: {}", self.config.program, e)))?;

        let waited = if self.config.timeout_secs > 0 {
            // 超时后 wait_with_output 的 future 被 drop，子进程随之被杀
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| TtsError::Timeout(self.config.timeout_secs))?
        } else {
            child.wait_with_output().await
        };
        let output = waited.map_err(|e| TtsError::IoError(e.to_string()))?;

        if !output.status.success() {
            return Err(TtsError::ProcessFailed {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let written = tokio::fs::metadata(&request.output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return Err(TtsError::InvalidResponse(format!(
                "{} produced no audio at {}",
                self.config.program,
                request.output_path.display()
            )));
        }

        Ok(())
    }

    fn describe(&self) -> String {
        match &self.config.ckpt_file {
            Some(ckpt) => format!("cli:{}@{}", self.config.model, ckpt.display()),
            None => format!("cli:{}", self.config.model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(output_path: PathBuf) -> SynthesisRequest {
        SynthesisRequest {
            ref_audio_path: PathBuf::from("/cache/speaker_1-abc.wav"),
            ref_text: "Olá".to_string(),
            gen_text: "Bom dia".to_string(),
            output_path,
            speed: 0.9,
            remove_silence: true,
        }
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_build_args_default_model() {
        let synth = CliSynthesizer::new(CliSynthesizerConfig::default());
        let args = strings(synth.build_args(&request(PathBuf::from("/tmp/work/out.wav"))));

        assert_eq!(
            args,
            vec![
                "--model",
                "F5TTS_v1_Base",
                "--ref_audio",
                "/cache/speaker_1-abc.wav",
                "--ref_text",
                "Olá",
                "--gen_text",
                "Bom dia",
                "--output_dir",
                "/tmp/work",
                "--output_file",
                "out.wav",
                "--speed",
                "0.9",
                "--remove_silence",
            ]
        );
    }

    #[test]
    fn test_build_args_custom_model() {
        let synth = CliSynthesizer::new(CliSynthesizerConfig {
            ckpt_file: Some(PathBuf::from("/models/pt.safetensors")),
            vocab_file: Some(PathBuf::from("/models/pt_vocab.txt")),
            ..Default::default()
        });
        let mut req = request(PathBuf::from("/tmp/out.wav"));
        req.remove_silence = false;
        let args = strings(synth.build_args(&req));

        assert_eq!(&args[2..6], ["--ckpt_file", "/models/pt.safetensors", "--vocab_file", "/models/pt_vocab.txt"]);
        assert!(!args.contains(&"--remove_silence".to_string()));
        assert_eq!(synth.describe(), "cli:F5TTS_v1_Base@/models/pt.safetensors");
    }

    #[test]
    fn test_stderr_tail_keeps_end() {
        let long = format!("{}END", "x".repeat(5000));
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("END"));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let synth = CliSynthesizer::new(CliSynthesizerConfig {
            program: "vocalis-no-such-binary".to_string(),
            ..Default::default()
        });
        let dir = tempdir().unwrap();
        let err = synth
            .synthesize(&request(dir.path().join("out.wav")))
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::SpawnError(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_process_failed() {
        let synth = CliSynthesizer::new(CliSynthesizerConfig {
            program: "false".to_string(),
            ..Default::default()
        });
        let dir = tempdir().unwrap();
        let err = synth
            .synthesize(&request(dir.path().join("out.wav")))
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::ProcessFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_invalid() {
        let synth = CliSynthesizer::new(CliSynthesizerConfig {
            program: "true".to_string(),
            ..Default::default()
        });
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.wav");
        std::fs::write(&out, b"").unwrap();

        let err = synth.synthesize(&request(out)).await.unwrap_err();
        assert!(matches!(err, TtsError::InvalidResponse(_)));
    }
}
