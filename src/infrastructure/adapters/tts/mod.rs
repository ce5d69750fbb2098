//! TTS Adapter - 声音克隆模型的调用方式
//!
//! - cli: `f5-tts_infer-cli` 子进程
//! - http: 外部推理服务
//! - fake: 写出静音音频（测试、本地联调）

mod cli_synthesizer;
mod factory;
mod fake_synthesizer;
mod http_synthesizer;

pub use cli_synthesizer::{CliSynthesizer, CliSynthesizerConfig, DEFAULT_MODEL_NAME};
pub use factory::{ConfiguredSynthesizerFactory, SynthesizerBackend};
pub use fake_synthesizer::{FakeSynthesizer, FakeSynthesizerConfig};
pub use http_synthesizer::{HttpSynthesizer, HttpSynthesizerConfig};
