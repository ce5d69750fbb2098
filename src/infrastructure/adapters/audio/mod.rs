//! Audio Adapter - 波形文件读写

mod symphonia_inspector;
mod wav_writer;

pub use symphonia_inspector::SymphoniaInspector;
pub use wav_writer::{encode_pcm16_wav, silent_wav};
