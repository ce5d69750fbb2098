//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_inspector;
mod object_store;
mod reference_cache;
mod voice_synthesizer;

pub use audio_inspector::{AudioError, AudioInfo, AudioInspectorPort};
pub use object_store::{ObjectStorePort, StorageError};
pub use reference_cache::{CacheError, CacheStats, ReferenceCachePort};
pub use voice_synthesizer::{
    CustomModelSpec, SynthesisRequest, SynthesizerFactory, TtsError, VoiceSynthesizerPort,
};
