//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（VoiceSynthesizer、ObjectStore、ReferenceCache、AudioInspector）
//! - commands: 合成任务命令及处理器
//! - model_registry: 语言到模型的映射
//! - storage_transfer: 对象存储下载/上传辅助
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod model_registry;
pub mod ports;
pub mod storage_transfer;

// Re-exports
pub use commands::{
    handlers::SynthesizeHandler, SynthesizeCommand, SynthesizeResponse, SynthesizeSettings,
};

pub use error::JobError;

pub use model_registry::{parse_custom_models, ModelRegistry, RegistryError};

pub use ports::{
    // Audio inspector
    AudioError,
    AudioInfo,
    AudioInspectorPort,
    // Object store
    ObjectStorePort,
    StorageError,
    // Reference cache
    CacheError,
    CacheStats,
    ReferenceCachePort,
    // Voice synthesizer
    CustomModelSpec,
    SynthesisRequest,
    SynthesizerFactory,
    TtsError,
    VoiceSynthesizerPort,
};

pub use storage_transfer::{StorageTransfer, StorageUrl, UploadedAudio, SIGNED_URL_TTL};
