//! Vocalis - 声音克隆语音合成任务服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Job: 任务请求、校验与输出
//! - Voice: 音色标识
//!
//! 应用层 (application/):
//! - Ports: 端口定义（VoiceSynthesizer, ObjectStore, ReferenceCache, AudioInspector）
//! - Commands: 合成任务处理器
//! - ModelRegistry / StorageTransfer
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 任务入口 + 运维接口
//! - Adapters: F5-TTS CLI / HTTP / Fake 合成器，GCS，symphonia
//! - Cache: 参考音频磁盘缓存
//! - Memory: 内存对象存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
