//! Reference Cache Port - 参考音频缓存
//!
//! 将 (voice_id, 远程 URL) 映射为本地文件路径

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::voice::VoiceId;

/// Reference Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to download reference audio {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub download_count: u64,
    pub evicted_count: u64,
}

/// Reference Cache Port
#[async_trait]
pub trait ReferenceCachePort: Send + Sync {
    /// 返回参考音频的本地路径
    ///
    /// 命中时不做任何远程检查；未命中时下载到缓存路径。下载失败不会留下缓存条目
    async fn resolve(&self, voice_id: &VoiceId, remote_url: &str) -> Result<PathBuf, CacheError>;

    async fn stats(&self) -> CacheStats;
}
