//! File Reference Cache - 本地磁盘参考音频缓存
//!
//! 缓存文件: `{cache_dir}/{voice_id}-{md5(remote_url)}.wav`
//!
//! - 同一个 key 的并发未命中只下载一次（每个 key 一把异步锁，无人持有时从表中移除）
//! - 下载写入临时文件后 rename，缓存路径上不会出现残缺文件
//! - 每次插入后按淘汰策略清理

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::eviction::{CachedFile, EvictionPolicy};
use crate::application::ports::{CacheError, CacheStats, ReferenceCachePort};
use crate::application::storage_transfer::StorageTransfer;
use crate::domain::voice::VoiceId;

const CACHE_EXTENSION: &str = "wav";

/// 缓存文件名
pub fn cache_file_name(voice_id: &VoiceId, remote_url: &str) -> String {
    format!(
        "{}-{:x}.{}",
        voice_id,
        md5::compute(remote_url.as_bytes()),
        CACHE_EXTENSION
    )
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 磁盘参考音频缓存
pub struct FileReferenceCache {
    cache_dir: PathBuf,
    transfer: Arc<StorageTransfer>,
    policy: Box<dyn EvictionPolicy>,
    /// 文件名 -> 填充锁
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// 文件名 -> 元数据
    index: DashMap<String, CachedFile>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    download_count: AtomicU64,
    evicted_count: AtomicU64,
}

impl FileReferenceCache {
    /// 创建缓存，并登记目录中已有的文件
    pub fn new(
        cache_dir: impl AsRef<Path>,
        transfer: Arc<StorageTransfer>,
        policy: Box<dyn EvictionPolicy>,
    ) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&cache_dir).map_err(|e| CacheError::IoError(e.to_string()))?;

        let index = DashMap::new();
        let dir = std::fs::read_dir(&cache_dir).map_err(|e| CacheError::IoError(e.to_string()))?;
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let last_accessed = metadata
                .modified()
                .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
                .unwrap_or_else(|_| now_millis());
            index.insert(
                name.clone(),
                CachedFile {
                    name,
                    size_bytes: metadata.len(),
                    last_accessed,
                },
            );
        }

        tracing::info!(
            cache_dir = %cache_dir.display(),
            entries = index.len(),
            policy = %policy.name(),
            "Reference cache initialized"
        );

        Ok(Self {
            cache_dir,
            transfer,
            policy,
            locks: DashMap::new(),
            index,
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
            download_count: AtomicU64::new(0),
            evicted_count: AtomicU64::new(0),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 归还锁；没有其他任务持有或等待时移除表项
    fn release_lock(&self, name: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks.remove_if(name, |_, l| Arc::strong_count(l) == 1);
    }

    fn touch(&self, name: &str, size_bytes: u64) {
        let now = now_millis();
        self.index
            .entry(name.to_string())
            .and_modify(|e| e.last_accessed = now)
            .or_insert_with(|| CachedFile {
                name: name.to_string(),
                size_bytes,
                last_accessed: now,
            });
    }

    /// 按策略淘汰；刚插入的文件和正在被填充的文件不会被删除
    async fn evict(&self, inserted: &str) {
        let candidates: Vec<CachedFile> = self
            .index
            .iter()
            .map(|e| e.value().clone())
            .collect();

        for victim in self.policy.select_victims(&candidates) {
            if victim == inserted {
                continue;
            }
            let lock = self.lock_for(&victim);
            if let Ok(_guard) = lock.try_lock() {
                self.remove_victim(&victim).await;
            }
            self.release_lock(&victim, lock);
        }
    }

    async fn remove_victim(&self, victim: &str) {
        match tokio::fs::remove_file(self.cache_dir.join(victim)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(file = %victim, error = %e, "Failed to evict cached reference");
                return;
            }
        }
        if let Some((_, entry)) = self.index.remove(victim) {
            self.evicted_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                file = %victim,
                size_bytes = entry.size_bytes,
                "Evicted cached reference"
            );
        }
    }

    async fn populate(
        &self,
        voice_id: &VoiceId,
        remote_url: &str,
        name: &str,
        path: &Path,
    ) -> Result<(), CacheError> {
        if let Ok(metadata) = tokio::fs::metadata(path).await {
            if metadata.is_file() {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                self.touch(name, metadata.len());
                tracing::info!(voice_id = %voice_id, path = %path.display(), "Using cached reference audio");
                return Ok(());
            }
        }

        self.miss_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(voice_id = %voice_id, url = %remote_url, "Downloading reference audio");

        self.transfer
            .download_object(remote_url, path)
            .await
            .map_err(|e| CacheError::FetchFailed {
                url: remote_url.to_string(),
                reason: e.to_string(),
            })?;
        self.download_count.fetch_add(1, Ordering::Relaxed);

        let size_bytes = tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .map_err(|e| CacheError::IoError(e.to_string()))?;
        self.touch(name, size_bytes);

        self.evict(name).await;
        Ok(())
    }
}

#[async_trait]
impl ReferenceCachePort for FileReferenceCache {
    async fn resolve(&self, voice_id: &VoiceId, remote_url: &str) -> Result<PathBuf, CacheError> {
        let name = cache_file_name(voice_id, remote_url);
        let path = self.cache_dir.join(&name);

        let lock = self.lock_for(&name);
        let result = {
            let _guard = lock.lock().await;
            self.populate(voice_id, remote_url, &name, &path).await
        };
        self.release_lock(&name, lock);

        result.map(|()| path)
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.index.len(),
            total_size_bytes: self.index.iter().map(|e| e.size_bytes).sum(),
            max_size_bytes: self.policy.max_size_bytes(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            download_count: self.download_count.load(Ordering::Relaxed),
            evicted_count: self.evicted_count.load(Ordering::Relaxed),
        }
    }
}
