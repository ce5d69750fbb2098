//! In-Memory Object Store Implementation
//!
//! 本地运行（未配置 GCS）和测试使用；签名 URL 为模拟格式

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::application::ports::{ObjectStorePort, StorageError};

/// 内存对象存储
#[derive(Default)]
pub struct InMemoryObjectStore {
    /// (bucket, object) -> data
    objects: DashMap<(String, String), Vec<u8>>,
    downloads: AtomicU64,
    fail_uploads: AtomicBool,
    fail_signing: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, object: &str, data: Vec<u8>) {
        self.objects
            .insert((bucket.to_string(), object.to_string()), data);
    }

    pub fn get(&self, bucket: &str, object: &str) -> Option<Vec<u8>> {
        self.objects
            .get(&(bucket.to_string(), object.to_string()))
            .map(|entry| entry.value().clone())
    }

    /// 成功下载的次数
    pub fn download_count(&self) -> u64 {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_signing(&self, fail: bool) {
        self.fail_signing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorePort for InMemoryObjectStore {
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, StorageError> {
        let data = self.get(bucket, object).ok_or_else(|| StorageError::NotFound {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(data)
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Transport("simulated upload failure".to_string()));
        }
        self.insert(bucket, object, data);
        Ok(())
    }

    async fn signed_url(
        &self,
        bucket: &str,
        object: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::Signing("simulated signing failure".to_string()));
        }
        if !self
            .objects
            .contains_key(&(bucket.to_string(), object.to_string()))
        {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                object: object.to_string(),
            });
        }
        Ok(format!(
            "https://storage.googleapis.com/{}/{}?X-Goog-Algorithm=GOOG4-RSA-SHA256&X-Goog-Expires={}&X-Goog-Signature={}",
            bucket,
            object,
            ttl.as_secs(),
            uuid::Uuid::new_v4().simple()
        ))
    }
}
