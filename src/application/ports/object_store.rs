//! Object Store Port - 云对象存储
//!
//! 对象存储协议由 SDK 负责，这里只定义下载、上传和签名 URL 三个调用

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),

    #[error("Storage bucket is not configured")]
    NotConfigured,

    #[error("Object not found: gs://{bucket}/{object}")]
    NotFound { bucket: String, object: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Object Store Port
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// 下载对象内容
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, StorageError>;

    /// 上传对象
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// 生成限时的 GET 签名 URL
    async fn signed_url(
        &self,
        bucket: &str,
        object: &str,
        ttl: Duration,
    ) -> Result<String, StorageError>;
}
