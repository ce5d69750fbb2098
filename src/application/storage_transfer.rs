//! Storage Transfer - 对象存储的下载/上传辅助
//!
//! - 解析 `gs://bucket/path` 与 `https://storage.googleapis.com/bucket/path`
//! - 下载到本地文件（先写临时文件再 rename）
//! - 上传并生成 7 天有效的签名 URL，失败时降级为 `gs://` 原始引用

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ObjectStorePort, StorageError};

/// 签名 URL 有效期: 7 天
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const GCS_SCHEME: &str = "gs://";
const GCS_HOST: &str = "storage.googleapis.com/";

/// 解析后的存储地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUrl {
    pub bucket: String,
    pub object: String,
}

impl StorageUrl {
    /// 解析存储 URL
    ///
    /// 支持:
    /// - `gs://bucket/path/to/object`
    /// - `https://storage.googleapis.com/bucket/path/to/object`（也接受 http）
    pub fn parse(url: &str) -> Result<Self, StorageError> {
        let rest = if let Some(rest) = url.strip_prefix(GCS_SCHEME) {
            rest
        } else if let Some(rest) = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .and_then(|rest| rest.strip_prefix(GCS_HOST))
        {
            rest
        } else {
            return Err(StorageError::InvalidUrl(url.to_string()));
        };

        // 查询参数（例如已签名 URL）不属于对象路径
        let rest = rest.split(['?', '#']).next().unwrap_or_default();

        match rest.split_once('/') {
            Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                object: object.to_string(),
            }),
            _ => Err(StorageError::InvalidUrl(url.to_string())),
        }
    }

    pub fn gs_uri(&self) -> String {
        format!("{}{}/{}", GCS_SCHEME, self.bucket, self.object)
    }
}

/// 上传结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadedAudio {
    /// 限时签名 URL
    Signed(String),
    /// 上传或签名失败时的 `gs://` 引用，HTTP 客户端可能无法直接使用
    Unsigned(String),
}

impl UploadedAudio {
    pub fn url(&self) -> &str {
        match self {
            Self::Signed(url) | Self::Unsigned(url) => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Self::Signed(url) | Self::Unsigned(url) => url,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }
}

/// 存储传输辅助
pub struct StorageTransfer {
    store: Arc<dyn ObjectStorePort>,
    /// 输出 bucket；为 None 时上传不可用
    bucket: Option<String>,
    signed_url_ttl: Duration,
}

impl StorageTransfer {
    pub fn new(store: Arc<dyn ObjectStorePort>, bucket: Option<String>) -> Self {
        Self {
            store,
            bucket: bucket.filter(|b| !b.is_empty()),
            signed_url_ttl: SIGNED_URL_TTL,
        }
    }

    pub fn with_signed_url_ttl(mut self, ttl: Duration) -> Self {
        self.signed_url_ttl = ttl;
        self
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// 下载对象到本地路径
    ///
    /// 内容先写入同目录下的临时文件再 rename，失败时不会在 `local_path` 留下残缺文件。
    /// 所有错误都会记录日志并以 `Err` 返回
    pub async fn download_object(&self, url: &str, local_path: &Path) -> Result<(), StorageError> {
        let result = self.try_download(url, local_path).await;
        match &result {
            Ok(size) => tracing::info!(
                url = %url,
                local_path = %local_path.display(),
                size_bytes = size,
                "Object downloaded"
            ),
            Err(e) => tracing::error!(url = %url, error = %e, "Failed to download object"),
        }
        result.map(|_| ())
    }

    async fn try_download(&self, url: &str, local_path: &Path) -> Result<usize, StorageError> {
        let location = StorageUrl::parse(url)?;
        let data = self
            .store
            .download(&location.bucket, &location.object)
            .await?;
        let size = data.len();

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let partial = local_path.with_file_name(format!(".{}.{}.part", file_name, uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&partial, &data).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StorageError::IoError(e.to_string()));
        }
        if let Err(e) = tokio::fs::rename(&partial, local_path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StorageError::IoError(e.to_string()));
        }

        Ok(size)
    }

    /// 上传本地文件并返回访问 URL
    ///
    /// - bucket 未配置 / 本地文件读取失败: `Err`
    /// - 上传或签名失败: 降级为 [`UploadedAudio::Unsigned`]
    pub async fn upload_object(
        &self,
        local_path: &Path,
        object_path: &str,
    ) -> Result<UploadedAudio, StorageError> {
        let bucket = self.bucket.as_deref().ok_or(StorageError::NotConfigured)?;
        let fallback = StorageUrl {
            bucket: bucket.to_string(),
            object: object_path.to_string(),
        }
        .gs_uri();

        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        let size = data.len();

        if let Err(e) = self
            .store
            .upload(bucket, object_path, data, "audio/wav")
            .await
        {
            tracing::error!(
                object = %fallback,
                error = %e,
                "Upload failed, returning unsigned reference"
            );
            return Ok(UploadedAudio::Unsigned(fallback));
        }

        tracing::info!(
            local_path = %local_path.display(),
            object = %fallback,
            size_bytes = size,
            "Object uploaded"
        );

        match self
            .store
            .signed_url(bucket, object_path, self.signed_url_ttl)
            .await
        {
            Ok(url) => Ok(UploadedAudio::Signed(url)),
            Err(e) => {
                tracing::error!(
                    object = %fallback,
                    error = %e,
                    "Failed to sign URL, returning unsigned reference"
                );
                Ok(UploadedAudio::Unsigned(fallback))
            }
        }
    }
}
