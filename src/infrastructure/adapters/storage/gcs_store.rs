//! GCS Object Store - Google Cloud Storage 适配器
//!
//! 凭证来源（按优先级）：
//! 1. 显式提供的服务账号 JSON
//! 2. 运行环境的默认凭证（GOOGLE_APPLICATION_CREDENTIALS / 元数据服务）
//! 3. 匿名访问（只能读公开对象，无法签名）

use async_trait::async_trait;
use google_cloud_storage::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use google_cloud_storage::http::Error as GcsHttpError;
use google_cloud_storage::sign::{SignedURLMethod, SignedURLOptions};
use std::time::Duration;

use crate::application::ports::{ObjectStorePort, StorageError};

/// 实际使用的凭证来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    ServiceAccount,
    ApplicationDefault,
    Anonymous,
}

/// GCS 对象存储
pub struct GcsObjectStore {
    client: Client,
    source: CredentialSource,
}

impl GcsObjectStore {
    /// 创建客户端
    ///
    /// 初始化失败不会中止进程：凭证 JSON 无效时记录警告并依次降级到默认凭证、匿名客户端
    pub async fn new(credentials_json: Option<&str>) -> Self {
        let explicit = match credentials_json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => match service_account_config(json).await {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Could not initialize GCS client from GCS_CREDENTIALS_JSON, falling back"
                    );
                    None
                }
            },
            None => None,
        };

        let (config, source) = match explicit {
            Some(config) => (config, CredentialSource::ServiceAccount),
            None => match ClientConfig::default().with_auth().await {
                Ok(config) => (config, CredentialSource::ApplicationDefault),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "No GCS credentials available, using anonymous client (uploads and signing will fail)"
                    );
                    (ClientConfig::default().anonymous(), CredentialSource::Anonymous)
                }
            },
        };
        tracing::info!(source = ?source, "GCS client initialized");

        Self {
            client: Client::new(config),
            source,
        }
    }

    pub fn credential_source(&self) -> CredentialSource {
        self.source
    }
}

async fn service_account_config(json: &str) -> Result<ClientConfig, StorageError> {
    let credentials = CredentialsFile::new_from_str(json)
        .await
        .map_err(|e| StorageError::Transport(format!("invalid credentials: {}", e)))?;
    ClientConfig::default()
        .with_credentials(credentials)
        .await
        .map_err(|e| StorageError::Transport(e.to_string()))
}

fn map_download_error(bucket: &str, object: &str, err: GcsHttpError) -> StorageError {
    match err {
        GcsHttpError::Response(resp) if resp.code == 404 => StorageError::NotFound {
            bucket: bucket.to_string(),
            object: object.to_string(),
        },
        other => StorageError::Transport(other.to_string()),
    }
}

#[async_trait]
impl ObjectStorePort for GcsObjectStore {
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, StorageError> {
        self.client
            .download_object(
                &GetObjectRequest {
                    bucket: bucket.to_string(),
                    object: object.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await
            .map_err(|e| map_download_error(bucket, object, e))
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut media = Media::new(object.to_string());
        media.content_type = content_type.to_string().into();

        self.client
            .upload_object(
                &UploadObjectRequest {
                    bucket: bucket.to_string(),
                    ..Default::default()
                },
                data,
                &UploadType::Simple(media),
            )
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Transport(e.to_string()))
    }

    async fn signed_url(
        &self,
        bucket: &str,
        object: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        self.client
            .signed_url(
                bucket,
                object,
                None,
                None,
                SignedURLOptions {
                    method: SignedURLMethod::GET,
                    expires: ttl,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| StorageError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_credentials_json_falls_back() {
        let err = service_account_config("{not json").await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));

        let store = GcsObjectStore::new(Some("{not json")).await;
        assert_ne!(store.credential_source(), CredentialSource::ServiceAccount);
        let _usable: &dyn ObjectStorePort = &store;
    }

    #[tokio::test]
    async fn test_blank_credentials_are_ignored() {
        let store = GcsObjectStore::new(Some("   ")).await;
        assert_ne!(store.credential_source(), CredentialSource::ServiceAccount);
    }
}
