// src/services/storage.rs
//! Object storage for car photos and videos.
//!
//! Uploads never pass through this service: clients ask for a presigned PUT
//! URL, upload directly, then persist the public URL on a Media/Car record.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::common::config::StorageConfig;
use crate::common::{generate_raw_id, ApiError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Presigning failed: {0}")]
    Presign(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotConfigured => {
                ApiError::ServiceUnavailable("file uploads are not available".to_string())
            }
            other => ApiError::InternalServer(other.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct StorageService {
    config: StorageConfig,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn bucket(&self) -> Result<&str, StorageError> {
        self.config
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or(StorageError::NotConfigured)
    }

    async fn get_s3_client(&self) -> Result<S3Client, StorageError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()));

        // Explicit keys win; otherwise the default provider chain applies
        if let (Some(key_id), Some(secret)) = (
            self.config.access_key_id.as_deref(),
            self.config.secret_access_key.as_deref(),
        ) {
            loader = loader.credentials_provider(Credentials::new(
                key_id, secret, None, None, "carfolio-config",
            ));
        }

        let sdk_config = loader.load().await;
        Ok(S3Client::new(&sdk_config))
    }

    /// Object key for an upload: `uploads/<user>/<random>-<file name>`
    pub fn object_key(user_id: &str, file_name: &str) -> String {
        let safe_name: String = file_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("uploads/{}/{}-{}", user_id, generate_raw_id(10), safe_name)
    }

    /// URL the object is served from once uploaded (CDN domain when configured)
    pub fn public_url(&self, key: &str) -> Result<String, StorageError> {
        if let Some(domain) = &self.config.public_domain {
            return Ok(format!("https://{}/{}", domain.trim_end_matches('/'), key));
        }

        let bucket = self.bucket()?;
        Ok(format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            bucket, self.config.region, key
        ))
    }

    pub fn upload_url_ttl_secs(&self) -> u64 {
        self.config.upload_url_ttl_secs
    }

    /// Presigned PUT URL valid for the configured TTL
    pub async fn presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let bucket = self.bucket()?.to_string();
        let client = self.get_s3_client().await?;

        let presigning =
            PresigningConfig::expires_in(Duration::from_secs(self.config.upload_url_ttl_secs))
                .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        let request = client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to presign upload");
                StorageError::Presign(e.to_string())
            })?;

        debug!(key = %key, bucket = %bucket, "Presigned upload URL issued");
        info!(key = %key, "Upload URL created");
        Ok(request.uri().to_string())
    }
}
