//! Object storage for boat photos

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::Client;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::{AppError, AppResult},
};

const GCS_API: &str = "https://storage.googleapis.com";

/// Blob store returning public URLs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a blob under `name` and return its public URL
    async fn store(&self, name: &str, content_type: Option<String>, data: Bytes) -> AppResult<String>;

    /// Delete the object behind `url`; `false` when the URL is not managed by this store
    async fn delete(&self, url: &str) -> AppResult<bool>;
}

/// Build the object store selected in configuration
pub fn from_config(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Gcs => {
            let bucket = config
                .bucket
                .clone()
                .ok_or_else(|| AppError::Internal("storage.bucket is required for gcs".to_string()))?;
            let access_token = config.access_token.clone().ok_or_else(|| {
                AppError::Internal("storage.access_token is required for gcs".to_string())
            })?;
            Ok(Arc::new(GcsObjectStore::new(bucket, access_token)))
        }
        StorageBackend::Local => Ok(Arc::new(LocalObjectStore::new(
            config.local_dir.clone(),
            config.public_base_url.clone(),
        ))),
    }
}

/// Unique object name: upload time in milliseconds, then the original file
/// name with anything outside `[A-Za-z0-9._-]` replaced by `_`
pub fn object_name(original: &str, now_millis: i64) -> String {
    let cleaned: String = original
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = if cleaned.is_empty() { "file".to_string() } else { cleaned };
    format!("{}_{}", now_millis, cleaned)
}

// Object names produced by `object_name` never contain separators.
fn managed_name<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    let name = url.strip_prefix(base)?.strip_prefix('/')?;
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    valid.then_some(name)
}

/// Google Cloud Storage bucket with publicly readable objects
pub struct GcsObjectStore {
    client: Client,
    bucket: String,
    access_token: String,
    public_base: String,
}

impl GcsObjectStore {
    pub fn new(bucket: String, access_token: String) -> Self {
        let public_base = format!("{}/{}", GCS_API, bucket);
        Self {
            client: Client::new(),
            bucket,
            access_token,
            public_base,
        }
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn store(&self, name: &str, content_type: Option<String>, data: Bytes) -> AppResult<String> {
        let url = format!("{}/upload/storage/v1/b/{}/o", GCS_API, self.bucket);
        let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

        self.client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("uploadType", "media"),
                ("name", name),
                ("predefinedAcl", "publicRead"),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Storage(format!("Upload of {} failed: {}", name, e)))?;

        tracing::info!("Stored object {} in bucket {}", name, self.bucket);
        Ok(format!("{}/{}", self.public_base, name))
    }

    async fn delete(&self, url: &str) -> AppResult<bool> {
        let Some(name) = managed_name(url, &self.public_base) else {
            return Ok(false);
        };
        let endpoint = format!("{}/storage/v1/b/{}/o/{}", GCS_API, self.bucket, name);

        let response = self
            .client
            .delete(&endpoint)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete of {} failed: {}", name, e)))?;

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            response
                .error_for_status()
                .map_err(|e| AppError::Storage(format!("Delete of {} failed: {}", name, e)))?;
        }

        tracing::info!("Deleted object {} from bucket {}", name, self.bucket);
        Ok(true)
    }
}

/// Objects written to a local directory, served by this process
pub struct LocalObjectStore {
    dir: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(dir: PathBuf, public_base: String) -> Self {
        Self {
            dir,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn store(&self, name: &str, _content_type: Option<String>, data: Bytes) -> AppResult<String> {
        if managed_name(&format!("{}/{}", self.public_base, name), &self.public_base).is_none() {
            return Err(AppError::BadRequest(format!("Invalid object name: {}", name)));
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot create {}: {}", self.dir.display(), e)))?;
        tokio::fs::write(self.dir.join(name), &data)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot write {}: {}", name, e)))?;

        tracing::info!("Stored object {} ({} bytes)", name, data.len());
        Ok(format!("{}/{}", self.public_base, name))
    }

    async fn delete(&self, url: &str) -> AppResult<bool> {
        let Some(name) = managed_name(url, &self.public_base) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::Storage(format!("Cannot delete {}: {}", name, e))),
        }
        tracing::info!("Deleted object {}", name);
        Ok(true)
    }
}
