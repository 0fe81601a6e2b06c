//! Photo upload service

use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;

use super::objects::{object_name, ObjectStore};
use crate::{
    error::{AppError, AppResult},
    models::caller::Caller,
};

#[derive(Clone)]
pub struct UploadsService {
    objects: Arc<dyn ObjectStore>,
    max_bytes: usize,
}

impl UploadsService {
    pub fn new(objects: Arc<dyn ObjectStore>, max_bytes: usize) -> Self {
        Self { objects, max_bytes }
    }

    /// Store an uploaded file and return its public URL
    pub async fn upload(
        &self,
        caller: &Caller,
        file_name: &str,
        content_type: Option<String>,
        data: Bytes,
    ) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "Uploaded file exceeds {} bytes",
                self.max_bytes
            )));
        }

        let name = object_name(file_name, Utc::now().timestamp_millis());
        let url = self.objects.store(&name, content_type, data).await?;
        tracing::info!("Caller {} uploaded {}", caller.id, url);
        Ok(url)
    }
}
