//! Object-store client for referral images.
//!
//! Talks to a Supabase-compatible storage REST API: buckets are listed to
//! verify configuration, objects are uploaded under a caller-chosen key,
//! and public URLs are derived from the base URL. The bucket must already
//! exist; creating it needs elevated privileges this service does not
//! hold, so a missing bucket is reported instead of repaired.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use serde::Deserialize;

use crate::error::AppError;

/// Seconds of client-side caching requested for uploaded objects.
const CACHE_DIRECTIVE: &str = "3600";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether `bucket` is among the buckets the backend knows about.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, AppError>;

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), AppError>;

    fn public_url(&self, bucket: &str, key: &str) -> String;
}

pub struct HttpObjectStore {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct BucketInfo {
    name: String,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, service_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("HTTP client misconfigured!");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            client,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, AppError> {
        let buckets: Vec<BucketInfo> = self
            .client
            .get(format!("{}/bucket", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::Internal(Box::new(e)))?
            .json()
            .await
            .map_err(|e| AppError::Internal(Box::new(e)))?;

        Ok(buckets.iter().any(|b| b.name == bucket))
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/object/{bucket}/{key}", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, CACHE_DIRECTIVE)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::UploadFailed(format!("{status}: {detail}")));
        }

        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/object/public/{bucket}/{key}", self.base_url)
    }
}
