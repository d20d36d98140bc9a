// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::storage::object_ref::ObjectRef;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The reference string itself is malformed. Client error.
    #[error("Invalid object reference: {0}")]
    InvalidReference(String),
    /// The backend answered, and the object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),
    /// The backend could not be reached or failed to answer
    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Read-only object fetch seam.
///
/// Production uses [`HttpObjectStore`] against the configured portal;
/// tests use [`MockObjectStore`] with pre-seeded blobs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, StorageError>;
}

/// Fetches objects over HTTP from a gateway that exposes buckets as
/// `{portal_url}/{bucket}/{path}`
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    portal_url: String,
}

impl HttpObjectStore {
    pub fn new(portal_url: &str) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            portal_url: portal_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, StorageError> {
        let url = format!("{}/{}/{}", self.portal_url, object.bucket, object.path);
        debug!("Fetching object {} from {}", object, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(object.to_string()));
        }
        if !response.status().is_success() {
            return Err(StorageError::BackendUnavailable(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

/// In-memory backend for tests. Blobs are keyed by `bucket/path`; a single
/// error can be injected and is consumed by the next fetch.
#[derive(Debug, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    injected_error: Arc<Mutex<Option<StorageError>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, bucket: &str, path: &str, data: Vec<u8>) {
        let mut objects = self.objects.lock().await;
        objects.insert(format!("{}/{}", bucket, path), data);
    }

    pub async fn inject_error(&self, error: StorageError) {
        let mut slot = self.injected_error.lock().await;
        *slot = Some(error);
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, StorageError> {
        if let Some(error) = self.injected_error.lock().await.take() {
            return Err(error);
        }

        let objects = self.objects.lock().await;
        objects
            .get(&format!("{}/{}", object.bucket, object.path))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(object.to_string()))
    }
}
