use crate::models::StorageKey;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend refused a single object. Siblings in the same batch may
    /// still succeed.
    #[error("backend refused object {key}: {message}")]
    Object { key: String, message: String },

    /// The backend (or the path to it) is broken. Continuing a batch after
    /// this is pointless.
    #[error("storage backend unavailable: {0}")]
    Backend(String),
}

/// Object storage capability the orchestrator depends on.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn upload(&self, key: &StorageKey, content: Bytes) -> Result<(), StorageError>;
    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError>;
    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError>;
}

/// S3-compatible backend (AWS S3, MinIO).
pub struct S3StorageBackend {
    client: Client,
    bucket: String,
}

impl S3StorageBackend {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

/// A service-level error means the store answered and refused this object;
/// anything else (construction, dispatch, timeout) means the store itself is
/// unreachable and the batch should stop.
fn classify<E, R>(key: &StorageKey, err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(ctx) => StorageError::Object {
            key: key.to_string(),
            message: ctx.err().to_string(),
        },
        other => StorageError::Backend(other.to_string()),
    }
}

#[async_trait]
impl StorageBackend for S3StorageBackend {
    async fn upload(&self, key: &StorageKey, content: Bytes) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| classify(key, e))?;
        Ok(())
    }

    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError> {
        for key in keys {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key.as_str())
                .send()
                .await
                .map_err(|e| classify(key, e))?;
        }
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::Backend(service_error.to_string()))
                }
            }
        }
    }
}

/// HashMap-backed store for local development and tests. Mirrors S3 delete
/// semantics: removing an absent key is not an error.
#[derive(Default)]
pub struct MemoryStorageBackend {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key.as_str())
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn upload(&self, key: &StorageKey, content: Bytes) -> Result<(), StorageError> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), content);
        Ok(())
    }

    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            objects.remove(key.as_str());
        }
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError> {
        Ok(self.contains(key))
    }
}
