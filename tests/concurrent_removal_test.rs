use async_trait::async_trait;
use attachment_backend::config::UploadPolicy;
use attachment_backend::models::{FileDescriptor, StorageKey};
use attachment_backend::services::notifier::TracingNotifier;
use attachment_backend::services::storage::{MemoryStorageBackend, StorageBackend, StorageError};
use attachment_backend::services::uploader::BatchUploader;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Backend that parks every upload until the test hands out a permit.
struct GatedBackend {
    gate: Semaphore,
    inner: MemoryStorageBackend,
}

#[async_trait]
impl StorageBackend for GatedBackend {
    async fn upload(&self, key: &StorageKey, content: Bytes) -> Result<(), StorageError> {
        self.gate
            .acquire()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .forget();
        self.inner.upload(key, content).await
    }

    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError> {
        self.inner.remove(keys).await
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }
}

/// Removals are not gated by the busy flag, so one can land in the middle of
/// a running batch. This pins down the current behavior: both operations
/// apply, with the removal visible before the batch merge.
#[tokio::test]
async fn test_removal_interleaves_with_inflight_batch() {
    let backend = Arc::new(GatedBackend {
        gate: Semaphore::new(0),
        inner: MemoryStorageBackend::new(),
    });
    let seed = StorageKey::new("user-1/000-seed.pdf");
    let uploader = Arc::new(BatchUploader::new(
        backend.clone(),
        Arc::new(TracingNotifier),
        UploadPolicy::default(),
        "user-1",
        None,
        vec![seed.clone()],
    ));

    let batch = vec![
        FileDescriptor::new("a.pdf", Bytes::from_static(b"a")),
        FileDescriptor::new("b.pdf", Bytes::from_static(b"b")),
    ];

    let submit = {
        let uploader = uploader.clone();
        tokio::spawn(async move { uploader.submit_batch(batch).await })
    };

    // Wait for the batch to claim the busy flag and park on the first upload.
    while !uploader.is_uploading() {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // The removal is accepted even though a batch is in flight.
    let removed = uploader.remove(&seed).await.unwrap();
    assert!(removed);
    assert!(uploader.is_uploading());
    assert_eq!(uploader.stored_count(), 0);

    // Let the batch finish and merge.
    backend.gate.add_permits(2);
    let result = submit.await.unwrap().unwrap();

    assert_eq!(result.keys.len(), 2);
    assert!(!uploader.is_uploading());

    let stored = uploader.stored_keys();
    assert_eq!(stored, result.keys);
    assert!(!stored.contains(&seed));
}
