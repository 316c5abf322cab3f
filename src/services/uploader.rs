use crate::config::UploadPolicy;
use crate::models::{BatchResult, FailureKind, FileDescriptor, RejectReason, StorageKey, UploadFailure};
use crate::services::keys;
use crate::services::notifier::{Notifier, Severity};
use crate::services::reconciler::{CanonicalList, ChangeListener};
use crate::services::storage::{StorageBackend, StorageError};
use crate::utils::validation::{BatchDecision, screen_batch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// A batch is already in flight on this uploader.
    #[error("an upload batch is already in progress")]
    Busy,

    /// Accepting the batch would push the canonical list past `max_files`.
    /// Nothing was processed.
    #[error("maximum {max} files allowed ({current} stored, {submitted} submitted)")]
    TooManyFiles {
        submitted: usize,
        current: usize,
        max: usize,
    },
}

/// Batch upload orchestrator: screens a batch, derives keys, uploads the
/// accepted files one at a time and reconciles the canonical list of stored
/// keys. One instance owns one canonical list for its lifetime.
pub struct BatchUploader {
    backend: Arc<dyn StorageBackend>,
    notifier: Arc<dyn Notifier>,
    policy: UploadPolicy,
    owner_id: String,
    context_id: Option<String>,
    list: Mutex<CanonicalList>,
    uploading: AtomicBool,
}

/// Clears the busy flag on every exit path out of `submit_batch`.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BatchUploader {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        notifier: Arc<dyn Notifier>,
        policy: UploadPolicy,
        owner_id: impl Into<String>,
        context_id: Option<String>,
        initial_keys: Vec<StorageKey>,
    ) -> Self {
        Self {
            backend,
            notifier,
            policy,
            owner_id: owner_id.into(),
            context_id,
            list: Mutex::new(CanonicalList::new(initial_keys)),
            uploading: AtomicBool::new(false),
        }
    }

    /// Registers the consumer callback fired after every successful merge or
    /// removal with the full canonical list.
    pub fn set_listener(&self, listener: ChangeListener) {
        self.lock_list().set_listener(listener);
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::Acquire)
    }

    /// Snapshot of the canonical list, in storage order.
    pub fn stored_keys(&self) -> Vec<StorageKey> {
        self.lock_list().snapshot()
    }

    pub fn stored_count(&self) -> usize {
        self.lock_list().len()
    }

    /// Submits one batch. Accepted files go to the backend strictly one at a
    /// time, in submission order; a per-file failure never blocks its
    /// siblings. Keys stored by this batch are merged into the canonical
    /// list before returning, and the listener fires once if anything was
    /// merged.
    pub async fn submit_batch(
        &self,
        files: Vec<FileDescriptor>,
    ) -> Result<BatchResult, UploadError> {
        if files.is_empty() {
            return Ok(BatchResult::empty());
        }

        if self
            .uploading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(UploadError::Busy);
        }
        let _busy = BusyGuard(&self.uploading);

        let current = self.lock_list().len();
        let (accepted, rejected) = match screen_batch(files, current, &self.policy) {
            BatchDecision::TooMany {
                submitted,
                current,
                max,
            } => {
                self.notifier.notify(
                    "Too many files",
                    &format!("Maximum {max} files allowed"),
                    Severity::Error,
                );
                return Err(UploadError::TooManyFiles {
                    submitted,
                    current,
                    max,
                });
            }
            BatchDecision::Screened { accepted, rejected } => (accepted, rejected),
        };

        let mut result = BatchResult::empty();

        for (file, reason) in rejected {
            self.notify_rejection(&file, reason);
            result.failures.push(UploadFailure {
                filename: file.name,
                failure: FailureKind::Rejected { reason },
            });
        }

        // One object in flight at a time: file i settles before i+1 starts.
        for file in accepted {
            let key = keys::derive_key(&file, &self.owner_id, self.context_id.as_deref());
            match self.backend.upload(&key, file.content.clone()).await {
                Ok(()) => result.keys.push(key),
                Err(StorageError::Object { message, .. }) => {
                    tracing::error!("Upload error for {}: {}", file.name, message);
                    self.notifier.notify(
                        "Upload failed",
                        &format!("Failed to upload {}", file.name),
                        Severity::Error,
                    );
                    result.failures.push(UploadFailure {
                        filename: file.name,
                        failure: FailureKind::Transport { message },
                    });
                }
                Err(StorageError::Backend(message)) => {
                    // Keys stored before the fault stay stored and still get
                    // merged below; there is no rollback.
                    tracing::error!("Batch aborted, backend unavailable: {}", message);
                    self.notifier.notify(
                        "Upload failed",
                        "An unexpected error occurred",
                        Severity::Error,
                    );
                    result.fault = Some(message);
                    break;
                }
            }
        }

        if !result.keys.is_empty() {
            self.lock_list().merge(result.keys.clone());
            self.notifier.notify(
                "Upload successful",
                &format!("{} file(s) uploaded successfully", result.keys.len()),
                Severity::Info,
            );
        }

        Ok(result)
    }

    /// Deletes one stored key: backend first, list second. On backend failure
    /// the canonical list is untouched and the listener does not fire.
    /// Returns whether the key was actually present in the list.
    ///
    /// Deliberately not gated by the busy flag, so a removal can interleave
    /// with an in-flight batch. The original behaves the same way; see the
    /// concurrent removal integration test.
    pub async fn remove(&self, key: &StorageKey) -> Result<bool, StorageError> {
        if let Err(e) = self.backend.remove(std::slice::from_ref(key)).await {
            tracing::error!("Delete error for {}: {}", key, e);
            self.notifier
                .notify("Delete failed", "Failed to delete file", Severity::Error);
            return Err(e);
        }

        let removed = self.lock_list().remove(key);
        self.notifier
            .notify("File deleted", "File removed successfully", Severity::Info);
        Ok(removed)
    }

    fn notify_rejection(&self, file: &FileDescriptor, reason: RejectReason) {
        match reason {
            RejectReason::UnsupportedType => self.notifier.notify(
                "Invalid file type",
                &format!(
                    "File {} is not supported. Allowed types: {}",
                    file.name,
                    self.policy.allowed_extensions.join(", ")
                ),
                Severity::Error,
            ),
            RejectReason::FileTooLarge => self.notifier.notify(
                "File too large",
                &format!(
                    "File {} exceeds {}MB limit",
                    file.name,
                    self.policy.max_file_size / 1024 / 1024
                ),
                Severity::Error,
            ),
        }
    }

    fn lock_list(&self) -> MutexGuard<'_, CanonicalList> {
        self.list.lock().unwrap_or_else(|e| e.into_inner())
    }
}
