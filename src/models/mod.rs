use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// A file as selected by the user, immutable once constructed.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    /// Lowercased substring after the last `.` in `name`. A name without a
    /// dot yields the whole lowercased name, which then fails the whitelist.
    pub extension: String,
    pub content: Bytes,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, content: Bytes) -> Self {
        let name = name.into();
        let extension = name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        Self {
            name,
            extension,
            content,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

/// Path-like identifier under which a file's bytes live in the backend:
/// `{owner}[/{context}]/{millis}-{token}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leaf file name of the key, for display purposes.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StorageKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnsupportedType,
    FileTooLarge,
}

/// Why a single file did not make it into the canonical list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected by policy before reaching the backend.
    Rejected { reason: RejectReason },
    /// Accepted but the backend refused the object.
    Transport { message: String },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadFailure {
    pub filename: String,
    pub failure: FailureKind,
}

/// Settled outcome of one batch submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResult {
    /// Keys stored by this batch, in submission order.
    pub keys: Vec<StorageKey>,
    pub failures: Vec<UploadFailure>,
    /// Set when a backend fault aborted the batch partway through. Keys that
    /// succeeded before the fault are still present in `keys`.
    pub fault: Option<String>,
}

impl BatchResult {
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            failures: Vec::new(),
            fault: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_derivation() {
        let f = FileDescriptor::new("Report.PDF", Bytes::from_static(b"x"));
        assert_eq!(f.extension, "pdf");

        let f = FileDescriptor::new("archive.tar.gz", Bytes::from_static(b"x"));
        assert_eq!(f.extension, "gz");

        // No dot: the whole name acts as the extension, as the web client did.
        let f = FileDescriptor::new("README", Bytes::from_static(b"x"));
        assert_eq!(f.extension, "readme");
    }

    #[test]
    fn test_storage_key_file_name() {
        let key = StorageKey::new("user-1/app-9/1700000000000-abc123.pdf");
        assert_eq!(key.file_name(), "1700000000000-abc123.pdf");

        let bare = StorageKey::new("no-slashes");
        assert_eq!(bare.file_name(), "no-slashes");
    }

    #[test]
    fn test_size_bytes() {
        let f = FileDescriptor::new("a.png", Bytes::from(vec![0u8; 42]));
        assert_eq!(f.size_bytes(), 42);
    }
}
