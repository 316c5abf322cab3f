use std::env;

/// Per-file size cap: 10 MiB. Deliberately not configurable.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Extensions accepted by default (documents and images).
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Upload acceptance policy
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum number of stored files per canonical list (default: 5)
    pub max_files: usize,

    /// Lowercased extensions accepted for upload, without the leading dot
    pub allowed_extensions: Vec<String>,

    /// Maximum size of a single file in bytes (fixed at 10 MiB)
    pub max_file_size: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: 5,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl UploadPolicy {
    /// Load policy from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_files: env::var("MAX_FILES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_files),

            allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                .map(|v| {
                    v.split(',')
                        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                        .filter(|e| !e.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_extensions),

            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }
}
