use crate::config::UploadPolicy;
use crate::models::{FileDescriptor, RejectReason};

/// Outcome of screening one submitted batch.
#[derive(Debug)]
pub enum BatchDecision {
    /// The whole batch was refused before inspecting any file: storing it
    /// would push the canonical list past its capacity.
    TooMany {
        submitted: usize,
        current: usize,
        max: usize,
    },
    /// Per-file screening results, submission order preserved.
    Screened {
        accepted: Vec<FileDescriptor>,
        rejected: Vec<(FileDescriptor, RejectReason)>,
    },
}

/// Screens a batch against the policy.
///
/// The capacity gate fires first and rejects the batch wholesale. After that
/// every file is judged independently: one bad file never blocks its siblings.
pub fn screen_batch(
    files: Vec<FileDescriptor>,
    current_count: usize,
    policy: &UploadPolicy,
) -> BatchDecision {
    if current_count + files.len() > policy.max_files {
        return BatchDecision::TooMany {
            submitted: files.len(),
            current: current_count,
            max: policy.max_files,
        };
    }

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        if !policy.allows_extension(&file.extension) {
            rejected.push((file, RejectReason::UnsupportedType));
        } else if file.size_bytes() > policy.max_file_size {
            rejected.push((file, RejectReason::FileTooLarge));
        } else {
            accepted.push(file);
        }
    }

    BatchDecision::Screened { accepted, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(name: &str, size: usize) -> FileDescriptor {
        FileDescriptor::new(name, Bytes::from(vec![0u8; size]))
    }

    #[test]
    fn test_capacity_gate_rejects_before_inspection() {
        let policy = UploadPolicy::default();
        let files = vec![file("a.pdf", 10), file("b.pdf", 10), file("c.pdf", 10)];

        match screen_batch(files, 3, &policy) {
            BatchDecision::TooMany {
                submitted,
                current,
                max,
            } => {
                assert_eq!(submitted, 3);
                assert_eq!(current, 3);
                assert_eq!(max, 5);
            }
            BatchDecision::Screened { .. } => panic!("batch should have been refused"),
        }
    }

    #[test]
    fn test_batch_exactly_at_capacity_is_allowed() {
        let policy = UploadPolicy::default();
        let files = vec![file("a.pdf", 10), file("b.pdf", 10)];

        match screen_batch(files, 3, &policy) {
            BatchDecision::Screened { accepted, rejected } => {
                assert_eq!(accepted.len(), 2);
                assert!(rejected.is_empty());
            }
            BatchDecision::TooMany { .. } => panic!("3 + 2 fits into 5"),
        }
    }

    #[test]
    fn test_unsupported_type_skips_only_that_file() {
        let policy = UploadPolicy::default();
        let files = vec![file("a.pdf", 10), file("evil.exe", 10), file("c.png", 10)];

        match screen_batch(files, 0, &policy) {
            BatchDecision::Screened { accepted, rejected } => {
                assert_eq!(accepted.len(), 2);
                assert_eq!(accepted[0].name, "a.pdf");
                assert_eq!(accepted[1].name, "c.png");
                assert_eq!(rejected.len(), 1);
                assert_eq!(rejected[0].0.name, "evil.exe");
                assert_eq!(rejected[0].1, RejectReason::UnsupportedType);
            }
            BatchDecision::TooMany { .. } => panic!("batch fits"),
        }
    }

    #[test]
    fn test_oversized_file_skips_only_that_file() {
        let policy = UploadPolicy {
            max_file_size: 100,
            ..UploadPolicy::default()
        };
        let files = vec![file("small.pdf", 100), file("big.pdf", 101)];

        match screen_batch(files, 0, &policy) {
            BatchDecision::Screened { accepted, rejected } => {
                assert_eq!(accepted.len(), 1);
                assert_eq!(accepted[0].name, "small.pdf");
                assert_eq!(rejected[0].1, RejectReason::FileTooLarge);
            }
            BatchDecision::TooMany { .. } => panic!("batch fits"),
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let policy = UploadPolicy::default();
        let files = vec![file("photo.JPG", 10)];

        match screen_batch(files, 0, &policy) {
            BatchDecision::Screened { accepted, .. } => assert_eq!(accepted.len(), 1),
            BatchDecision::TooMany { .. } => panic!("batch fits"),
        }
    }

    #[test]
    fn test_name_without_extension_is_rejected() {
        let policy = UploadPolicy::default();
        let files = vec![file("README", 10)];

        match screen_batch(files, 0, &policy) {
            BatchDecision::Screened { accepted, rejected } => {
                assert!(accepted.is_empty());
                assert_eq!(rejected[0].1, RejectReason::UnsupportedType);
            }
            BatchDecision::TooMany { .. } => panic!("batch fits"),
        }
    }
}
