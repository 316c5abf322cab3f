use crate::models::{FileDescriptor, StorageKey};
use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derives the storage key for an accepted file:
/// `{owner}[/{context}]/{millis}-{token}.{ext}`.
///
/// The generated leaf never contains the original file name, so nothing
/// user-controlled (or path-unsafe) leaks into the storage path. The random
/// token keeps keys distinct even for identical names uploaded in the same
/// millisecond; the extension is retained so consumers can infer the content
/// type.
pub fn derive_key(file: &FileDescriptor, owner_id: &str, context_id: Option<&str>) -> StorageKey {
    let leaf = format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        random_token(),
        file.extension
    );

    let key = match context_id {
        Some(context) => format!("{owner_id}/{context}/{leaf}"),
        None => format!("{owner_id}/{leaf}"),
    };

    StorageKey::new(key)
}

/// Random `u64` rendered in base 36 (lowercase alphanumerics).
fn random_token() -> String {
    let mut n: u64 = rand::thread_rng().r#gen();
    let mut out = String::new();
    loop {
        out.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.chars().rev().collect()
}
