use crate::models::StorageKey;

/// Invoked with the full canonical list after every successful mutation.
pub type ChangeListener = Box<dyn Fn(&[StorageKey]) + Send + Sync>;

/// The authoritative, order-preserving record of currently stored keys.
///
/// Seeded once at construction, mutated only through [`merge`](Self::merge)
/// and [`remove`](Self::remove), each of which fires the change listener
/// exactly once. Persistence is the consumer's job.
pub struct CanonicalList {
    keys: Vec<StorageKey>,
    listener: Option<ChangeListener>,
}

impl CanonicalList {
    pub fn new(initial: Vec<StorageKey>) -> Self {
        Self {
            keys: initial,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: ChangeListener) {
        self.listener = Some(listener);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.keys.contains(key)
    }

    pub fn snapshot(&self) -> Vec<StorageKey> {
        self.keys.clone()
    }

    /// Appends `keys` in order after the existing entries and fires the
    /// listener once. Callers only invoke this with a non-empty batch.
    pub fn merge(&mut self, keys: Vec<StorageKey>) {
        debug_assert!(!keys.is_empty());
        self.keys.extend(keys);
        self.emit();
    }

    /// Removes the first matching key, then fires the listener once. The
    /// listener also fires when the key was absent, matching the original
    /// behavior of filtering the list after a confirmed backend delete.
    pub fn remove(&mut self, key: &StorageKey) -> bool {
        let removed = match self.keys.iter().position(|k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        };
        self.emit();
        removed
    }

    fn emit(&self) {
        if let Some(listener) = &self.listener {
            listener(&self.keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(s: &str) -> StorageKey {
        StorageKey::new(s)
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut list = CanonicalList::new(vec![key("a"), key("b")]);
        list.merge(vec![key("c"), key("d")]);

        assert_eq!(
            list.snapshot(),
            vec![key("a"), key("b"), key("c"), key("d")]
        );
    }

    #[test]
    fn test_merge_fires_listener_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_len = Arc::new(AtomicUsize::new(0));

        let mut list = CanonicalList::new(vec![key("a")]);
        let (calls_c, seen_c) = (calls.clone(), seen_len.clone());
        list.set_listener(Box::new(move |keys| {
            calls_c.fetch_add(1, Ordering::SeqCst);
            seen_c.store(keys.len(), Ordering::SeqCst);
        }));

        list.merge(vec![key("b"), key("c")]);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen_len.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_remove_drops_first_match_only() {
        let mut list = CanonicalList::new(vec![key("a"), key("b"), key("c")]);

        assert!(list.remove(&key("b")));
        assert_eq!(list.snapshot(), vec![key("a"), key("c")]);
        assert!(!list.contains(&key("b")));
    }

    #[test]
    fn test_remove_absent_key_returns_false() {
        let mut list = CanonicalList::new(vec![key("a")]);
        assert!(!list.remove(&key("zz")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_construction_does_not_fire_listener() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_c = calls.clone();

        let mut list = CanonicalList::new(vec![key("a")]);
        list.set_listener(Box::new(move |_| {
            calls_c.fetch_add(1, Ordering::SeqCst);
        }));
        drop(list);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
