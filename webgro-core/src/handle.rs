use std::collections::HashMap;

/// Store mapping opaque u64 handles to values. Handles are never reused
/// within one store, so a stale handle simply misses.
pub struct HandleStore<T> {
    items: HashMap<u64, T>,
    next: u64,
}

impl<T> HandleStore<T> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            next: 1,
        }
    }

    /// Insert an item and return its opaque handle.
    pub fn insert(&mut self, item: T) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.items.insert(handle, item);
        handle
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        self.items.get(&handle)
    }

    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        self.items.get_mut(&handle)
    }

    pub fn remove(&mut self, handle: u64) -> Option<T> {
        self.items.remove(&handle)
    }

    /// Remove every item, returning them in no particular order.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain().map(|(_, item)| item).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for HandleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut store = HandleStore::new();
        let a = store.insert("a");
        let b = store.insert("b");
        assert_ne!(a, b);
        assert_eq!(store.get(a), Some(&"a"));
        assert_eq!(store.remove(a), Some("a"));
        assert_eq!(store.get(a), None);
        let c = store.insert("c");
        assert_ne!(c, a);
    }

    #[test]
    fn test_drain_empties_store() {
        let mut store = HandleStore::new();
        let h = store.insert(7);
        assert_eq!(store.get_mut(h).map(|v| *v += 1), Some(()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.drain(), vec![8]);
        assert!(store.is_empty());
    }
}
