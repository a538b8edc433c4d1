//! Handle table mapping opaque identifiers to kernel-owned objects

use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use super::{CadError, CadResult, Shape};

/// Storage for kernel objects keyed by handle identifier
///
/// The lock is only held while an entry is inserted, cloned out or removed,
/// never while the kernel works on the object.
pub struct HandleRegistry<T> {
    entries: Mutex<HashMap<Uuid, T>>,
}

impl<T: Clone> HandleRegistry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store an object and mint the handle that owns it
    pub fn insert(&self, value: T) -> Shape {
        let id = Uuid::new_v4();
        self.entries.lock().insert(id, value);
        Shape::new(id)
    }

    /// Clone the object behind a handle
    pub fn get(&self, shape: &Shape) -> CadResult<T> {
        self.entries
            .lock()
            .get(&shape.id())
            .cloned()
            .ok_or(CadError::UnknownHandle(shape.id()))
    }

    /// Remove the object behind a handle, consuming the handle
    pub fn remove(&self, shape: Shape) -> Option<T> {
        self.entries.lock().remove(&shape.id())
    }

    /// Whether a handle resolves to a live object
    pub fn contains(&self, shape: &Shape) -> bool {
        self.entries.lock().contains_key(&shape.id())
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T: Clone> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let registry = HandleRegistry::new();
        let shape = registry.insert(42u32);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&shape));
        assert_eq!(registry.get(&shape).unwrap(), 42);

        assert_eq!(registry.remove(shape), Some(42));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_handle() {
        let registry: HandleRegistry<u32> = HandleRegistry::new();
        let stray = Shape::new(Uuid::new_v4());
        let id = stray.id();

        assert!(matches!(registry.get(&stray), Err(CadError::UnknownHandle(u)) if u == id));
        assert_eq!(registry.remove(stray), None);
    }

    #[test]
    fn test_handles_are_distinct() {
        let registry = HandleRegistry::new();
        let a = registry.insert("a");
        let b = registry.insert("a");

        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);
        registry.remove(a);
        assert!(registry.contains(&b));
    }
}
