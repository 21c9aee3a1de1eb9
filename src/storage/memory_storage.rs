use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::Storage;
use crate::error::StorageError;

/// In-process storage. Clones share the same map, so every store built from
/// one handle sees the others' keys.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_items() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set_item("ui-store", "{}").unwrap();
        assert_eq!(b.get_item("ui-store").unwrap().as_deref(), Some("{}"));
        b.remove_item("ui-store").unwrap();
        assert_eq!(a.get_item("ui-store").unwrap(), None);
    }
}
