use std::sync::Arc;

use tracing::{error, info};

use super::{file_storage::FileStorage, memory_storage::MemoryStorage, no_storage::NoStorage};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// Durable key/value storage for serialized client state, one value per namespace key.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn is_enabled(&self) -> bool {
        true
    }
}

/// The storage selected by the config: `NoStorage` when disabled, otherwise the
/// configured backend. A file backend that cannot be opened degrades to memory.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn Storage> {
    if !config.enabled {
        info!("Client storage is disabled. Using NoStorage.");
        return Arc::new(NoStorage::new());
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => match FileStorage::new(&file_config.path) {
            Ok(storage) => {
                info!("Using file storage at '{}'", file_config.path.display());
                Arc::new(storage)
            }
            Err(e) => {
                error!(
                    "Failed to open file storage at '{}', falling back to memory: {}",
                    file_config.path.display(),
                    e
                );
                Arc::new(MemoryStorage::new())
            }
        },
        Some(StorageBackend::Memory) | None => {
            info!("Using in-memory client storage.");
            Arc::new(MemoryStorage::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileStorageConfig;

    #[test]
    fn disabled_config_gives_no_storage() {
        let storage = create_storage(&StorageConfig {
            enabled: false,
            backend: Some(StorageBackend::Memory),
        });
        assert!(!storage.is_enabled());
    }

    #[test]
    fn unusable_file_path_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let storage = create_storage(&StorageConfig {
            enabled: true,
            backend: Some(StorageBackend::File(FileStorageConfig { path: blocker })),
        });
        assert!(storage.is_enabled());
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
    }
}
