use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::storage::Storage;

/// Version written alongside every persisted snapshot.
pub const SNAPSHOT_VERSION: u32 = 0;

/// State that can be partially persisted. Only what `snapshot` returns is written;
/// everything else starts from `Default` on every load.
pub trait Persist: Default + Clone + Send + Sync + 'static {
    /// Storage key of this state's namespace.
    const NAMESPACE: &'static str;
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Snapshot;
    fn restore(&mut self, snapshot: Self::Snapshot);
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// A reactive state container seeded from storage once and written back after
/// every mutation.
///
/// Mutations run as a single closure under the channel's lock, so readers and
/// subscribers only ever see whole updates.
pub struct PersistedStore<S: Persist> {
    state: Arc<watch::Sender<S>>,
    storage: Arc<dyn Storage>,
}

impl<S: Persist> Clone for PersistedStore<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            storage: self.storage.clone(),
        }
    }
}

impl<S: Persist> PersistedStore<S> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let initial = load::<S>(storage.as_ref());
        let (tx, _rx) = watch::channel(initial);
        Self {
            state: Arc::new(tx),
            storage,
        }
    }

    /// A copy of the whole current state.
    pub fn get(&self) -> S {
        self.state.borrow().clone()
    }

    /// Read part of the state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.state.send_modify(f);
        self.save();
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    fn save(&self) {
        if !self.storage.is_enabled() {
            return;
        }
        let envelope = Envelope {
            state: self.read(|s| s.snapshot()),
            version: SNAPSHOT_VERSION,
        };
        let serialized = match serde_json::to_string(&envelope) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize '{}' state: {}", S::NAMESPACE, e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(S::NAMESPACE, &serialized) {
            warn!("Failed to persist '{}' state: {}", S::NAMESPACE, e);
        }
    }
}

/// Seed a state from storage. Missing, unreadable or corrupt data yields the default.
fn load<S: Persist>(storage: &dyn Storage) -> S {
    let mut state = S::default();
    let raw = match storage.get_item(S::NAMESPACE) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No persisted '{}' state, starting from defaults", S::NAMESPACE);
            return state;
        }
        Err(e) => {
            warn!("Failed to read persisted '{}' state: {}", S::NAMESPACE, e);
            return state;
        }
    };

    match serde_json::from_str::<Envelope<S::Snapshot>>(&raw) {
        Ok(envelope) => {
            if envelope.version != SNAPSHOT_VERSION {
                debug!(
                    "Persisted '{}' state has version {}, expected {}",
                    S::NAMESPACE,
                    envelope.version,
                    SNAPSHOT_VERSION
                );
            }
            state.restore(envelope.state);
        }
        Err(e) => warn!(
            "Ignoring corrupt persisted '{}' state: {}",
            S::NAMESPACE,
            e
        ),
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, NoStorage};

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Counter {
        kept: u32,
        transient: u32,
    }

    impl Persist for Counter {
        const NAMESPACE: &'static str = "counter";
        type Snapshot = u32;

        fn snapshot(&self) -> u32 {
            self.kept
        }

        fn restore(&mut self, snapshot: u32) {
            self.kept = snapshot;
        }
    }

    #[test]
    fn writes_envelope_on_update() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::<Counter>::new(Arc::new(storage.clone()));
        store.update(|c| c.kept = 3);
        assert_eq!(
            storage.get_item("counter").unwrap().as_deref(),
            Some(r#"{"state":3,"version":0}"#)
        );
    }

    #[test]
    fn reload_restores_only_snapshot() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = PersistedStore::<Counter>::new(storage.clone());
        store.update(|c| {
            c.kept = 7;
            c.transient = 9;
        });

        let reloaded = PersistedStore::<Counter>::new(storage);
        assert_eq!(reloaded.get(), Counter { kept: 7, transient: 0 });
    }

    #[test]
    fn corrupt_data_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.set_item("counter", "{not json").unwrap();
        let store = PersistedStore::<Counter>::new(Arc::new(storage));
        assert_eq!(store.get(), Counter::default());
    }

    #[test]
    fn disabled_storage_still_updates_state() {
        let store = PersistedStore::<Counter>::new(Arc::new(NoStorage::new()));
        store.update(|c| c.kept = 1);
        assert_eq!(store.read(|c| c.kept), 1);
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let store = PersistedStore::<Counter>::new(Arc::new(MemoryStorage::new()));
        let mut rx = store.subscribe();
        store.update(|c| c.kept = 2);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().kept, 2);
    }
}
