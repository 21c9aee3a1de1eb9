use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use super::persisted::{Persist, PersistedStore};
use crate::models::{Modal, NewModal, Theme};
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub theme: Theme,
    pub sidebar_open: bool,
    pub header_fixed: bool,
    pub global_loading: bool,
    pub page_loading: bool,
    pub form_submitting: bool,
    /// Open modals, most recently opened last.
    pub modals: Vec<Modal>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            sidebar_open: false,
            header_fixed: true,
            global_loading: false,
            page_loading: false,
            form_submitting: false,
            modals: Vec::new(),
        }
    }
}

fn default_header_fixed() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sidebar_open: bool,
    #[serde(default = "default_header_fixed")]
    pub header_fixed: bool,
}

impl Persist for UiState {
    const NAMESPACE: &'static str = "ui-store";
    type Snapshot = UiSnapshot;

    fn snapshot(&self) -> UiSnapshot {
        UiSnapshot {
            theme: self.theme,
            sidebar_open: self.sidebar_open,
            header_fixed: self.header_fixed,
        }
    }

    fn restore(&mut self, snapshot: UiSnapshot) {
        self.theme = snapshot.theme;
        self.sidebar_open = snapshot.sidebar_open;
        self.header_fixed = snapshot.header_fixed;
    }
}

/// Handle to the persisted UI state; clones share the same state.
#[derive(Clone)]
pub struct UiStore {
    inner: PersistedStore<UiState>,
}

impl UiStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: PersistedStore::new(storage),
        }
    }

    pub fn state(&self) -> UiState {
        self.inner.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.inner.subscribe()
    }

    pub fn theme(&self) -> Theme {
        self.inner.read(|s| s.theme)
    }

    pub fn set_theme(&self, theme: Theme) {
        self.inner.update(|s| s.theme = theme);
    }

    pub fn toggle_sidebar(&self) {
        self.inner.update(|s| s.sidebar_open = !s.sidebar_open);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.inner.update(|s| s.sidebar_open = open);
    }

    pub fn set_header_fixed(&self, fixed: bool) {
        self.inner.update(|s| s.header_fixed = fixed);
    }

    pub fn set_global_loading(&self, loading: bool) {
        self.inner.update(|s| s.global_loading = loading);
    }

    pub fn set_page_loading(&self, loading: bool) {
        self.inner.update(|s| s.page_loading = loading);
    }

    pub fn set_form_submitting(&self, submitting: bool) {
        self.inner.update(|s| s.form_submitting = submitting);
    }

    /// Push a modal on top of the stack and return its id.
    pub fn open_modal(&self, modal: NewModal) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.update(|s| {
            s.modals.push(Modal {
                id,
                title: modal.title,
                size: modal.size,
                closeable: modal.closeable,
            })
        });
        id
    }

    pub fn close_modal(&self, id: Uuid) {
        self.inner.update(|s| s.modals.retain(|m| m.id != id));
    }

    pub fn close_all_modals(&self) {
        self.inner.update(|s| s.modals.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModalSize;
    use crate::storage::MemoryStorage;

    #[test]
    fn defaults() {
        let state = UiState::default();
        assert_eq!(state.theme, Theme::System);
        assert!(!state.sidebar_open);
        assert!(state.header_fixed);
        assert!(state.modals.is_empty());
    }

    #[test]
    fn theme_survives_reload_but_loading_flags_do_not() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let ui = UiStore::new(storage.clone());
        ui.set_theme(Theme::Dark);
        ui.toggle_sidebar();
        ui.set_global_loading(true);
        ui.set_form_submitting(true);
        ui.open_modal(NewModal::new("Confirm"));

        let reloaded = UiStore::new(storage.clone());
        let state = reloaded.state();
        assert_eq!(state.theme, Theme::Dark);
        assert!(state.sidebar_open);
        assert!(!state.global_loading);
        assert!(!state.form_submitting);
        assert!(state.modals.is_empty());

        let raw = storage.get_item("ui-store").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["theme"], "dark");
        assert_eq!(value["state"]["headerFixed"], true);
        assert_eq!(value["version"], 0);
    }

    #[test]
    fn partial_snapshot_keeps_defaults() {
        let storage = MemoryStorage::new();
        storage
            .set_item("ui-store", r#"{"state":{"theme":"light"},"version":0}"#)
            .unwrap();
        let state = UiStore::new(Arc::new(storage)).state();
        assert_eq!(state.theme, Theme::Light);
        assert!(state.header_fixed);
    }

    #[test]
    fn modal_stack() {
        let ui = UiStore::new(Arc::new(MemoryStorage::new()));
        let first = ui.open_modal(NewModal::new("First"));
        let second = ui.open_modal(NewModal::new("Second").size(ModalSize::Lg).closeable(false));
        assert_ne!(first, second);

        let modals = ui.state().modals;
        assert_eq!(modals.len(), 2);
        assert_eq!(modals[1].size, ModalSize::Lg);
        assert!(!modals[1].closeable);

        ui.close_modal(first);
        assert_eq!(ui.state().modals.len(), 1);
        ui.close_modal(first);
        assert_eq!(ui.state().modals[0].id, second);

        ui.close_all_modals();
        assert!(ui.state().modals.is_empty());
    }
}
