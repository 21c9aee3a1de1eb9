use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::persisted::{Persist, PersistedStore};
use crate::models::{Session, SessionSnapshot, SessionStatus, User, UserUpdate};
use crate::storage::Storage;

/// Client-side auth state. `user` and `last_activity` survive reloads, the rest
/// is rebuilt from the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            session: None,
            is_loading: true,
            is_authenticated: false,
            last_activity: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

impl Persist for AuthState {
    const NAMESPACE: &'static str = "auth-store";
    type Snapshot = AuthSnapshot;

    fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            user: self.user.clone(),
            last_activity: self.last_activity,
        }
    }

    fn restore(&mut self, snapshot: AuthSnapshot) {
        self.user = snapshot.user;
        self.last_activity = snapshot.last_activity;
    }
}

impl AuthState {
    pub fn set_user(&mut self, user: Option<User>) {
        self.is_authenticated = user.is_some();
        self.user = user;
    }

    /// Replace the session and re-derive the user from it. No session means no user.
    pub fn set_session(&mut self, session: Option<Session>, now: DateTime<Utc>) {
        self.user = session
            .as_ref()
            .map(|s| User::from_session(&s.user, self.user.as_ref(), now));
        self.is_authenticated = session.is_some();
        self.session = session;
    }

    /// Fold one provider observation into the state: loading flag, session and user together.
    pub fn apply_snapshot(&mut self, snapshot: &SessionSnapshot, now: DateTime<Utc>) {
        self.is_loading = snapshot.status == SessionStatus::Loading;
        self.set_session(snapshot.session.clone(), now);
    }

    pub fn update_user(&mut self, update: UserUpdate, now: DateTime<Utc>) {
        if let Some(user) = self.user.as_mut() {
            user.apply(update, now);
        }
    }

    pub fn logout(&mut self) {
        *self = AuthState {
            is_loading: false,
            ..AuthState::default()
        };
    }

    pub fn is_session_expired(&self, now: DateTime<Utc>) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_expired(now))
    }

    pub fn user_display_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.display_name().to_string())
            .unwrap_or_else(|| "Anonymous".to_string())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.as_str() == role)
    }
}

/// Handle to the persisted auth state; clones share the same state.
#[derive(Clone)]
pub struct AuthStore {
    inner: PersistedStore<AuthState>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: PersistedStore::new(storage),
        }
    }

    pub fn state(&self) -> AuthState {
        self.inner.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read(|s| s.user.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.read(|s| s.session.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read(|s| s.is_loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read(|s| s.is_authenticated)
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.inner.read(|s| s.last_activity)
    }

    pub fn set_user(&self, user: Option<User>) {
        self.inner.update(|s| s.set_user(user));
    }

    pub fn set_session(&self, session: Option<Session>) {
        self.inner.update(|s| s.set_session(session, Utc::now()));
    }

    pub fn apply_snapshot(&self, snapshot: &SessionSnapshot) {
        self.inner.update(|s| s.apply_snapshot(snapshot, Utc::now()));
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.update(|s| s.is_loading = loading);
    }

    pub fn update_user(&self, update: UserUpdate) {
        self.inner.update(|s| s.update_user(update, Utc::now()));
    }

    pub fn logout(&self) {
        self.inner.update(AuthState::logout);
    }

    pub fn update_last_activity(&self) {
        self.inner.update(|s| s.last_activity = Some(Utc::now()));
    }

    pub fn is_session_expired(&self) -> bool {
        self.inner.read(|s| s.is_session_expired(Utc::now()))
    }

    pub fn user_display_name(&self) -> String {
        self.inner.read(AuthState::user_display_name)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.inner.read(|s| s.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, SessionUser};
    use crate::storage::MemoryStorage;
    use chrono::Duration;

    fn session(expires: Option<DateTime<Utc>>) -> Session {
        Session {
            user: SessionUser {
                id: "u1".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                image: None,
                role: Some("admin".into()),
            },
            expires,
            access_token: Some("at".into()),
            error: None,
        }
    }

    #[test]
    fn session_change_sets_user_and_flag_together() {
        let mut state = AuthState::default();
        let now = Utc::now();
        state.apply_snapshot(&SessionSnapshot::authenticated(session(None)), now);

        assert!(!state.is_loading);
        assert!(state.is_authenticated);
        assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(state.user.as_ref().map(|u| u.role), Some(Role::Admin));

        state.apply_snapshot(&SessionSnapshot::unauthenticated(), now);
        assert!(!state.is_authenticated);
        assert_eq!(state.user, None);
        assert_eq!(state.session, None);
    }

    #[test]
    fn loading_status_sets_loading_flag() {
        let mut state = AuthState::default();
        state.is_loading = false;
        state.apply_snapshot(&SessionSnapshot::loading(), Utc::now());
        assert!(state.is_loading);
    }

    #[test]
    fn projected_user_is_stable_without_new_session_events() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.set_session(Some(session(None)));
        let projected = store.user();

        store.set_loading(false);
        store.update_last_activity();
        assert_eq!(store.user(), projected);
    }

    #[test]
    fn update_user_is_noop_without_user() {
        let mut state = AuthState::default();
        state.update_user(
            UserUpdate {
                name: Some("x".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(state.user, None);
    }

    #[test]
    fn logout_clears_everything() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.set_session(Some(session(None)));
        store.update_last_activity();
        store.logout();

        let state = store.state();
        assert_eq!(state.user, None);
        assert_eq!(state.session, None);
        assert!(!state.is_loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.last_activity, None);
    }

    #[test]
    fn computed_values() {
        let now = Utc::now();
        let mut state = AuthState::default();
        assert!(!state.is_session_expired(now));
        assert_eq!(state.user_display_name(), "Anonymous");
        assert!(!state.has_role("admin"));

        state.set_session(Some(session(Some(now - Duration::seconds(1)))), now);
        assert!(state.is_session_expired(now));
        assert_eq!(state.user_display_name(), "Ada");
        assert!(state.has_role("admin"));
        assert!(!state.has_role("user"));
    }

    #[test]
    fn persists_user_and_activity_but_not_session_or_loading() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(storage.clone());
        store.set_session(Some(session(None)));
        store.set_loading(false);
        store.update_last_activity();

        let reloaded = AuthStore::new(storage);
        let state = reloaded.state();
        assert_eq!(state.user, store.user());
        assert_eq!(state.last_activity, store.last_activity());
        assert_eq!(state.session, None);
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
    }
}
