use tokio::sync::watch;
use tracing::{debug, info};

use super::auth_store::AuthStore;
use crate::models::SessionSnapshot;

/// Keeps the auth store in step with the session provider.
pub struct AuthSynchronizer {
    store: AuthStore,
}

impl AuthSynchronizer {
    pub fn new(store: AuthStore) -> Self {
        Self { store }
    }

    /// Apply one provider observation as a single store update.
    pub fn apply(&self, snapshot: &SessionSnapshot) {
        debug!(
            "Session status {:?}, user {:?}",
            snapshot.status,
            snapshot.session.as_ref().map(|s| s.user.id.as_str())
        );
        self.store.apply_snapshot(snapshot);
    }

    /// Apply the current snapshot and then every change until the provider goes away.
    pub async fn run(self, mut sessions: watch::Receiver<SessionSnapshot>) {
        loop {
            let snapshot = sessions.borrow_and_update().clone();
            self.apply(&snapshot);
            if sessions.changed().await.is_err() {
                break;
            }
        }
        info!("Session provider closed, auth synchronizer stopped");
    }
}
