//! Client-side state: the auth and UI stores, their persistence, the
//! notification queue and the glue that keeps them in sync with the session.

pub mod auth_store;
pub mod context;
pub mod notifications;
pub mod persisted;
pub mod session_provider;
pub mod sync;
pub mod ui_store;

pub use auth_store::{AuthState, AuthStore};
pub use context::{AppContext, FormOutcome};
pub use notifications::NotificationQueue;
pub use persisted::{Persist, PersistedStore};
pub use session_provider::SessionProvider;
pub use sync::AuthSynchronizer;
pub use ui_store::{UiState, UiStore};
