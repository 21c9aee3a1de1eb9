//! Shared application state.

use crate::auth::Auth;
use crate::config::ConfigV1;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Sign-in and session reconciliation against the credential backend.
    pub auth: Arc<Auth>,
}
