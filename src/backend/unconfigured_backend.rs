use async_trait::async_trait;
use tracing::error;

use super::base::{CredentialBackend, LoginResponse, RefreshResponse};
use crate::error::AuthError;

const MISSING_URL: &str = "backend URL is not set";

/// Stands in when no backend URL is configured outside development mode.
/// Every call fails with a configuration error.
pub struct UnconfiguredBackend;

#[async_trait]
impl CredentialBackend for UnconfiguredBackend {
    fn get_name(&self) -> &str {
        "unconfigured"
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, AuthError> {
        error!("Cannot sign in: {}", MISSING_URL);
        Err(AuthError::Configuration(MISSING_URL.to_string()))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        error!("Cannot refresh access token: {}", MISSING_URL);
        Err(AuthError::Configuration(MISSING_URL.to_string()))
    }
}
