use async_trait::async_trait;
use tracing::{info, warn};

use super::base::{BackendUser, CredentialBackend, LoginResponse, LoginToken, RefreshResponse};
use crate::error::AuthError;

pub const DEV_EMAIL: &str = "admin@example.com";
pub const DEV_PASSWORD: &str = "password";
const DEV_TOKEN_TTL: i64 = 3600;

/// A mock backend for local development without a real identity service.
/// Accepts a single fixed account and hands out one-hour tokens.
pub struct DevBackend;

impl DevBackend {
    pub fn new() -> Self {
        DevBackend
    }
}

impl Default for DevBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialBackend for DevBackend {
    fn get_name(&self) -> &str {
        "development"
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        if email != DEV_EMAIL || password != DEV_PASSWORD {
            warn!("Invalid credentials in development mode");
            return Err(AuthError::InvalidCredentials);
        }
        info!("Development mode: using mock authentication");
        Ok(LoginResponse {
            user: BackendUser {
                id: "dev-user-1".to_string(),
                email: DEV_EMAIL.to_string(),
                name: "Development User".to_string(),
                role: Some("admin".to_string()),
            },
            token: LoginToken::Full {
                access_token: "dev-access-token".to_string(),
                refresh_token: Some("dev-refresh-token".to_string()),
                expires_in: Some(DEV_TOKEN_TTL),
            },
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        info!("Development mode: mock token refresh");
        Ok(RefreshResponse {
            access_token: "dev-refreshed-access-token".to_string(),
            refresh_token: None,
            expires_in: DEV_TOKEN_TTL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_only_the_dev_account() {
        let backend = DevBackend::new();
        let resp = backend.login(DEV_EMAIL, DEV_PASSWORD).await.unwrap();
        assert_eq!(resp.user.id, "dev-user-1");
        assert_eq!(
            backend.login(DEV_EMAIL, "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn refresh_keeps_refresh_token() {
        let resp = DevBackend::new().refresh("dev-refresh-token").await.unwrap();
        assert_eq!(resp.access_token, "dev-refreshed-access-token");
        assert_eq!(resp.refresh_token, None);
    }
}
