use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::dev_backend::DevBackend;
use super::http_backend::HttpBackend;
use super::unconfigured_backend::UnconfiguredBackend;
use crate::config::BackendConfig;
use crate::error::AuthError;
use crate::models::{SessionUser, Token};
use crate::utils::value::{lenient_opt_string, lenient_string};

/// The user part of a `POST /auth/login` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BackendUser {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub role: Option<String>,
}

/// Backends either return a full token object or just the access token string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoginToken {
    #[serde(rename_all = "camelCase")]
    Full {
        access_token: String,
        #[serde(default)]
        refresh_token: Option<String>,
        #[serde(default)]
        expires_in: Option<i64>,
    },
    Bare(String),
}

/// Body of a successful `POST /auth/login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub user: BackendUser,
    pub token: LoginToken,
}

impl LoginResponse {
    /// Build the session's token record; the expiry is `now + expiresIn` when given.
    /// A lifetime that overflows the clock counts as unknown expiry.
    pub fn to_token(&self, now: i64) -> Token {
        match &self.token {
            LoginToken::Full {
                access_token,
                refresh_token,
                expires_in,
            } => Token::new(
                access_token.clone(),
                refresh_token.clone(),
                expires_in.and_then(|ttl| now.checked_add(ttl)),
            ),
            LoginToken::Bare(access_token) => Token::new(access_token.clone(), None, None),
        }
    }

    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.user.id.clone(),
            name: self.user.name.clone(),
            email: self.user.email.clone(),
            image: None,
            role: self.user.role.clone(),
        }
    }
}

/// Body of a successful `POST /auth/refresh`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the new access token in seconds.
    pub expires_in: i64,
}

/// The identity service that verifies credentials and rotates access tokens.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    fn get_name(&self) -> &str;
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError>;
}

/// Pick the backend for a config: the HTTP backend when a URL is set, the mock
/// backend in development mode, otherwise one that reports a configuration error.
pub fn create_backend(config: &BackendConfig) -> Arc<dyn CredentialBackend> {
    match (&config.url, config.dev_mode) {
        (Some(url), _) => {
            info!("Using credential backend at '{}'", url);
            Arc::new(HttpBackend::new(url, config.timeout_in_ms))
        }
        (None, true) => {
            warn!("No backend URL configured, using development mock backend");
            Arc::new(DevBackend::new())
        }
        (None, false) => {
            warn!("No backend URL configured and development mode is off; sign-in will fail");
            Arc::new(UnconfiguredBackend)
        }
    }
}
