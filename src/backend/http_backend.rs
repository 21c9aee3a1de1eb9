use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use super::base::{CredentialBackend, LoginResponse, RefreshResponse};
use crate::error::AuthError;

/// Talks to a remote credential backend over JSON/HTTP.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_in_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_in_ms))
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
    }
}

/// The `{message}` of a non-2xx body, or the bare status when there is none.
async fn failure_message(resp: Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

async fn parse_json<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, String> {
    resp.json::<T>()
        .await
        .map_err(|e| format!("Failed to parse {} response: {}", what, e))
}

#[async_trait]
impl CredentialBackend for HttpBackend {
    fn get_name(&self) -> &str {
        "http"
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        debug!("Verifying credentials for '{}' at '{}'", email, self.base_url);
        let resp = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await
            .map_err(|e| AuthError::Network(format!("Login request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => parse_json(resp, "login").await.map_err(AuthError::Network),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Login rejected: {}", failure_message(resp).await);
                Err(AuthError::InvalidCredentials)
            }
            status => {
                let message = failure_message(resp).await;
                error!("Login failed with status {}: {}", status, message);
                Err(AuthError::Network(message))
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        debug!("Refreshing access token at '{}'", self.base_url);
        let resp = self
            .post(
                "/auth/refresh",
                serde_json::json!({ "refreshToken": refresh_token }),
            )
            .await
            .map_err(|e| AuthError::RefreshAccessToken(format!("Refresh request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = failure_message(resp).await;
            return Err(AuthError::RefreshAccessToken(format!(
                "status {}: {}",
                status.as_u16(),
                message
            )));
        }

        parse_json(resp, "refresh")
            .await
            .map_err(AuthError::RefreshAccessToken)
    }
}
