use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::auth::IssuedSession;
use crate::error::AuthError;
use crate::models::{Session, SessionSnapshot};
use crate::utils::http_helpers::ErrorBody;
use crate::validation::{LoginForm, RegisterRequest};

/// Client of the session HTTP surface. Holds the current session token and
/// publishes every session change as a [`SessionSnapshot`].
pub struct SessionProvider {
    base_url: String,
    client: reqwest::Client,
    session_token: Mutex<Option<String>>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionProvider {
    pub fn new(base_url: &str, timeout_in_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_in_ms))
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });
        let (snapshots, _rx) = watch::channel(SessionSnapshot::loading());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session_token: Mutex::new(None),
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn session_token(&self) -> Option<String> {
        self.token().clone()
    }

    /// Resume a session from a previously stored token. Call `refresh` to load it.
    pub fn set_session_token(&self, token: Option<String>) {
        *self.token() = token;
    }

    fn token(&self) -> MutexGuard<'_, Option<String>> {
        self.session_token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_bearer(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn accept(&self, issued: IssuedSession) -> Session {
        *self.token() = Some(issued.session_token);
        self.snapshots
            .send_replace(SessionSnapshot::authenticated(issued.session.clone()));
        issued.session
    }

    fn drop_session(&self) {
        *self.token() = None;
        self.snapshots.send_replace(SessionSnapshot::unauthenticated());
    }

    pub async fn sign_in(&self, form: &LoginForm) -> Result<Session, AuthError> {
        let resp = self
            .client
            .post(self.url("/api/auth/signin"))
            .json(form)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Sign-in request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => Ok(self.accept(parse_issued(resp).await?)),
            StatusCode::BAD_REQUEST => Err(validation_error(resp).await),
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            _ => Err(AuthError::Network(error_message(resp).await)),
        }
    }

    /// Re-read the session from the server. Without a stored token the provider
    /// settles as unauthenticated without a request.
    pub async fn refresh(&self) -> Result<SessionSnapshot, AuthError> {
        if self.session_token().is_none() {
            self.drop_session();
            return Ok(self.snapshot());
        }

        let resp = self
            .with_bearer(self.client.get(self.url("/api/auth/session")))
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Session request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => {
                let session = self.accept(parse_issued(resp).await?);
                if session.error.is_some() {
                    warn!("Session for '{}' carries {:?}", session.user.id, session.error);
                }
            }
            StatusCode::UNAUTHORIZED => {
                debug!("Session no longer valid");
                self.drop_session();
            }
            _ => return Err(AuthError::Network(error_message(resp).await)),
        }
        Ok(self.snapshot())
    }

    /// End the session. The local session is dropped even when the server can't be reached.
    pub async fn sign_out(&self) {
        let result = self
            .with_bearer(self.client.post(self.url("/api/auth/signout")))
            .send()
            .await;
        if let Err(e) = result {
            warn!("Sign-out request failed: {}", e);
        }
        self.drop_session();
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.url("/api/v1/users"))
            .json(request)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Registration request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => Err(validation_error(resp).await),
            _ => Err(AuthError::Network(error_message(resp).await)),
        }
    }
}

async fn parse_issued(resp: Response) -> Result<IssuedSession, AuthError> {
    resp.json::<IssuedSession>()
        .await
        .map_err(|e| AuthError::Network(format!("Failed to parse session response: {}", e)))
}

async fn error_body(resp: Response) -> Option<ErrorBody> {
    let text = resp.text().await.ok()?;
    serde_json::from_str(&text).ok()
}

async fn error_message(resp: Response) -> String {
    let status = resp.status();
    error_body(resp)
        .await
        .map(|b| b.error)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// A 400 with field messages becomes `Validation`; without them it is reported as-is.
async fn validation_error(resp: Response) -> AuthError {
    match error_body(resp).await {
        Some(ErrorBody {
            fields: Some(fields),
            ..
        }) => AuthError::Validation(fields),
        Some(body) => AuthError::Network(body.error),
        None => AuthError::Network("HTTP 400".to_string()),
    }
}
