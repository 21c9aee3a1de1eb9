//! Access token refresh.
//!
//! Given the token record carried by a session, decide whether it can be reused
//! or must be exchanged at the credential backend:
//!
//! - `Valid`: more than the safety window remains, the token is returned untouched.
//! - `Expired`: the refresh token is exchanged; the new expiry is
//!   `now + expiresIn - safety_window` and the old refresh token is kept when the
//!   backend does not rotate it.
//! - A failed exchange tags the token with an error instead of returning `Err`;
//!   an errored token is never retried, the user has to sign in again.
//!
//! Concurrent refreshes of the same refresh token share one backend call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::backend::{CredentialBackend, RefreshResponse};
use crate::error::{AuthError, TokenError};
use crate::models::{Token, TokenState};
use crate::utils::log_throttle::LogThrottle;

const FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);
const FAILURE_LOG_KEY: &str = "auth.refresh.failed";

type RefreshFuture = Shared<BoxFuture<'static, Result<RefreshResponse, AuthError>>>;

pub struct TokenRefresher {
    backend: Arc<dyn CredentialBackend>,
    safety_window: i64,
    in_flight: Mutex<HashMap<String, RefreshFuture>>,
    failure_logs: LogThrottle,
}

impl TokenRefresher {
    pub fn new(backend: Arc<dyn CredentialBackend>, safety_window: i64) -> Self {
        Self {
            backend,
            safety_window,
            in_flight: Mutex::new(HashMap::new()),
            failure_logs: LogThrottle::new(FAILURE_LOG_WINDOW),
        }
    }

    pub fn safety_window(&self) -> i64 {
        self.safety_window
    }

    /// The token's state at `now`, including whether a refresh for it is running.
    pub fn state(&self, token: &Token, now: i64) -> TokenState {
        match token.state(now, self.safety_window) {
            TokenState::Expired => match &token.refresh_token {
                Some(rt) if self.lock_in_flight().contains_key(rt) => TokenState::Refreshing,
                _ => TokenState::Expired,
            },
            state => state,
        }
    }

    /// Reuse the token while it is valid, refresh it once it is not.
    pub async fn resolve(&self, token: Token, now: i64) -> Token {
        match token.state(now, self.safety_window) {
            TokenState::Valid => token,
            TokenState::Error => {
                debug!("Token carries {:?}, not retrying refresh", token.error);
                token
            }
            TokenState::Expired | TokenState::Refreshing => self.refresh(token, now).await,
        }
    }

    /// Exchange the refresh token regardless of the current expiry.
    /// Without a refresh token there is nothing to do and the token comes back unchanged.
    pub async fn refresh(&self, token: Token, now: i64) -> Token {
        let Some(refresh_token) = token.refresh_token.clone() else {
            debug!("No refresh token available, returning token unchanged");
            return token;
        };

        let outcome = match self.shared_refresh(&refresh_token).await {
            Ok(resp) => apply_refresh(&token, resp, now, self.safety_window),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(refreshed) => {
                info!(
                    event_name = "auth.refresh.succeeded",
                    event_domain = "auth",
                    access_token_expires = refreshed.access_token_expires,
                    "access token refreshed"
                );
                refreshed
            }
            Err(e) => {
                if let Some(suppressed_count) = self.failure_logs.should_emit(FAILURE_LOG_KEY) {
                    warn!(
                        event_name = "auth.refresh.failed",
                        event_domain = "auth",
                        suppressed_count,
                        "token refresh error: {}",
                        e
                    );
                }
                token.with_error(TokenError::from(&e))
            }
        }
    }

    async fn shared_refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let fut = {
            let mut in_flight = self.lock_in_flight();
            in_flight
                .entry(refresh_token.to_string())
                .or_insert_with(|| {
                    let backend = self.backend.clone();
                    let rt = refresh_token.to_string();
                    async move { backend.refresh(&rt).await }.boxed().shared()
                })
                .clone()
        };

        let result = fut.await;

        let mut in_flight = self.lock_in_flight();
        if in_flight
            .get(refresh_token)
            .is_some_and(|f| f.peek().is_some())
        {
            in_flight.remove(refresh_token);
        }
        result
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, RefreshFuture>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Fold a refresh response into the previous token record.
///
/// A response that would not move the expiry forward, or whose lifetime
/// overflows the clock, is rejected, so expiries strictly increase across
/// successful refreshes.
pub fn apply_refresh(
    previous: &Token,
    resp: RefreshResponse,
    now: i64,
    safety_window: i64,
) -> Result<Token, AuthError> {
    let expires = now
        .checked_add(resp.expires_in)
        .and_then(|t| t.checked_sub(safety_window))
        .ok_or_else(|| {
            AuthError::RefreshAccessToken(format!("expiresIn {} is out of range", resp.expires_in))
        })?;
    if let Some(prev) = previous.access_token_expires {
        if expires <= prev {
            return Err(AuthError::RefreshAccessToken(format!(
                "refreshed token expires at {} which is not after {}",
                expires, prev
            )));
        }
    }

    Ok(Token {
        access_token: resp.access_token,
        refresh_token: resp.refresh_token.or_else(|| previous.refresh_token.clone()),
        access_token_expires: Some(expires),
        error: None,
    })
}
