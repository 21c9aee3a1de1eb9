use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::refresh::TokenRefresher;
use super::session_token::SessionCodec;
use crate::backend::CredentialBackend;
use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::models::{Session, SessionUser, Token};
use crate::validation::{validate_login_form, LoginForm};

/// A freshly signed session token together with the session it describes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    pub session_token: String,
    pub session: Session,
}

/// Signs users in against the credential backend and reconciles their sessions,
/// refreshing the embedded access token as it nears expiry.
pub struct Auth {
    backend: Arc<dyn CredentialBackend>,
    refresher: TokenRefresher,
    codec: SessionCodec,
}

impl Auth {
    pub fn new(backend: Arc<dyn CredentialBackend>, config: &SessionConfig) -> Self {
        info!(
            "Creating session auth with backend '{}' (max_age={}s, safety_window={}s)",
            backend.get_name(),
            config.max_age,
            config.safety_window_secs
        );
        Auth {
            refresher: TokenRefresher::new(backend.clone(), config.safety_window_secs),
            codec: SessionCodec::new(config),
            backend,
        }
    }

    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    /// Validate the form, verify the credentials and issue a new session.
    pub async fn sign_in(&self, form: &LoginForm, now: i64) -> Result<IssuedSession, AuthError> {
        validate_login_form(form).map_err(AuthError::Validation)?;

        let resp = match self.backend.login(&form.email, &form.password).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Sign-in failed for '{}': {}", form.email, e);
                return Err(e);
            }
        };

        info!("Backend '{}' signed in user '{}'", self.backend.get_name(), resp.user.id);
        self.issue(&resp.to_session_user(), &resp.to_token(now), now)
    }

    /// Decode a presented session, bring its token up to date and issue the rolled session.
    ///
    /// A failed refresh does not fail the read: the session comes back with its
    /// `error` set and without an access token.
    pub async fn read_session(&self, session_token: &str, now: i64) -> Result<IssuedSession, AuthError> {
        let claims = self.codec.decode(session_token, now)?;
        debug!("Reading session for user '{}'", claims.sub);

        let token = self.refresher.resolve(claims.token, now).await;
        self.issue(&claims.user, &token, now)
    }

    fn issue(&self, user: &SessionUser, token: &Token, now: i64) -> Result<IssuedSession, AuthError> {
        let session_token = self.codec.encode(user, token, now)?;
        Ok(IssuedSession {
            session_token,
            session: Session {
                user: user.clone(),
                expires: DateTime::<Utc>::from_timestamp(now + self.codec.max_age(), 0),
                access_token: token.usable_access_token().map(str::to_string),
                error: token.error,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::dev_backend::{DevBackend, DEV_EMAIL, DEV_PASSWORD};
    use crate::backend::http_backend::HttpBackend;
    use crate::error::TokenError;
    use mockito::Server;

    fn config() -> SessionConfig {
        SessionConfig {
            secret: "test-secret".into(),
            max_age: 86_400,
            safety_window_secs: 5,
        }
    }

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    #[tokio::test]
    async fn dev_sign_in_issues_session() {
        let auth = Auth::new(Arc::new(DevBackend::new()), &config());
        let now = Utc::now().timestamp();

        let issued = auth.sign_in(&login(DEV_EMAIL, DEV_PASSWORD), now).await.unwrap();
        assert_eq!(issued.session.user.id, "dev-user-1");
        assert_eq!(issued.session.access_token.as_deref(), Some("dev-access-token"));
        assert_eq!(
            issued.session.expires.map(|e| e.timestamp()),
            Some(now + 86_400)
        );
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_backend() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/login")
            .expect(0)
            .create_async()
            .await;
        let auth = Auth::new(Arc::new(HttpBackend::new(&server.url(), 1000)), &config());

        let err = auth.sign_in(&login("", ""), 0).await.unwrap_err();
        m.assert_async().await;
        match err {
            AuthError::Validation(fields) => {
                assert!(fields.contains_key("email"));
                assert!(fields.contains_key("password"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn read_session_refreshes_near_expiry() {
        let auth = Auth::new(Arc::new(DevBackend::new()), &config());
        let now = Utc::now().timestamp();
        let issued = auth.sign_in(&login(DEV_EMAIL, DEV_PASSWORD), now).await.unwrap();

        // Dev tokens live for an hour; read it back 3596 seconds later.
        let later = now + 3596;
        let read = auth.read_session(&issued.session_token, later).await.unwrap();
        assert_eq!(read.session.access_token.as_deref(), Some("dev-refreshed-access-token"));
        assert_eq!(read.session.error, None);
    }

    #[tokio::test]
    async fn failed_refresh_hides_access_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(200)
            .with_body(
                r#"{"user": {"id": "u1", "email": "a@b.co", "name": "A"},
                    "token": {"accessToken": "at", "refreshToken": "rt", "expiresIn": 60}}"#,
            )
            .create_async()
            .await;
        server
            .mock("POST", "/auth/refresh")
            .with_status(401)
            .create_async()
            .await;
        let auth = Auth::new(Arc::new(HttpBackend::new(&server.url(), 1000)), &config());
        let now = Utc::now().timestamp();

        let issued = auth.sign_in(&login("a@b.co", "pw"), now).await.unwrap();
        let read = auth.read_session(&issued.session_token, now + 120).await.unwrap();

        assert_eq!(read.session.error, Some(TokenError::RefreshAccessTokenError));
        assert_eq!(read.session.access_token, None);

        // The error sticks to the re-issued session.
        let again = auth.read_session(&read.session_token, now + 130).await.unwrap();
        assert_eq!(again.session.access_token, None);
    }

    #[tokio::test]
    async fn garbage_session_token_is_invalid() {
        let auth = Auth::new(Arc::new(DevBackend::new()), &config());
        assert!(matches!(
            auth.read_session("not-a-jwt", 0).await,
            Err(AuthError::InvalidSession(_))
        ));
    }
}
