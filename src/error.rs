//! Error types shared across the session, backend and client layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Everything that can go wrong while signing in, reading or refreshing a session.
///
/// The type is `Clone` so a single in-flight refresh can hand the same outcome
/// to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential backend URL is configured and development mode is off.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backend rejected or failed a refresh request.
    #[error("refresh access token error: {0}")]
    RefreshAccessToken(String),

    /// The backend refused the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// One or more form fields failed validation.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Transport failure or an unexpected response shape.
    #[error("network error: {0}")]
    Network(String),

    /// The presented session token could not be decoded or has expired.
    #[error("invalid session: {0}")]
    InvalidSession(String),
}

impl AuthError {
    /// A single human-readable line suitable for a notification body.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::Validation(_) => "Please correct the highlighted fields".to_string(),
            AuthError::Configuration(_) => "Sign-in is not available right now".to_string(),
            AuthError::Network(msg) => msg.clone(),
            AuthError::RefreshAccessToken(_) | AuthError::InvalidSession(_) => {
                "Your session has expired, please sign in again".to_string()
            }
        }
    }
}

/// The error tag attached to a token record when a refresh did not succeed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    RefreshAccessTokenError,
    ConfigurationError,
}

impl From<&AuthError> for TokenError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::Configuration(_) => TokenError::ConfigurationError,
            _ => TokenError::RefreshAccessTokenError,
        }
    }
}

/// Failures of the durable client-side storage adapter.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage is disabled")]
    Disabled,

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Logging could not be initialised from the configuration.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLevel(String),

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialised,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_tag_tokens_as_configuration() {
        let err = AuthError::Configuration("BACKEND_API_URL is not set".into());
        assert_eq!(TokenError::from(&err), TokenError::ConfigurationError);
    }

    #[test]
    fn other_errors_tag_tokens_as_refresh_failures() {
        for err in [
            AuthError::Network("connection refused".into()),
            AuthError::RefreshAccessToken("status 401".into()),
            AuthError::InvalidCredentials,
        ] {
            assert_eq!(TokenError::from(&err), TokenError::RefreshAccessTokenError);
        }
    }

    #[test]
    fn token_error_serializes_as_its_tag() {
        let json = serde_json::to_string(&TokenError::RefreshAccessTokenError).unwrap();
        assert_eq!(json, "\"RefreshAccessTokenError\"");
    }
}
