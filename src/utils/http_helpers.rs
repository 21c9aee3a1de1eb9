use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{AuthError, FieldErrors};

/// JSON body of every error response: `{"error": "...", "fields": {...}}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
    fields: Option<FieldErrors>,
}

impl HTTPError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: FieldErrors) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            fields: self.fields,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for HTTPError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(fields) => {
                HTTPError::new(StatusCode::BAD_REQUEST, "Validation failed").with_fields(fields)
            }
            AuthError::InvalidCredentials => {
                HTTPError::new(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            AuthError::InvalidSession(_) | AuthError::RefreshAccessToken(_) => {
                HTTPError::new(StatusCode::UNAUTHORIZED, "Unauthorized access")
            }
            AuthError::Configuration(msg) => {
                error!("Configuration error: {}", msg);
                HTTPError::new(StatusCode::SERVICE_UNAVAILABLE, "Authentication is not configured")
            }
            AuthError::Network(msg) => {
                error!("Credential backend error: {}", msg);
                HTTPError::new(StatusCode::BAD_GATEWAY, msg)
            }
        }
    }
}

/// The token of an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer xyz")), Some("xyz"));
        assert_eq!(bearer_token(&headers("Basic Zm9vOmJhcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn maps_auth_errors_to_status() {
        let cases = [
            (AuthError::Validation(FieldErrors::new()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidSession("x".into()), StatusCode::UNAUTHORIZED),
            (AuthError::Configuration("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::Network("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(HTTPError::from(err).status(), status);
        }
    }
}
