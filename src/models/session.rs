use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::utils::value::{lenient_datetime, lenient_opt_string, lenient_string};

/// The user record carried by a session. Deserialization is lenient: missing,
/// null or non-string fields never fail, they default to empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
}

/// The live proof of identity for the current client, as exposed by `GET /api/auth/session`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: SessionUser,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TokenError>,
}

impl Session {
    /// A session without a known expiry never counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires {
            Some(expires) => now > expires,
            None => false,
        }
    }
}

/// The authentication provider's view of the session lifecycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

/// One observation of the provider: the session (if any) and the status signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub status: SessionStatus,
}

impl SessionSnapshot {
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn authenticated(session: Session) -> Self {
        Self {
            session: Some(session),
            status: SessionStatus::Authenticated,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            session: None,
            status: SessionStatus::Unauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parses_provider_session() {
        let session: Session = serde_json::from_value(json!({
            "user": {"id": "u1", "name": "Ada", "email": "ada@example.com", "image": "https://img/a.png"},
            "expires": "2030-01-01T00:00:00.000Z",
            "accessToken": "abc"
        }))
        .unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.image.as_deref(), Some("https://img/a.png"));
        assert_eq!(session.expires, Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(session.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn malformed_user_fields_default_to_empty() {
        let session: Session = serde_json::from_value(json!({
            "user": {"id": null, "name": {"first": "x"}, "image": 3},
            "expires": "not a date"
        }))
        .unwrap();
        assert_eq!(session.user.id, "");
        assert_eq!(session.user.name, "");
        assert_eq!(session.user.email, "");
        assert_eq!(session.user.image.as_deref(), Some("3"));
        assert_eq!(session.expires, None);
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn expiry_compares_against_now() {
        let session = Session {
            user: SessionUser::default(),
            expires: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            access_token: None,
            error: None,
        };
        assert!(session.is_expired(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()));
        assert!(!session.is_expired(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()));
    }
}
