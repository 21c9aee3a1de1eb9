use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// The access/refresh credential pair obtained from the credential backend.
///
/// Created at sign-in and only ever replaced by the refresh path; it travels
/// inside the signed session token between requests.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry of the access token in epoch seconds, when the backend told us.
    pub access_token_expires: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TokenError>,
}

/// Where a token stands relative to the refresh state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Far enough from expiry to be reused as is.
    Valid,
    /// Inside the safety window, past expiry, or of unknown expiry.
    Expired,
    /// A refresh call for this token is in flight.
    Refreshing,
    /// A refresh failed; the token must not be used again.
    Error,
}

impl Token {
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        access_token_expires: Option<i64>,
    ) -> Self {
        Token {
            access_token,
            refresh_token,
            access_token_expires,
            error: None,
        }
    }

    /// Classify the token at `now` (epoch seconds). The token stays valid only while
    /// more than `safety_window` seconds remain before its expiry.
    pub fn state(&self, now: i64, safety_window: i64) -> TokenState {
        if self.error.is_some() {
            return TokenState::Error;
        }
        match self.access_token_expires {
            Some(expires) if expires - now > safety_window => TokenState::Valid,
            _ => TokenState::Expired,
        }
    }

    /// The access token, unless a failed refresh has invalidated it.
    pub fn usable_access_token(&self) -> Option<&str> {
        match self.error {
            Some(_) => None,
            None => Some(&self.access_token),
        }
    }

    /// Tag the token as failed. The access token is dropped with it.
    pub fn with_error(mut self, error: TokenError) -> Self {
        self.access_token.clear();
        self.error = Some(error);
        self
    }
}
