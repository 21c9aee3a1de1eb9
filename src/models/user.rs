use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::SessionUser;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Anything other than "admin" maps to the plain user role.
    pub fn parse(role: &str) -> Role {
        if role.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// The locally cached user, derived from the session on every session change
/// and persisted so the last known user can be shown before the session arrives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial update of a [`User`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub role: Option<Role>,
}

impl User {
    /// Project a session user into the local representation.
    ///
    /// `createdAt` survives re-projection of the same user id, so projecting the same
    /// session twice only moves `updatedAt`.
    pub fn from_session(session_user: &SessionUser, previous: Option<&User>, now: DateTime<Utc>) -> Self {
        let created_at = previous
            .filter(|p| p.id == session_user.id)
            .map(|p| p.created_at)
            .unwrap_or(now);

        User {
            id: session_user.id.clone(),
            name: session_user.name.clone(),
            email: session_user.email.clone(),
            avatar: session_user.image.clone(),
            role: session_user
                .role
                .as_deref()
                .map(Role::parse)
                .unwrap_or_default(),
            created_at,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UserUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.updated_at = now;
    }

    /// Name, falling back to email, falling back to "Anonymous".
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            "Anonymous"
        }
    }
}
