//! Session data model
//!
//! Types exchanged with the `/auth` endpoints and persisted by the token store.

use serde::{Deserialize, Serialize};

use crate::core::error::{ApiError, Result};

/// Access tier returned with every session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Officer,
    Teacher,
    Guest,
    /// Any role the server sends that this client does not know about
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Officer => "officer",
            Role::Teacher => "teacher",
            Role::Guest => "guest",
            Role::Unknown => "unknown",
        }
    }

    /// Capitalized name for headers and badges
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Officer => "Officer",
            Role::Teacher => "Teacher",
            Role::Guest => "Guest",
            Role::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user as reported by the API
///
/// Fields the client does not interpret are kept in `extra` so the cached
/// copy round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Response of `/auth/login` and `/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Refresh request body
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response of `/auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshResponse {
    pub access_token: String,
    /// Present only when the server rotates refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Credentials of an authenticated session
///
/// Both tokens are always present together; a response carrying only one of
/// them never becomes a `Session`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<User>,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: Option<User>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user,
        }
    }

    /// Extract a session from an auth response.
    ///
    /// Returns `Ok(None)` when the response carries no access token (the call
    /// succeeded but did not sign anyone in).
    pub fn from_response(response: &AuthResponse) -> Result<Option<Self>> {
        let Some(access_token) = response.access_token.as_deref().filter(|t| !t.is_empty())
        else {
            return Ok(None);
        };

        let refresh_token = response
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidSession("response has an access token but no refresh token".into())
            })?;

        Ok(Some(Session::new(
            access_token,
            refresh_token,
            response.user.clone(),
        )))
    }
}

/// Raw view of what the token store currently holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}
