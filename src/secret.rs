//! Redacting wrapper for the raw session token.
//!
//! The token is a bearer credential for the backend API, so it must never end
//! up in logs through a stray `{:?}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::token;

/// A session token as carried by the `task_app_token` cookie.
///
/// `Debug` and `Display` print `[REDACTED]`.
///
/// # Example
///
/// ```rust
/// use taskgate::SessionToken;
///
/// let token = SessionToken::new("header.payload.signature");
/// assert_eq!(format!("{token:?}"), "SessionToken([REDACTED])");
/// assert_eq!(token.expose_secret(), "header.payload.signature");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token, e.g. for a `Set-Cookie` header or an
    /// `Authorization` header towards the backend.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// See [`token::is_expired`].
    #[must_use]
    pub fn is_expired(&self) -> bool {
        token::is_expired(&self.0)
    }

    /// See [`token::is_expired_at`].
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        token::is_expired_at(&self.0, now)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Serialize for SessionToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

// Login responses carry the token as `access_token`.
impl<'de> Deserialize<'de> for SessionToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SessionToken)
    }
}
