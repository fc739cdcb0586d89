//! Expiry checks for compact session tokens.
//!
//! A session token is three base64url segments (`header.payload.signature`).
//! Only the payload is read; the signature is never verified here. The
//! backend that issued the token remains responsible for rejecting forged
//! ones, so this check only decides whether the visitor should be sent back
//! to the login page early.
//!
//! Every malformed input counts as expired.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Why a token's payload could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Fewer than two dot-separated segments.
    MissingPayload,
    /// The payload segment is not valid base64url.
    InvalidEncoding,
    /// The decoded payload is not JSON.
    InvalidJson,
    /// The payload is JSON but not an object.
    NotAnObject,
}

impl std::error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::MissingPayload => write!(f, "token has no payload segment"),
            TokenError::InvalidEncoding => write!(f, "payload is not valid base64url"),
            TokenError::InvalidJson => write!(f, "payload is not valid JSON"),
            TokenError::NotAnObject => write!(f, "payload is not a JSON object"),
        }
    }
}

/// Claims decoded from a token payload, unverified.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    claims: Map<String, Value>,
}

impl TokenClaims {
    /// The `exp` claim, if present and numeric.
    pub fn exp(&self) -> Option<f64> {
        self.claims.get("exp").and_then(Value::as_f64)
    }

    /// The `exp` claim as a timestamp, truncated to whole seconds.
    #[allow(clippy::cast_possible_truncation)]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.exp()?;
        if !exp.is_finite() {
            return None;
        }
        DateTime::from_timestamp(exp.floor() as i64, 0)
    }

    /// Looks up any other claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Returns true if the token is expired at `now`.
    ///
    /// A token whose `exp` equals the current second is already expired.
    #[allow(clippy::cast_precision_loss)]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp() {
            Some(exp) => exp <= now.timestamp() as f64,
            None => true,
        }
    }
}

/// Decodes the payload segment of a token without checking its signature.
///
/// The decoded payload must be UTF-8 JSON; other bytes yield [`TokenError::InvalidJson`].
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let _header = segments.next();
    let payload = segments.next().ok_or(TokenError::MissingPayload)?;

    let bytes = decode_base64url(payload)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|_| TokenError::InvalidJson)?;

    match value {
        Value::Object(claims) => Ok(TokenClaims { claims }),
        _ => Err(TokenError::NotAnObject),
    }
}

/// Returns true if the token is expired, malformed, or carries no numeric `exp`.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Same as [`is_expired`], evaluated at `now`.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.is_expired_at(now),
        Err(e) => {
            log::debug!(target: "taskgate::token", "msg=\"unreadable session token\" reason=\"{e}\"");
            true
        }
    }
}

/// Maps the URL-safe alphabet back to the standard one and restores padding.
fn decode_base64url(segment: &str) -> Result<Vec<u8>, TokenError> {
    let mut base64 = segment.replace('-', "+").replace('_', "/");
    let remainder = base64.len() % 4;
    if remainder != 0 {
        base64.push_str(&"=".repeat(4 - remainder));
    }
    STANDARD
        .decode(base64.as_bytes())
        .map_err(|_| TokenError::InvalidEncoding)
}
