//! Session-cookie request gate for the task manager.
//!
//! Decides per request whether a visitor may reach the protected pages
//! (`/tasks`) and API routes (`/api/tasks`), based on the presence and
//! self-reported expiry of the `task_app_token` cookie.
//!
//! # Example
//!
//! ```rust
//! use taskgate::{Decision, Gate, GateConfig, GateRequest};
//!
//! let gate = Gate::new(GateConfig::default().with_origin("https://tasks.example.com")).unwrap();
//!
//! let decision = gate.evaluate(&GateRequest::new("/tasks", None));
//! assert!(matches!(decision, Decision::RedirectToLogin { .. }));
//!
//! let decision = gate.evaluate(&GateRequest::new("/public", None));
//! assert_eq!(decision, Decision::Continue);
//! ```

pub mod api;
pub mod config;
pub mod cookie;
pub mod gate;
pub mod secret;
pub mod token;

pub use config::{AreaKind, GateConfig, ProtectedArea};
pub use cookie::{CookieSource, CookieSpec, SameSite, SessionCookies, TOKEN_COOKIE, USER_COOKIE};
pub use gate::{Decision, DenialReason, Gate, GateRequest};
pub use secret::SessionToken;
pub use token::{TokenClaims, TokenError, decode_claims, is_expired, is_expired_at};

use std::fmt;

/// Errors raised while building a [`Gate`].
///
/// Request evaluation never fails; only construction does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    InvalidConfiguration(String),
}

impl std::error::Error for GateError {}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::InvalidConfiguration(msg) => write!(f, "Invalid gate configuration: {msg}"),
        }
    }
}
