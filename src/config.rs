//! Gate configuration.
//!
//! Everything the gate needs from its environment is carried here and passed
//! in at construction time: the public origin used for redirects, the login
//! path, the session cookie names and the table of protected path prefixes.
//!
//! # Example
//!
//! ```rust
//! use taskgate::{AreaKind, GateConfig};
//! use chrono::Duration;
//!
//! let config = GateConfig::default()
//!     .with_origin("https://tasks.example.com")
//!     .with_area("/reports", AreaKind::Page)
//!     .with_secure_cookies(true)
//!     .with_session_lifetime(Duration::hours(8));
//!
//! assert!(config.validate().is_ok());
//! ```

use chrono::Duration;

use crate::GateError;
use crate::cookie::{TOKEN_COOKIE, USER_COOKIE};

/// How a protected prefix rejects visitors without a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    /// Browser pages: redirect to the login page.
    Page,
    /// JSON API routes: answer 401 with a message body.
    Api,
}

/// A path prefix that requires a fresh session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedArea {
    pub prefix: String,
    pub kind: AreaKind,
}

impl ProtectedArea {
    pub fn new(prefix: impl Into<String>, kind: AreaKind) -> Self {
        Self {
            prefix: prefix.into(),
            kind,
        }
    }

    /// Prefix match on whole path segments.
    ///
    /// `/tasks` matches `/tasks`, `/tasks/` and `/tasks/42`, but not `/tasksfoo`.
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Public origin (`scheme://host[:port]`) used to build the login redirect.
    ///
    /// When unset, the origin of the inbound request is used instead.
    pub origin: Option<String>,
    /// Default: `/login`.
    pub login_path: String,
    /// Default: `task_app_token`.
    pub token_cookie: String,
    /// Default: `task_app_user`.
    pub user_cookie: String,
    /// Checked in order; the first matching prefix decides.
    pub areas: Vec<ProtectedArea>,
    /// Adds `Secure` to issued cookies. Default: false.
    pub secure_cookies: bool,
    /// Max-age of cookies issued on login. Default: 24 hours.
    pub session_lifetime: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            origin: None,
            login_path: "/login".to_owned(),
            token_cookie: TOKEN_COOKIE.to_owned(),
            user_cookie: USER_COOKIE.to_owned(),
            areas: vec![
                ProtectedArea::new("/tasks", AreaKind::Page),
                ProtectedArea::new("/api/tasks", AreaKind::Api),
            ],
            secure_cookies: false,
            session_lifetime: Duration::hours(24),
        }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the public origin; a trailing `/` is dropped.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin: String = origin.into();
        self.origin = Some(origin.trim_end_matches('/').to_owned());
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Appends a protected prefix after the existing ones.
    #[must_use]
    pub fn with_area(mut self, prefix: impl Into<String>, kind: AreaKind) -> Self {
        self.areas.push(ProtectedArea::new(prefix, kind));
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Classifies a request path against the area table.
    ///
    /// Returns `None` for unprotected paths.
    pub fn classify(&self, path: &str) -> Option<AreaKind> {
        self.areas
            .iter()
            .find(|area| area.matches(path))
            .map(|area| area.kind)
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if let Some(origin) = &self.origin {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(invalid(format!(
                    "origin must start with http:// or https://, got \"{origin}\""
                )));
            }
        }

        if !self.login_path.starts_with('/') {
            return Err(invalid(format!(
                "login path must start with '/', got \"{}\"",
                self.login_path
            )));
        }

        if self.token_cookie.is_empty() || self.user_cookie.is_empty() {
            return Err(invalid("cookie names must not be empty".to_owned()));
        }

        if self.token_cookie == self.user_cookie {
            return Err(invalid(
                "token and user cookies must have different names".to_owned(),
            ));
        }

        for area in &self.areas {
            if !area.prefix.starts_with('/') {
                return Err(invalid(format!(
                    "protected prefix must start with '/', got \"{}\"",
                    area.prefix
                )));
            }
            if area.prefix.trim_end_matches('/').is_empty() {
                return Err(invalid("protected prefix must not be the root path".to_owned()));
            }
        }

        if self.classify(&self.login_path) == Some(AreaKind::Page) {
            return Err(invalid(format!(
                "login path \"{}\" is inside a protected page area",
                self.login_path
            )));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> GateError {
    GateError::InvalidConfiguration(msg)
}
