//! Session cookies: reading them off a request and writing them on a response.
//!
//! Two cookies make up a browser session:
//!
//! - `task_app_token`: the session token, http-only so page scripts cannot read it.
//! - `task_app_user`: the signed-in email, readable by scripts for display only.

use std::collections::HashMap;

use cookie::Cookie;

use crate::GateConfig;
use crate::secret::SessionToken;

pub const TOKEN_COOKIE: &str = "task_app_token";
pub const USER_COOKIE: &str = "task_app_user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    #[default]
    Lax,
    Strict,
}

impl From<SameSite> for cookie::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::None => cookie::SameSite::None,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::Strict => cookie::SameSite::Strict,
        }
    }
}

/// Read access to the cookies of an inbound request.
pub trait CookieSource {
    /// Returns the value of the named cookie, or `None` when absent.
    fn cookie_value(&self, name: &str) -> Option<String>;
}

impl CookieSource for HashMap<String, String> {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Reads `Cookie` request headers.
///
/// A request may carry several `Cookie` headers; the first occurrence of the
/// name wins.
impl CookieSource for http::HeaderMap {
    fn cookie_value(&self, name: &str) -> Option<String> {
        self.get_all(http::header::COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| Cookie::parse(pair.trim()).ok())
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_owned())
    }
}

/// A single `Set-Cookie` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age_secs: i64,
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
}

impl CookieSpec {
    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone(), self.value.clone())
            .path(self.path.clone())
            .max_age(cookie::time::Duration::seconds(self.max_age_secs))
            .http_only(self.http_only)
            .same_site(self.same_site.into())
            .secure(self.secure)
            .finish()
    }

    /// Renders the value of a `Set-Cookie` header.
    pub fn to_header_value(&self) -> String {
        self.to_cookie().to_string()
    }

    /// True if this instruction deletes the cookie.
    pub fn is_removal(&self) -> bool {
        self.max_age_secs == 0 && self.value.is_empty()
    }
}

/// The pair of cookie writes that start or end a browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookies {
    pub token: CookieSpec,
    pub user: CookieSpec,
}

impl SessionCookies {
    /// Cookies written after a successful login.
    pub fn issue(token: &SessionToken, user_email: &str, config: &GateConfig) -> Self {
        let max_age_secs = config.session_lifetime.num_seconds();
        Self {
            token: CookieSpec {
                name: config.token_cookie.clone(),
                value: token.expose_secret().to_owned(),
                path: "/".to_owned(),
                max_age_secs,
                http_only: true,
                same_site: SameSite::Lax,
                secure: config.secure_cookies,
            },
            user: CookieSpec {
                name: config.user_cookie.clone(),
                value: user_email.to_owned(),
                path: "/".to_owned(),
                max_age_secs,
                http_only: false,
                same_site: SameSite::Lax,
                secure: config.secure_cookies,
            },
        }
    }

    /// Cookies written on logout or when the gate finds an expired token.
    pub fn clear(config: &GateConfig) -> Self {
        Self {
            token: CookieSpec {
                name: config.token_cookie.clone(),
                value: String::new(),
                path: "/".to_owned(),
                max_age_secs: 0,
                http_only: true,
                same_site: SameSite::Lax,
                secure: false,
            },
            user: CookieSpec {
                name: config.user_cookie.clone(),
                value: String::new(),
                path: "/".to_owned(),
                max_age_secs: 0,
                http_only: false,
                same_site: SameSite::Lax,
                secure: false,
            },
        }
    }

    /// Token cookie first, then the user cookie.
    pub fn iter(&self) -> impl Iterator<Item = &CookieSpec> {
        [&self.token, &self.user].into_iter()
    }

    pub fn header_values(&self) -> Vec<String> {
        self.iter().map(CookieSpec::to_header_value).collect()
    }
}
