//! Per-request access decisions for protected pages and API routes.
//!
//! The gate looks at three things only: the request path, the session token
//! cookie and the current time. It never touches the network and keeps no
//! state between requests. Cookie writes it wants applied (clearing a stale
//! session) travel inside the returned [`Decision`].

use chrono::{DateTime, Utc};

use crate::config::{AreaKind, GateConfig};
use crate::cookie::{CookieSource, SessionCookies};
use crate::GateError;
use crate::token;

pub const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired";

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No session token cookie.
    MissingToken,
    /// The token is expired or unreadable.
    ExpiredToken,
}

impl DenialReason {
    pub fn message(self) -> &'static str {
        match self {
            DenialReason::MissingToken => NOT_AUTHORIZED_MESSAGE,
            DenialReason::ExpiredToken => SESSION_EXPIRED_MESSAGE,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            DenialReason::MissingToken => "missing_token",
            DenialReason::ExpiredToken => "expired_token",
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to its handler unmodified.
    Continue,
    /// Send the browser to the login page.
    RedirectToLogin {
        location: String,
        clear_cookies: Option<SessionCookies>,
    },
    /// Answer with `status` and a JSON `{"message": ...}` body.
    Unauthorized {
        message: &'static str,
        status: u16,
        clear_cookies: Option<SessionCookies>,
    },
}

impl Decision {
    pub fn is_continue(&self) -> bool {
        matches!(self, Decision::Continue)
    }

    /// Cookie writes the caller must apply to its response, if any.
    pub fn clear_cookies(&self) -> Option<&SessionCookies> {
        match self {
            Decision::Continue => None,
            Decision::RedirectToLogin { clear_cookies, .. }
            | Decision::Unauthorized { clear_cookies, .. } => clear_cookies.as_ref(),
        }
    }
}

/// The parts of an inbound request the gate looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub path: String,
    pub token: Option<String>,
    /// `scheme://host[:port]` of the request, used when the config has no origin.
    pub origin: Option<String>,
}

impl GateRequest {
    pub fn new(path: impl Into<String>, token: Option<String>) -> Self {
        Self {
            path: path.into(),
            token,
            origin: None,
        }
    }

    /// Reads the token cookie named in `config` from `cookies`.
    pub fn from_cookies<C>(path: impl Into<String>, cookies: &C, config: &GateConfig) -> Self
    where
        C: CookieSource + ?Sized,
    {
        Self::new(path, cookies.cookie_value(&config.token_cookie))
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Token state as far as the gate is concerned.
enum Session {
    Missing,
    Expired,
    Fresh,
}

/// Request gate over a validated [`GateConfig`].
///
/// Cheap to clone into each request handler: wrap it in an `Arc`.
#[derive(Debug, Clone)]
pub struct Gate {
    config: GateConfig,
}

impl Gate {
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn evaluate(&self, request: &GateRequest) -> Decision {
        self.evaluate_at(request, Utc::now())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "gate", skip_all, fields(path = %request.path))
    )]
    pub fn evaluate_at(&self, request: &GateRequest, now: DateTime<Utc>) -> Decision {
        let Some(kind) = self.config.classify(&request.path) else {
            return Decision::Continue;
        };

        // An empty cookie value is no session at all.
        let session = match request.token.as_deref().filter(|raw| !raw.is_empty()) {
            None => Session::Missing,
            Some(raw) if token::is_expired_at(raw, now) => Session::Expired,
            Some(_) => Session::Fresh,
        };

        let reason = match session {
            Session::Fresh => {
                log::trace!(target: "taskgate", "msg=\"request allowed\" path=\"{}\"", request.path);
                return Decision::Continue;
            }
            Session::Missing => DenialReason::MissingToken,
            Session::Expired => DenialReason::ExpiredToken,
        };

        log::info!(
            target: "taskgate",
            "msg=\"request denied\" reason={} area={kind:?} path=\"{}\"",
            reason.as_str(),
            request.path
        );

        let clear_cookies = match reason {
            DenialReason::MissingToken => None,
            DenialReason::ExpiredToken => Some(SessionCookies::clear(&self.config)),
        };

        match kind {
            AreaKind::Page => self.deny_page(request, clear_cookies),
            AreaKind::Api => Self::deny_api(reason, clear_cookies),
        }
    }

    fn deny_page(&self, request: &GateRequest, clear_cookies: Option<SessionCookies>) -> Decision {
        Decision::RedirectToLogin {
            location: self.login_url(request),
            clear_cookies,
        }
    }

    fn deny_api(reason: DenialReason, clear_cookies: Option<SessionCookies>) -> Decision {
        Decision::Unauthorized {
            message: reason.message(),
            status: 401,
            clear_cookies,
        }
    }

    /// `{origin}{login_path}`, preferring the configured origin over the request's.
    pub fn login_url(&self, request: &GateRequest) -> String {
        let origin = self
            .config
            .origin
            .as_deref()
            .or(request.origin.as_deref())
            .map(|origin| origin.trim_end_matches('/'));

        match origin {
            Some(origin) => format!("{origin}{}", self.config.login_path),
            None => self.config.login_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Duration;

    use super::*;
    use crate::ProtectedArea;
    use crate::cookie::TOKEN_COOKIE;

    fn token_expiring_at(exp: DateTime<Utc>) -> String {
        let payload = format!(r#"{{"sub":"1","exp":{}}}"#, exp.timestamp());
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn gate() -> Gate {
        Gate::new(GateConfig::default().with_origin("https://tasks.example.com")).unwrap()
    }

    #[test]
    fn test_page_without_token_redirects() {
        let decision = gate().evaluate(&GateRequest::new("/tasks", None));
        assert_eq!(
            decision,
            Decision::RedirectToLogin {
                location: "https://tasks.example.com/login".to_owned(),
                clear_cookies: None,
            }
        );
    }

    #[test]
    fn test_page_with_expired_token_redirects_and_clears() {
        let now = Utc::now();
        let token = token_expiring_at(now - Duration::seconds(10));
        let decision = gate().evaluate_at(&GateRequest::new("/tasks", Some(token)), now);

        let Decision::RedirectToLogin { location, clear_cookies } = decision else {
            panic!("expected redirect, got {decision:?}");
        };
        assert_eq!(location, "https://tasks.example.com/login");
        let cookies = clear_cookies.unwrap();
        assert!(cookies.token.is_removal());
        assert!(cookies.user.is_removal());
    }

    #[test]
    fn test_page_with_fresh_token_continues() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::minutes(5));
        let decision = gate().evaluate_at(&GateRequest::new("/tasks/42", Some(token)), now);
        assert_eq!(decision, Decision::Continue);
    }

    #[test]
    fn test_api_without_token_is_unauthorized() {
        let decision = gate().evaluate(&GateRequest::new("/api/tasks", None));
        assert_eq!(
            decision,
            Decision::Unauthorized {
                message: "Not authorized",
                status: 401,
                clear_cookies: None,
            }
        );
    }

    #[test]
    fn test_api_with_expired_token_is_unauthorized_and_clears() {
        let now = Utc::now();
        let token = token_expiring_at(now - Duration::seconds(1));
        let decision = gate().evaluate_at(&GateRequest::new("/api/tasks", Some(token)), now);

        assert!(matches!(
            decision,
            Decision::Unauthorized {
                message: "Session expired",
                status: 401,
                clear_cookies: Some(_),
            }
        ));
    }

    #[test]
    fn test_api_with_fresh_token_continues() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::seconds(60));
        let decision = gate().evaluate_at(&GateRequest::new("/api/tasks/1", Some(token)), now);
        assert!(decision.is_continue());
        assert!(decision.clear_cookies().is_none());
    }

    #[test]
    fn test_malformed_token_counts_as_expired() {
        let decision = gate().evaluate(&GateRequest::new("/api/tasks", Some("garbage".to_owned())));
        assert!(matches!(
            decision,
            Decision::Unauthorized { message: SESSION_EXPIRED_MESSAGE, .. }
        ));
        assert!(decision.clear_cookies().is_some());
    }

    #[test]
    fn test_empty_token_on_api_counts_as_missing() {
        let decision = gate().evaluate(&GateRequest::new("/api/tasks", Some(String::new())));
        assert_eq!(
            decision,
            Decision::Unauthorized {
                message: "Not authorized",
                status: 401,
                clear_cookies: None,
            }
        );
    }

    #[test]
    fn test_empty_token_on_page_redirects_without_clearing() {
        let decision = gate().evaluate(&GateRequest::new("/tasks", Some(String::new())));
        assert_eq!(
            decision,
            Decision::RedirectToLogin {
                location: "https://tasks.example.com/login".to_owned(),
                clear_cookies: None,
            }
        );
    }

    #[test]
    fn test_unprotected_paths_always_continue() {
        let now = Utc::now();
        let expired = token_expiring_at(now - Duration::hours(1));
        for path in ["/public", "/login", "/", "/tasksfoo", "/api/auth/login", "/api/tasksx"] {
            for token in [None, Some(expired.clone()), Some("garbage".to_owned())] {
                let decision = gate().evaluate_at(&GateRequest::new(path, token), now);
                assert_eq!(decision, Decision::Continue, "{path}");
            }
        }
    }

    #[test]
    fn test_expiry_boundary_second() {
        let now = Utc::now();
        let token = token_expiring_at(now);
        let decision = gate().evaluate_at(&GateRequest::new("/tasks", Some(token)), now);
        assert!(decision.clear_cookies().is_some());
    }

    #[test]
    fn test_login_url_falls_back_to_request_origin() {
        let gate = Gate::new(GateConfig::default()).unwrap();

        let request = GateRequest::new("/tasks", None).with_origin("http://localhost:3000");
        assert_eq!(gate.login_url(&request), "http://localhost:3000/login");

        let request = GateRequest::new("/tasks", None);
        assert_eq!(gate.login_url(&request), "/login");
    }

    #[test]
    fn test_configured_origin_wins_over_request_origin() {
        let request = GateRequest::new("/tasks", None).with_origin("http://internal:8080");
        assert_eq!(gate().login_url(&request), "https://tasks.example.com/login");
    }

    #[test]
    fn test_from_cookies() {
        let mut cookies = HashMap::new();
        cookies.insert(TOKEN_COOKIE.to_owned(), "aaa.bbb.ccc".to_owned());

        let request = GateRequest::from_cookies("/tasks", &cookies, gate().config());
        assert_eq!(request.token.as_deref(), Some("aaa.bbb.ccc"));

        let request = GateRequest::from_cookies("/tasks", &HashMap::<String, String>::new(), gate().config());
        assert_eq!(request.token, None);
    }

    #[test]
    fn test_extra_areas() {
        let config = GateConfig {
            areas: vec![
                ProtectedArea::new("/reports", AreaKind::Page),
                ProtectedArea::new("/api/reports", AreaKind::Api),
            ],
            ..Default::default()
        };
        let gate = Gate::new(config).unwrap();

        assert!(matches!(
            gate.evaluate(&GateRequest::new("/reports/q3", None)),
            Decision::RedirectToLogin { .. }
        ));
        assert!(matches!(
            gate.evaluate(&GateRequest::new("/api/reports", None)),
            Decision::Unauthorized { .. }
        ));
        assert!(gate.evaluate(&GateRequest::new("/tasks", None)).is_continue());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Gate::new(GateConfig::default().with_login_path("/tasks"));
        assert!(matches!(result, Err(GateError::InvalidConfiguration(_))));
    }
}
