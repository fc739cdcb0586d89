//! Framework-independent parts of turning a denial into a response.

use super::MessageResponse;
use crate::Decision;

/// Location and body of a denial, independent of the web framework.
pub(crate) enum Rejection<'a> {
    Redirect(&'a str),
    Json(u16, MessageResponse),
}

impl<'a> Rejection<'a> {
    /// Returns `None` for [`Decision::Continue`].
    pub(crate) fn from_decision(decision: &'a Decision) -> Option<Self> {
        match decision {
            Decision::Continue => None,
            Decision::RedirectToLogin { location, .. } => Some(Rejection::Redirect(location)),
            Decision::Unauthorized {
                message, status, ..
            } => Some(Rejection::Json(*status, MessageResponse::new(*message))),
        }
    }
}

/// Sent on every API denial so intermediaries never cache a 401.
pub(crate) const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// `scheme://host` from a `Host` value and an optional forwarded scheme.
pub(crate) fn request_origin(host: Option<&str>, forwarded_proto: Option<&str>) -> Option<String> {
    let host = host.filter(|h| !h.is_empty())?;
    let scheme = forwarded_proto
        .and_then(|proto| proto.split(',').next())
        .map(str::trim)
        .filter(|proto| *proto == "http" || *proto == "https")
        .unwrap_or("http");
    Some(format!("{scheme}://{host}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_origin() {
        assert_eq!(
            request_origin(Some("localhost:3000"), None).as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(
            request_origin(Some("tasks.example.com"), Some("https, http")).as_deref(),
            Some("https://tasks.example.com")
        );
        assert_eq!(
            request_origin(Some("tasks.example.com"), Some("gopher")).as_deref(),
            Some("http://tasks.example.com")
        );
        assert_eq!(request_origin(None, Some("https")), None);
        assert_eq!(request_origin(Some(""), None), None);
    }

    #[test]
    fn test_rejection_from_decision() {
        assert!(Rejection::from_decision(&Decision::Continue).is_none());

        let decision = Decision::RedirectToLogin {
            location: "/login".to_owned(),
            clear_cookies: None,
        };
        assert!(matches!(
            Rejection::from_decision(&decision),
            Some(Rejection::Redirect("/login"))
        ));

        let decision = Decision::Unauthorized {
            message: "Not authorized",
            status: 401,
            clear_cookies: None,
        };
        let Some(Rejection::Json(status, body)) = Rejection::from_decision(&decision) else {
            panic!("expected json rejection");
        };
        assert_eq!(status, 401);
        assert_eq!(body.message, "Not authorized");
    }
}
