use axum::Json;
use axum::http::header::{CACHE_CONTROL, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::{NO_STORE, Rejection};
use crate::{Decision, SessionCookies};

/// Builds the response for a denial, or `None` when the request may proceed.
pub fn rejection_response(decision: &Decision) -> Option<Response> {
    let mut response = match Rejection::from_decision(decision)? {
        Rejection::Redirect(location) => Redirect::temporary(location).into_response(),
        Rejection::Json(status, body) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::UNAUTHORIZED);
            (status, [(CACHE_CONTROL, NO_STORE)], Json(body)).into_response()
        }
    };

    if let Some(cookies) = decision.clear_cookies() {
        append_session_cookies(&mut response, cookies);
    }

    Some(response)
}

/// Appends one `Set-Cookie` header per session cookie.
pub fn append_session_cookies(response: &mut Response, cookies: &SessionCookies) {
    for spec in cookies.iter() {
        match HeaderValue::from_str(&spec.to_header_value()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(_) => {
                log::warn!(target: "taskgate", "msg=\"unencodable cookie skipped\" cookie=\"{}\"", spec.name);
            }
        }
    }
}
