use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::Response;

use super::response::rejection_response;
use crate::api::request_origin;
use crate::{Gate, GateRequest};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Middleware for `axum::middleware::from_fn_with_state`.
///
/// Lets the request through on [`Decision::Continue`](crate::Decision::Continue),
/// otherwise answers with the redirect or 401 and any cookie clearing.
pub async fn session_gate(State(gate): State<Arc<Gate>>, request: Request, next: Next) -> Response {
    let decision = gate.evaluate(&gate_request(&gate, &request));

    match rejection_response(&decision) {
        Some(response) => response,
        None => next.run(request).await,
    }
}

/// Extracts the path, token cookie and origin the gate looks at.
pub fn gate_request<B>(gate: &Gate, request: &axum::http::Request<B>) -> GateRequest {
    let headers = request.headers();
    let gate_request =
        GateRequest::from_cookies(request.uri().path(), headers, gate.config());

    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().authority().map(|authority| authority.as_str()));
    let proto = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().scheme_str());

    match request_origin(host, proto) {
        Some(origin) => gate_request.with_origin(origin),
        None => gate_request,
    }
}
