use actix_web::{
    HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
};
use futures::future::{LocalBoxFuture, Ready, ok};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::api::{NO_STORE, Rejection, request_origin};
use crate::{Decision, Gate, GateRequest};

/// Session gate middleware for actix-web.
///
/// # Example
///
/// ```rust,ignore
/// use taskgate::{Gate, GateConfig};
/// use taskgate::api::actix::SessionGate;
///
/// let gate = Gate::new(GateConfig::default())?;
///
/// App::new()
///     .wrap(SessionGate::new(gate))
///     .route("/tasks", web::get().to(tasks_page))
/// ```
#[derive(Clone)]
pub struct SessionGate {
    gate: Arc<Gate>,
}

impl SessionGate {
    #[must_use]
    pub fn new(gate: Gate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }

    #[must_use]
    pub fn shared(gate: Arc<Gate>) -> Self {
        Self { gate }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = SessionGateMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(SessionGateMiddleware {
            service,
            gate: Arc::clone(&self.gate),
        })
    }
}

pub struct SessionGateMiddleware<S> {
    service: S,
    gate: Arc<Gate>,
}

impl<S, B> Service<ServiceRequest> for SessionGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = self.gate.evaluate(&gate_request(&self.gate, req.request()));

        let Some(response) = rejection_response(&decision) else {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        };

        Box::pin(async move { Ok(req.into_response(response.map_into_right_body())) })
    }
}

/// Extracts the path, token cookie and origin the gate looks at.
pub fn gate_request(gate: &Gate, req: &HttpRequest) -> GateRequest {
    let token = req
        .cookie(&gate.config().token_cookie)
        .map(|cookie| cookie.value().to_owned());
    let gate_request = GateRequest::new(req.path(), token);

    let info = req.connection_info();
    match request_origin(Some(info.host()), Some(info.scheme())) {
        Some(origin) => gate_request.with_origin(origin),
        None => gate_request,
    }
}

/// Builds the response for a denial, or `None` when the request may proceed.
pub fn rejection_response(decision: &Decision) -> Option<HttpResponse> {
    let mut response = match Rejection::from_decision(decision)? {
        Rejection::Redirect(location) => HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, location))
            .finish(),
        Rejection::Json(status, body) => {
            let status = actix_web::http::StatusCode::from_u16(status)
                .unwrap_or(actix_web::http::StatusCode::UNAUTHORIZED);
            HttpResponse::build(status)
                .insert_header((header::CACHE_CONTROL, NO_STORE))
                .json(body)
        }
    };

    if let Some(cookies) = decision.clear_cookies() {
        for spec in cookies.iter() {
            if let Err(e) = response.add_cookie(&spec.to_cookie()) {
                log::warn!(target: "taskgate", "msg=\"unencodable cookie skipped\" cookie=\"{}\" error=\"{e}\"", spec.name);
            }
        }
    }

    Some(response)
}
