//! actix-web integration.

mod middleware;

pub use middleware::{SessionGate, SessionGateMiddleware, gate_request, rejection_response};
