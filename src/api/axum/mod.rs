//! Axum integration.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{Router, middleware, routing::get};
//! use taskgate::{Gate, GateConfig};
//! use taskgate::api::axum::session_gate;
//!
//! let gate = Arc::new(Gate::new(GateConfig::default())?);
//!
//! let app = Router::new()
//!     .route("/tasks", get(tasks_page))
//!     .route("/api/tasks", get(list_tasks))
//!     .layer(middleware::from_fn_with_state(gate, session_gate));
//! ```

mod middleware;
mod response;

pub use middleware::{gate_request, session_gate};
pub use response::{append_session_cookies, rejection_response};
