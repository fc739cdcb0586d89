#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items
)]

//! Task manager front end with the session gate in front of it.
//!
//! `/login` stands in for the real backend: it mints an HS256 token that
//! expires after `SESSION_SECONDS` (default 60) and sets the session cookies.
//!
//! Run with: `cargo run --example gated_server --features axum`
//!
//! Try:
//!   curl -i http://localhost:8080/tasks
//!   curl -i -c jar -X POST http://localhost:8080/login \
//!     -H "Content-Type: application/json" -d '{"email": "user@example.com"}'
//!   curl -i -b jar http://localhost:8080/api/tasks
//!   curl -i -b jar -X POST http://localhost:8080/logout

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use serde::{Deserialize, Serialize};
use taskgate::api::MessageResponse;
use taskgate::api::axum::{append_session_cookies, session_gate};
use taskgate::{Gate, GateConfig, SessionCookies, SessionToken};
use tokio::net::TcpListener;

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
}

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

#[derive(Serialize)]
struct Task {
    id: String,
    title: String,
    status: &'static str,
}

async fn login(State(gate): State<Arc<Gate>>, Json(body): Json<LoginRequest>) -> Response {
    let claims = Claims {
        sub: body.email.clone(),
        exp: (Utc::now() + gate.config().session_lifetime).timestamp(),
    };
    let Ok(token) = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"demo-backend-secret-32-bytes-long"),
    ) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(MessageResponse::new("Login failed")))
            .into_response();
    };

    let cookies = SessionCookies::issue(&SessionToken::new(token), &body.email, gate.config());
    let mut response = Json(MessageResponse::new("Signed in")).into_response();
    append_session_cookies(&mut response, &cookies);
    response
}

async fn login_page() -> &'static str {
    "<h1>Sign in</h1><p>POST your email to /login as JSON.</p>"
}

async fn logout(State(gate): State<Arc<Gate>>) -> Response {
    let mut response = Json(MessageResponse::new("Signed out")).into_response();
    append_session_cookies(&mut response, &SessionCookies::clear(gate.config()));
    response
}

async fn tasks_page() -> &'static str {
    "<h1>Your tasks</h1>"
}

async fn list_tasks() -> Json<Vec<Task>> {
    Json(vec![Task {
        id: "1".to_owned(),
        title: "Write the quarterly report".to_owned(),
        status: "in_progress",
    }])
}

#[tokio::main]
async fn main() {
    let origin = std::env::var("APP_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_owned());
    let session_seconds = std::env::var("SESSION_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);

    let config = GateConfig::default()
        .with_origin(origin)
        .with_session_lifetime(Duration::seconds(session_seconds));
    let gate = Arc::new(Gate::new(config).expect("invalid gate configuration"));

    let app = Router::new()
        .route("/tasks", get(tasks_page))
        .route("/api/tasks", get(list_tasks))
        .layer(middleware::from_fn_with_state(Arc::clone(&gate), session_gate))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .with_state(gate);

    let listener = TcpListener::bind("0.0.0.0:8080").await.unwrap();
    println!("Gated task server running on http://localhost:8080");
    axum::serve(listener, app).await.unwrap();
}
