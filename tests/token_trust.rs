//! The gate reads `exp` from real signed tokens but never checks the signature.
//! Rejecting forged tokens stays with the backend API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use taskgate::{Decision, Gate, GateConfig, GateRequest, SessionToken, decode_claims, is_expired};

#[derive(Serialize)]
struct Claims {
    sub: String,
    email: String,
    exp: i64,
    iat: i64,
}

fn signed_token(secret: &[u8], expires_in: Duration) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: "7".to_owned(),
        email: "user@example.com".to_owned(),
        exp: (now + expires_in).timestamp(),
        iat: now.timestamp(),
    };
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
}

#[test]
fn test_backend_issued_token_is_fresh() {
    let token = signed_token(b"backend-secret-32-bytes-long-key", Duration::hours(1));
    assert!(!is_expired(&token));

    let claims = decode_claims(&token).unwrap();
    assert_eq!(claims.get("email").and_then(|v| v.as_str()), Some("user@example.com"));
    assert!(claims.expires_at().unwrap() > Utc::now());
}

#[test]
fn test_backend_issued_token_expires() {
    let token = signed_token(b"backend-secret-32-bytes-long-key", -Duration::minutes(1));
    assert!(is_expired(&token));
    assert!(SessionToken::new(token).is_expired());
}

#[test]
fn test_signature_is_not_verified() {
    let forged = signed_token(b"attacker-controlled-secret-value", Duration::hours(1));
    let gate = Gate::new(GateConfig::default()).unwrap();

    let decision = gate.evaluate(&GateRequest::new("/api/tasks", Some(forged)));
    assert_eq!(decision, Decision::Continue);
}

#[test]
fn test_stripped_signature_still_reads_payload() {
    let token = signed_token(b"backend-secret-32-bytes-long-key", Duration::hours(1));
    let (unsigned, _signature) = token.rsplit_once('.').unwrap();
    assert_eq!(unsigned.split('.').count(), 2);
    assert!(!is_expired(unsigned));
}
