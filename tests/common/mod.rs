// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use camptogether_api::config::Config;
use camptogether_api::db::{DocumentStore, FirestoreDb, MemoryDb};
use camptogether_api::models::Event;
use camptogether_api::routes::create_router;
use camptogether_api::services::FirebaseTokenVerifier;
use camptogether_api::AppState;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

pub const TEST_KID: &str = "test-kid";
pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Verifier that accepts HS256 tokens signed with [`TEST_SECRET`].
pub fn test_verifier(config: &Config) -> Arc<FirebaseTokenVerifier> {
    Arc::new(
        FirebaseTokenVerifier::new_with_static_key(
            config,
            TEST_KID,
            Algorithm::HS256,
            DecodingKey::from_secret(TEST_SECRET),
        )
        .expect("static verifier"),
    )
}

/// Create an app over `db` with `config`.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config, db: Arc<dyn DocumentStore>) -> (Router, Arc<AppState>) {
    let verifier = test_verifier(&config);
    let state = Arc::new(AppState::new(config, db, verifier));
    (create_router(state.clone()), state)
}

/// Create a test app over a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Arc::new(MemoryDb::new()))
}

#[derive(Serialize)]
struct TestClaims<'a> {
    iss: String,
    aud: &'a str,
    sub: &'a str,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Sign a token for `project` with an explicit expiry. Any e-mail is
/// marked verified.
#[allow(dead_code)]
pub fn sign_token(project: &str, uid: &str, email: Option<&str>, exp: u64) -> String {
    sign_claims(project, uid, email, email.map(|_| true), exp)
}

/// A valid ID token whose e-mail the provider has not verified.
#[allow(dead_code)]
pub fn unverified_token_for(uid: &str, email: &str) -> String {
    sign_claims("test-project", uid, Some(email), Some(false), now_unix() + 3600)
}

fn sign_claims(
    project: &str,
    uid: &str,
    email: Option<&str>,
    email_verified: Option<bool>,
    exp: u64,
) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_KID.to_string());

    let claims = TestClaims {
        iss: format!("https://securetoken.google.com/{project}"),
        aud: project,
        sub: uid,
        iat: now_unix(),
        exp,
        email,
        email_verified,
        name: Some("Test Camper"),
    };

    encode(&header, &claims, &EncodingKey::from_secret(TEST_SECRET)).unwrap()
}

/// A valid ID token for `uid`.
#[allow(dead_code)]
pub fn token_for(uid: &str, email: Option<&str>) -> String {
    sign_token("test-project", uid, email, now_unix() + 3600)
}

/// A valid ID token for an allowlisted admin.
#[allow(dead_code)]
pub fn admin_token() -> String {
    token_for("admin-user", Some(ADMIN_EMAIL))
}

/// Build a request, optionally authenticated and with a JSON body.
#[allow(dead_code)]
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request through the router and decode the JSON body
/// (`Value::Null` for empty bodies).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Create an event through the API and return its JSON.
#[allow(dead_code)]
pub async fn create_event(app: &Router, token: &str, body: Value) -> Value {
    let (status, event) = send(
        app,
        json_request(Method::POST, "/api/events", Some(token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {event}");
    event
}

/// Parse an RFC 3339 timestamp for fixtures.
#[allow(dead_code)]
pub fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Utc)
}

/// An event fixture written straight to the store.
#[allow(dead_code)]
pub fn event_fixture(id: &str, title: &str, host_id: &str, start: &str, is_public: bool) -> Event {
    let start_date = parse_time(start);
    Event {
        id: id.to_string(),
        title: title.to_string(),
        title_lower: title.to_lowercase(),
        description: String::new(),
        location_name: String::new(),
        location_address: String::new(),
        start_date,
        end_date: start_date,
        host_id: host_id.to_string(),
        attendee_ids: vec![host_id.to_string()],
        invite_token: format!("invite-{id}"),
        is_public,
        notices: String::new(),
        cover_image: String::new(),
        google_map_url: String::new(),
        created_at: start_date,
        updated_at: start_date,
    }
}
