// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use finsight::config::Config;
use finsight::db::FirestoreDb;
use finsight::middleware::auth::create_session_token;
use finsight::routes::create_router;
use finsight::services::{AdviceService, GeminiClient, IdentityVerifier, MailService, MailTransport};
use finsight::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use lettre::transport::stub::AsyncStubTransport;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key id and secret of the static identity-provider key used in tests.
pub const TEST_ID_KID: &str = "test-kid";
pub const TEST_ID_SECRET: &[u8] = b"identity-provider-test-secret";

/// Sender address of the recorded test outbox.
pub const TEST_SENDER: &str = "alerts@example.com";

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

/// Create a test app on the in-memory store with default config.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::default())
}

/// Create a test app with the given config. The store is always in-memory
/// and ID tokens are checked against the static test key.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let mail_service = MailService::new(&config).expect("mail service");
    build_test_app(config, mail_service)
}

/// Create a test app whose outbound mail is recorded by `outbox` instead of
/// going to an SMTP relay.
#[allow(dead_code)]
pub fn create_test_app_with_outbox(
    outbox: &Arc<AsyncStubTransport>,
) -> (axum::Router, Arc<AppState>) {
    let mail_service =
        MailService::with_transport(TEST_SENDER, MailTransport::Stub(outbox.clone()))
            .expect("mail service");
    build_test_app(Config::default(), mail_service)
}

fn build_test_app(config: Config, mail_service: MailService) -> (axum::Router, Arc<AppState>) {
    let db = FirestoreDb::new_in_memory();

    let gemini = GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_model,
        config.gemini_api_key.clone(),
    )
    .expect("gemini client");
    let advice_service = AdviceService::new(gemini);

    let identity_verifier = Arc::new(
        IdentityVerifier::new_with_static_key(
            &config,
            TEST_ID_KID,
            Algorithm::HS256,
            DecodingKey::from_secret(TEST_ID_SECRET),
        )
        .expect("identity verifier"),
    );

    let state = Arc::new(AppState {
        config,
        db,
        advice_service,
        mail_service,
        identity_verifier,
    });

    (create_router(state.clone()), state)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Claims of a valid provider ID token for `email`.
#[allow(dead_code)]
pub fn id_token_claims(config: &Config, email: &str) -> Value {
    let now = now_secs();
    serde_json::json!({
        "iss": "https://accounts.google.com",
        "aud": config.identity_client_id,
        "sub": format!("sub-{email}"),
        "iat": now,
        "exp": now + 3600,
        "email": email,
        "email_verified": true,
        "name": "Test User",
        "picture": "https://example.com/avatar.png"
    })
}

/// Sign provider ID token claims with the static test key.
#[allow(dead_code)]
pub fn sign_id_token(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(TEST_ID_KID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(TEST_ID_SECRET)).unwrap()
}

/// Session token for `email`, signed with the app's session key.
#[allow(dead_code)]
pub fn session_token(state: &AppState, email: &str) -> String {
    create_session_token(email, &state.config.session_signing_key).unwrap()
}

/// Create a profile directly in the store.
#[allow(dead_code)]
pub async fn seed_profile(state: &AppState, email: &str) {
    state
        .db
        .create_profile_if_absent(finsight::models::NewProfile {
            name: Some("Test User".to_string()),
            picture: None,
            email: Some(email.to_string()),
        })
        .await
        .unwrap();
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
