// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in with an identity-provider ID token and session lifecycle.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_token, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::middleware::Session;
use crate::models::{NewProfile, Profile};
use crate::services::IdentityError;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use std::sync::Arc;

/// Routes that establish or end a session (no session required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", post(create_session))
        .route("/api/session/logout", post(logout))
}

/// Routes behind `require_session`.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub profile: Profile,
}

/// Exchange a provider ID token (bearer header) for a session.
///
/// The profile is created on first sign-in, seeded with the provider's name
/// and picture.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let identity = state
        .identity_verifier
        .verify_bearer(headers.get(header::AUTHORIZATION))
        .await
        .map_err(|e| match e {
            IdentityError::Forbidden(msg) => {
                tracing::warn!(error = %msg, "Rejected identity token");
                AppError::Unauthorized
            }
            IdentityError::Transient(msg) => AppError::Upstream(msg),
        })?;

    let profile = state
        .db
        .create_profile_if_absent(NewProfile {
            name: Some(identity.name),
            picture: identity.picture,
            email: Some(identity.email),
        })
        .await?;

    let token = create_session_token(&profile.email, &state.config.session_signing_key)?;

    tracing::info!(email = %profile.email, "Session started");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .http_only(true)
        .secure(state.config.api_url.starts_with("https://"))
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));

    Ok((jar.add(cookie), Json(SessionResponse { token, profile })))
}

/// Always emits an expired cookie, whether or not the request carried one.
async fn logout(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .build();
    cookie.make_removal();
    jar.add(cookie)
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Profile>> {
    let profile = super::session_profile(&state, &session).await?;
    Ok(Json(profile))
}
