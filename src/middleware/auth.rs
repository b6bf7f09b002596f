// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;

/// Name of the HttpOnly cookie carrying the session token.
pub const SESSION_COOKIE: &str = "finsight_session";

/// Session lifetime in seconds (30 days).
pub const SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (profile email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Signed-in user, inserted as a request extension for protected routes.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub email: String,
}

/// Middleware that requires a valid session token.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let session = verify_session_token(&token, &state.config.session_signing_key)
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Decode a session token. Returns `None` for any invalid or expired token.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Option<Session> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<Claims>(token, &key, &validation).ok()?.claims;
    let email = claims.sub.trim();
    if email.is_empty() {
        return None;
    }

    Some(Session {
        email: email.to_string(),
    })
}

/// Create a JWT for a user session.
pub fn create_session_token(email: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: email.to_string(),
        iat: now as usize,
        exp: (now + SESSION_TTL_SECS) as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"unit_test_session_key_32_bytes!!";

    #[test]
    fn token_round_trips_email() {
        let token = create_session_token("ada@example.com", KEY).unwrap();
        assert_eq!(
            verify_session_token(&token, KEY),
            Some(Session {
                email: "ada@example.com".to_string()
            })
        );
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let other_key = b"another_key_entirely_32_bytes!!!";
        let token = create_session_token("ada@example.com", other_key).unwrap();
        assert!(verify_session_token(&token, KEY).is_none());
        assert!(verify_session_token("not-a-jwt", KEY).is_none());
    }
}
