// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transactional mail endpoint.

use crate::error::Result;
use crate::services::{MailMessage, MailOutcome};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/sendmail", post(send_mail))
}

#[derive(Deserialize)]
struct SendMailRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    html: String,
    #[serde(rename = "BccArr", default)]
    bcc: Vec<String>,
}

/// 200 with the relay's reply when sent, 500 with `{error}` otherwise.
async fn send_mail(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<SendMailRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MailOutcome>)> {
    let Json(request) = body?;

    let message = MailMessage {
        to: request.email,
        subject: request.subject,
        html: request.html,
        bcc: request.bcc,
    };

    let outcome = state.mail_service.send(&message).await;
    let status = if outcome.is_sent() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(outcome)))
}
