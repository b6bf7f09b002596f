// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Advice routes for the signed-in user.
//!
//! Generation failures are not HTTP errors: they come back as 200 with an
//! `{ok: false, error}` body so the client can render them inline.

use crate::error::{AppError, Result};
use crate::middleware::Session;
use crate::services::advice::{AdviceParams, PlanSection};
use crate::services::gemini::ChatTurn;
use crate::services::{AdviceOutcome, ChatOutcome};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Routes behind `require_session`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/advice", post(get_advice))
        .route("/api/advice/plan", post(get_plan))
        .route("/api/advice/chat", post(chat))
}

#[derive(Deserialize, Default)]
struct AdviceRequest {
    focus: Option<String>,
}

async fn get_advice(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    body: Option<Json<AdviceRequest>>,
) -> Result<Json<AdviceOutcome>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let profile = super::session_profile(&state, &session).await?;

    let params = AdviceParams::from(&profile);
    let outcome = state
        .advice_service
        .advise(&params, request.focus.as_deref())
        .await;

    Ok(Json(outcome))
}

#[derive(Serialize)]
struct PlanResponse {
    sections: Vec<PlanSection>,
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<PlanResponse>> {
    let profile = super::session_profile(&state, &session).await?;
    let sections = state
        .advice_service
        .plan(&AdviceParams::from(&profile))
        .await;
    Ok(Json(PlanResponse { sections }))
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    history: Vec<ChatTurn>,
    message: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatOutcome>> {
    let Json(request) = body?;
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }

    let profile = super::session_profile(&state, &session).await?;
    let outcome = state
        .advice_service
        .chat(&profile, request.history, request.message.trim())
        .await;

    Ok(Json(outcome))
}
